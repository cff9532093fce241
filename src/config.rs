use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::model::ChannelGroups;

/// Thresholds for automatic double-bass foot assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DoubleBassConfig {
    /// Note value of the widest gap that still chains hits, e.g. 16 for sixteenths.
    pub divisor: i64,
    /// Note value of the narrowest gap that still chains hits.
    pub maximum_divisor: i64,
    /// Shortest streak that gets feet assigned. Values below 2 act as 2.
    pub streak: usize,
    /// Put a metrically awkward first hit on the left foot.
    pub left_lead: bool,
    /// Keep the left foot off ticks that also carry hand hits.
    pub no_hands_on_left: bool,
}

impl Default for DoubleBassConfig {
    fn default() -> Self {
        Self {
            divisor: 16,
            maximum_divisor: 32,
            streak: 4,
            left_lead: false,
            no_hands_on_left: true,
        }
    }
}

/// Editing preferences handed explicitly to the operations that read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub double_bass: DoubleBassConfig,
    pub channel_groups: ChannelGroups,
    /// Note value of the default edit stride.
    pub stride_divisor: i64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            double_bass: DoubleBassConfig::default(),
            channel_groups: ChannelGroups::default(),
            stride_divisor: 16,
        }
    }
}

impl EditorConfig {
    /// Loads config from a specified path.
    /// Returns default config if file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading editor config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing editor config {}", path.display()))?;
        Ok(config)
    }

    /// Saves config to a specified path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("writing editor config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrumChannel;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = EditorConfig::default();
        assert_eq!(config.double_bass.divisor, 16);
        assert_eq!(config.double_bass.maximum_divisor, 32);
        assert_eq!(config.double_bass.streak, 4);
        assert!(!config.double_bass.left_lead);
        assert!(config.double_bass.no_hands_on_left);
        assert_eq!(config.stride_divisor, 16);
        assert_eq!(config.channel_groups, ChannelGroups::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "double_bass": { "left_lead": true }, "stride_divisor": 8 }"#;
        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert!(config.double_bass.left_lead);
        assert_eq!(config.double_bass.streak, 4);
        assert_eq!(config.stride_divisor, 8);
        assert_eq!(config.channel_groups, ChannelGroups::default());
    }

    #[test]
    fn test_file_io() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("editor.json");

        let config = EditorConfig {
            double_bass: DoubleBassConfig {
                streak: 2,
                left_lead: true,
                ..Default::default()
            },
            channel_groups: ChannelGroups::new(vec![vec![DrumChannel::Crash, DrumChannel::China]]),
            stride_divisor: 12,
        };

        config.save_to(&file_path).unwrap();
        let loaded = EditorConfig::load_from(&file_path).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nonexistent.json");

        let config = EditorConfig::load_from(&file_path).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_malformed_reports_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("broken.json");
        fs::write(&file_path, "{ not json").unwrap();

        let err = EditorConfig::load_from(&file_path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
