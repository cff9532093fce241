use thiserror::Error;

/// Precondition violations handed in by a chart loader.
///
/// Queries never fail; they clamp. Mutations report "nothing happened" through
/// an empty [`AffectedRange`](crate::edit::AffectedRange). Only malformed input
/// from the layer that builds a [`Beatmap`](crate::Beatmap) ends up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("Tick rate must be positive, got {0}")]
    InvalidTickRate(i64),

    #[error("Tempo change at tick {time} has non-positive microseconds per quarter note: {micros}")]
    NonPositiveTempo { time: i64, micros: i64 },

    #[error("Measure change at tick {time} has non-positive beats per measure: {beats}")]
    NonPositiveMeasure { time: i64, beats: f64 },

    #[error("Roll at tick {time} has non-positive duration: {duration}")]
    NonPositiveRollDuration { time: i64, duration: i64 },
}
