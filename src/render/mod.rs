//! Timelapse rendering.
//!
//! Each day group becomes one video. A manifest listing the day's frames is
//! written to a per-cycle scratch directory and handed to an [`Encoder`].
//! Days are rendered concurrently, and a failed day never affects the others.

mod encoder;
mod generator;

pub use encoder::{Encoder, GenError, MencoderEncoder, DEFAULT_FPS};
pub use generator::{DayFailure, GenerationReport, Generator};
