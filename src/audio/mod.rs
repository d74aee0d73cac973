//! Audio capture and configuration

pub mod capture;
pub mod sources;

pub use capture::{AudioCaptureHandle, CaptureError, FrameBuffer, SharedFrame};
pub use sources::{list_sources, AudioSource, SourceError};

use serde::{Deserialize, Serialize};

/// Audio processing configuration
///
/// Fixed at startup. The pipeline precomputes its window, FFT plan and
/// bin-index table from these values, so changing chunk size or bar
/// count requires building a new pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Samples per capture chunk (also the FFT size)
    pub chunk_size: usize,

    /// Number of log-spaced display bars
    pub num_bars: usize,

    /// Exponential smoothing factor in [0, 1]; closer to 1 is smoother
    pub smoothing_factor: f32,

    /// Lower clamp for dB conversion on the snapshot path
    pub db_floor: f32,

    /// Lowest analyzed frequency in Hz
    pub min_frequency: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            chunk_size: 2048,
            num_bars: 64,
            smoothing_factor: 0.7,
            db_floor: -60.0,
            min_frequency: 20.0,
        }
    }
}
