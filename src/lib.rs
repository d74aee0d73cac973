//! Real-time audio spectrum analysis pipeline
//!
//! Captures microphone audio on a cpal stream and turns every
//! fixed-size chunk into log-spaced frequency bars: Hann window,
//! FFT magnitude, logarithmic binning. The whole chain runs inside the
//! capture callback and ends in a publish to a single-slot frame
//! buffer; a display consumer polls that buffer on its own timer and
//! applies exponential smoothing. An on-demand snapshot path exposes
//! every intermediate array (raw, windowed, magnitude, binned dB) for
//! diagnostic display.

pub mod audio;
pub mod dsp;

pub use audio::{AudioCaptureHandle, AudioConfig, CaptureError, FrameBuffer, SharedFrame};
pub use dsp::{DspError, PipelineSnapshot, SpectrumPipeline, TemporalSmoother};
