//! Audio capture thread and the cross-thread frame handoff

use crate::audio::AudioConfig;
use crate::dsp::{DspError, PipelineSnapshot, SpectrumPipeline};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Audio capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No input device found")]
    NoInputDevice,

    #[error("Input device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build audio stream: {0}")]
    StreamError(String),

    #[error("Failed to start stream: {0}")]
    PlayError(String),

    #[error("Pipeline setup failed: {0}")]
    Pipeline(#[from] DspError),

    #[error("Thread error: {0}")]
    ThreadError(String),
}

/// The latest captured chunk and the bars derived from it.
///
/// The two halves are always mutually consistent: `bands` was computed
/// from the `chunk` beside it, never from an older or newer one.
#[derive(Debug, Clone)]
pub struct SharedFrame {
    /// Raw mono chunk
    pub chunk: Vec<f32>,

    /// Linear-magnitude bars for that chunk
    pub bands: Vec<f32>,
}

/// Single-slot handoff between the capture and display timelines.
///
/// Latest-wins: every publish overwrites the previous frame, nothing is
/// queued. Readers either see the zeroed initial frame or one complete
/// published frame. The lock is held only for the copy in or out; DSP
/// happens before publishing and after reading.
pub struct FrameBuffer {
    inner: Mutex<SharedFrame>,
}

impl FrameBuffer {
    /// Zero-initialized frame of the configured dimensions.
    pub fn new(chunk_size: usize, num_bars: usize) -> Self {
        Self {
            inner: Mutex::new(SharedFrame {
                chunk: vec![0.0; chunk_size],
                bands: vec![0.0; num_bars],
            }),
        }
    }

    /// Capture-path write.
    ///
    /// Panics if the slice lengths differ from the constructed
    /// dimensions; the capture callback guarantees them.
    pub fn publish(&self, chunk: &[f32], bands: &[f32]) {
        let mut frame = self.inner.lock();
        frame.chunk.copy_from_slice(chunk);
        frame.bands.copy_from_slice(bands);
    }

    /// Display-path read of the full consistent pair.
    pub fn read(&self) -> SharedFrame {
        self.inner.lock().clone()
    }

    /// Cheap per-tick read of the bars alone.
    pub fn latest_bands(&self) -> Vec<f32> {
        self.inner.lock().bands.clone()
    }
}

/// Commands sent to the capture thread
enum AudioCommand {
    Stop,
}

/// Handle to the running capture pipeline.
///
/// The cpal stream is not Send, so a dedicated thread owns it; this
/// handle keeps the command channel, the shared frame buffer and a
/// pipeline instance of its own for the on-demand snapshot path.
pub struct AudioCaptureHandle {
    command_tx: mpsc::Sender<AudioCommand>,
    thread_handle: Option<JoinHandle<()>>,
    frame: Arc<FrameBuffer>,
    snapshot_pipeline: SpectrumPipeline,
}

impl AudioCaptureHandle {
    /// Start capturing from the named input device, or the default
    /// device when `None`.
    ///
    /// Returns once the stream is playing. Device lookup, stream build
    /// and playback failures are reported back from the capture thread
    /// so a misconfigured setup surfaces here instead of starting a
    /// pipeline that never publishes.
    pub fn new(config: AudioConfig, device_name: Option<String>) -> Result<Self, CaptureError> {
        let snapshot_pipeline = SpectrumPipeline::new(&config)?;
        let frame = Arc::new(FrameBuffer::new(config.chunk_size, config.num_bars));

        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let frame_clone = frame.clone();
        let thread_handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                run_audio_thread(config, device_name, command_rx, ready_tx, frame_clone);
            })
            .map_err(|e| CaptureError::ThreadError(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                command_tx,
                thread_handle: Some(thread_handle),
                frame,
                snapshot_pipeline,
            }),
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(CaptureError::ThreadError(
                    "capture thread exited before reporting readiness".to_string(),
                ))
            }
        }
    }

    /// The shared frame buffer, for consumers that want to read the
    /// chunk/bands pair themselves.
    pub fn frame(&self) -> &Arc<FrameBuffer> {
        &self.frame
    }

    /// Latest linear-magnitude bars, for the refresh tick.
    pub fn latest_bands(&self) -> Vec<f32> {
        self.frame.latest_bands()
    }

    /// Recompute every pipeline stage from the latest captured chunk.
    ///
    /// Runs on the caller's thread with its own pipeline instance; the
    /// capture timeline is not involved beyond the brief frame read.
    pub fn snapshot(&self) -> Result<PipelineSnapshot, DspError> {
        let frame = self.frame.read();
        self.snapshot_pipeline.snapshot(&frame.chunk)
    }

    /// Stop the capture stream and join the thread.
    pub fn stop(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AudioCaptureHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the capture thread: build and start the stream, report the
/// result, then park until told to stop. The stream delivers chunks on
/// cpal's callback thread for as long as this thread keeps it alive.
fn run_audio_thread(
    config: AudioConfig,
    device_name: Option<String>,
    command_rx: mpsc::Receiver<AudioCommand>,
    ready_tx: mpsc::Sender<Result<(), CaptureError>>,
    frame: Arc<FrameBuffer>,
) {
    let stream = match start_stream(&config, device_name.as_deref(), frame) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    match command_rx.recv() {
        Ok(AudioCommand::Stop) => log::info!("Audio capture stopping"),
        Err(_) => log::info!("Audio capture channel disconnected"),
    }

    drop(stream);
}

fn start_stream(
    config: &AudioConfig,
    device_name: Option<&str>,
    frame: Arc<FrameBuffer>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();

    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| CaptureError::ConfigError(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| CaptureError::DeviceNotFound(name.to_string()))?,
        None => host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?,
    };

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::ConfigError(e.to_string()))?;
    if supported.sample_format() != SampleFormat::F32 {
        return Err(CaptureError::UnsupportedFormat(format!(
            "{:?}",
            supported.sample_format()
        )));
    }

    let channels = supported.channels() as usize;
    let stream_config = StreamConfig {
        channels: supported.channels(),
        sample_rate: SampleRate(config.sample_rate),
        buffer_size: BufferSize::Fixed(config.chunk_size as u32),
    };

    log::info!(
        "Audio capture: {} Hz, {} channels, {}-sample chunks",
        config.sample_rate,
        channels,
        config.chunk_size
    );

    let pipeline = SpectrumPipeline::new(config)?;
    let chunk_size = config.chunk_size;

    // A stream fault is terminal for capture; log it once and let the
    // display keep rendering the last published frame.
    let stream_failed = AtomicBool::new(false);

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Downmix interleaved frames to mono.
                let mono: Vec<f32> = data
                    .chunks(channels)
                    .map(|samples| samples.iter().sum::<f32>() / channels as f32)
                    .collect();

                // A short or oversized driver buffer breaks the
                // fixed-length invariant; drop it and wait for the next
                // period.
                if mono.len() != chunk_size {
                    log::trace!(
                        "Dropping chunk of {} samples (expected {})",
                        mono.len(),
                        chunk_size
                    );
                    return;
                }

                // Full DSP before the lock; publish only copies.
                match pipeline.process(&mono) {
                    Ok(bands) => frame.publish(&mono, &bands),
                    Err(e) => log::warn!("Pipeline error, keeping previous frame: {}", e),
                }
            },
            move |err| {
                if !stream_failed.swap(true, Ordering::Relaxed) {
                    log::error!("Audio stream error: {}", err);
                }
            },
            None,
        )
        .map_err(|e| CaptureError::StreamError(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::PlayError(e.to_string()))?;

    log::info!("Audio capture started");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::FrameBuffer;
    use std::thread;

    #[test]
    fn read_before_any_publish_is_all_zeros() {
        let buffer = FrameBuffer::new(16, 4);
        let frame = buffer.read();
        assert_eq!(frame.chunk, vec![0.0; 16]);
        assert_eq!(frame.bands, vec![0.0; 4]);
    }

    #[test]
    fn read_returns_the_published_pair() {
        let buffer = FrameBuffer::new(4, 2);
        buffer.publish(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0]);

        let frame = buffer.read();
        assert_eq!(frame.chunk, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(frame.bands, vec![5.0, 6.0]);
        assert_eq!(buffer.latest_bands(), vec![5.0, 6.0]);
    }

    #[test]
    fn later_publish_overwrites_earlier() {
        let buffer = FrameBuffer::new(2, 2);
        buffer.publish(&[1.0, 1.0], &[1.0, 1.0]);
        buffer.publish(&[2.0, 2.0], &[2.0, 2.0]);
        assert_eq!(buffer.read().bands, vec![2.0, 2.0]);
    }

    #[test]
    fn concurrent_publish_and_read_never_tear() {
        let buffer = FrameBuffer::new(64, 8);

        // Each publish writes one marker value into both halves; any
        // read mixing two publishes would show mismatched markers.
        thread::scope(|s| {
            s.spawn(|| {
                for i in 1..=2000u32 {
                    let marker = i as f32;
                    buffer.publish(&vec![marker; 64], &vec![marker; 8]);
                }
            });
            s.spawn(|| {
                for _ in 0..2000 {
                    let frame = buffer.read();
                    assert!(frame.chunk.iter().all(|&x| x == frame.chunk[0]));
                    assert!(frame.bands.iter().all(|&x| x == frame.bands[0]));
                    assert_eq!(frame.chunk[0], frame.bands[0]);
                }
            });
        });
    }
}
