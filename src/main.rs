//! Terminal demo consumer
//!
//! Polls the pipeline every 30 ms and renders the smoothed bars as a
//! block-character meter. Rendering is deliberately dumb; all the
//! signal processing lives in the library.

use spectrum_pipeline::audio::{self, AudioCaptureHandle, AudioConfig};
use spectrum_pipeline::dsp::TemporalSmoother;
use std::io::Write;
use std::time::{Duration, Instant};

const REFRESH_INTERVAL: Duration = Duration::from_millis(30);
const BLOCKS: [char; 9] = [' ', '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}'];

/// Optional JSON config file as the first argument; defaults otherwise.
fn load_config() -> AudioConfig {
    let Some(path) = std::env::args().nth(1) else {
        return AudioConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Invalid config {}: {}, using defaults", path, e);
                AudioConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read {}: {}, using defaults", path, e);
            AudioConfig::default()
        }
    }
}

fn render_bars(smoothed: &[f32], peak: f32) -> String {
    smoothed
        .iter()
        .map(|&v| {
            let level = ((v / peak) * (BLOCKS.len() - 1) as f32).round() as usize;
            BLOCKS[level.min(BLOCKS.len() - 1)]
        })
        .collect()
}

fn main() {
    env_logger::init();

    let config = load_config();

    match audio::list_sources() {
        Ok(sources) => {
            for source in &sources {
                log::info!("Input source: {}", source.name);
            }
        }
        Err(e) => log::warn!("Source enumeration failed: {}", e),
    }

    let capture = match AudioCaptureHandle::new(config.clone(), None) {
        Ok(capture) => capture,
        Err(e) => {
            log::error!("Failed to start audio capture: {}", e);
            eprintln!("Failed to start audio capture: {e}");
            eprintln!("Make sure a microphone is connected.");
            std::process::exit(1);
        }
    };

    let mut smoother = TemporalSmoother::new(config.num_bars, config.smoothing_factor);
    let mut peak = 1e-3f32;
    let started = Instant::now();
    let mut snapshot_taken = false;

    loop {
        let bands = capture.latest_bands();
        let smoothed = smoother.update(&bands);

        // Slowly decaying peak keeps the meter usable across quiet and
        // loud passages.
        peak = (peak * 0.995).max(smoothed.iter().cloned().fold(1e-3, f32::max));
        print!("\r{}", render_bars(smoothed, peak));
        let _ = std::io::stdout().flush();

        // One diagnostic snapshot once the first chunks have arrived.
        if !snapshot_taken && started.elapsed() > Duration::from_secs(2) {
            snapshot_taken = true;
            match capture.snapshot() {
                Ok(snapshot) => {
                    let loudest = snapshot
                        .binned_db
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.total_cmp(b.1))
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    log::info!(
                        "Snapshot: {} raw samples, {} FFT bins, loudest bar {} at {:.1} dB",
                        snapshot.raw_chunk.len(),
                        snapshot.magnitude.len(),
                        loudest,
                        snapshot.binned_db[loudest]
                    );
                }
                Err(e) => log::warn!("Snapshot failed: {}", e),
            }
        }

        std::thread::sleep(REFRESH_INTERVAL);
    }
}
