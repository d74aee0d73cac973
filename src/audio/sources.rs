//! Input-device enumeration

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An available capture device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSource {
    /// Device name as accepted by [`AudioCaptureHandle::new`]
    ///
    /// [`AudioCaptureHandle::new`]: crate::audio::AudioCaptureHandle::new
    pub id: String,

    /// Display name
    pub name: String,
}

/// Audio source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to enumerate devices: {0}")]
    EnumerationError(String),
}

/// List available input devices (microphones).
pub fn list_sources() -> Result<Vec<AudioSource>, SourceError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .map_err(|e| SourceError::EnumerationError(e.to_string()))?;

    let mut sources = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            let display = if default_name.as_deref() == Some(name.as_str()) {
                format!("{} (default)", name)
            } else {
                name.clone()
            };
            sources.push(AudioSource { id: name, name: display });
        }
    }

    Ok(sources)
}
