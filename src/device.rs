//! # Device Detection
//!
//! Selects the compute device (CPU/GPU) for model inference, with automatic
//! detection and CPU fallback when the preferred accelerator is unavailable.

use candle_core::Device;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Cached best available device to avoid repeated detection
static BEST_DEVICE: OnceLock<Device> = OnceLock::new();

/// Device preferences for model inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// Automatically select the best available device
    #[default]
    Auto,
    /// Force CPU usage
    Cpu,
    /// Force CUDA GPU usage (falls back to CPU if not available)
    Cuda,
    /// Force Metal GPU usage (falls back to CPU if not available)
    Metal,
}

impl std::str::FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "automatic" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            "metal" => Ok(DevicePreference::Metal),
            _ => Err(format!("Unknown device preference: {}", s)),
        }
    }
}

/// Get a device matching the preference, falling back to CPU.
pub fn get_device(preference: DevicePreference) -> Device {
    match preference {
        DevicePreference::Auto => get_best_device(),
        DevicePreference::Cpu => Device::Cpu,
        DevicePreference::Cuda => get_cuda_device().unwrap_or(Device::Cpu),
        DevicePreference::Metal => get_metal_device().unwrap_or(Device::Cpu),
    }
}

/// Get the best available device (detection result is cached).
pub fn get_best_device() -> Device {
    BEST_DEVICE.get_or_init(detect_best_device).clone()
}

/// Parse a device preference string and resolve it, using auto-detection on
/// invalid input rather than failing startup.
pub fn create_device_from_string(device_str: &str) -> Device {
    match device_str.parse::<DevicePreference>() {
        Ok(preference) => get_device(preference),
        Err(_) => {
            warn!("Invalid device preference '{}', using auto", device_str);
            get_best_device()
        }
    }
}

fn detect_best_device() -> Device {
    info!("Detecting best available compute device...");

    if let Some(cuda_device) = get_cuda_device() {
        info!("Selected CUDA GPU for ML inference");
        return cuda_device;
    }

    if let Some(metal_device) = get_metal_device() {
        info!("Selected Metal GPU for ML inference");
        return metal_device;
    }

    info!("Using CPU for ML inference (no GPU acceleration available)");
    Device::Cpu
}

fn get_cuda_device() -> Option<Device> {
    match Device::new_cuda(0) {
        Ok(device) => Some(device),
        Err(e) => {
            debug!("CUDA not available: {}", e);
            None
        }
    }
}

fn get_metal_device() -> Option<Device> {
    match Device::new_metal(0) {
        Ok(device) => Some(device),
        Err(e) => {
            debug!("Metal not available: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_preference_parsing() {
        assert_eq!("auto".parse::<DevicePreference>().unwrap(), DevicePreference::Auto);
        assert_eq!("cpu".parse::<DevicePreference>().unwrap(), DevicePreference::Cpu);
        assert_eq!("CUDA".parse::<DevicePreference>().unwrap(), DevicePreference::Cuda);
        assert_eq!("metal".parse::<DevicePreference>().unwrap(), DevicePreference::Metal);
        assert!("invalid".parse::<DevicePreference>().is_err());
    }

    #[test]
    fn test_cpu_preference_always_resolves() {
        let device = get_device(DevicePreference::Cpu);
        assert!(matches!(device, Device::Cpu));
    }

    #[test]
    fn test_invalid_string_falls_back_to_auto() {
        // Must not panic, whatever hardware the test runs on
        let _ = create_device_from_string("quantum");
    }
}
