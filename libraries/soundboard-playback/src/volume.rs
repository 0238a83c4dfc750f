//! Shared volume level for one sound
//!
//! The UI writes it (slider), the volume sync loop polls it. Values are linear
//! gain in [0.0, 1.0].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Default slider position for a freshly scanned sound
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Volume control shared between the UI and the tracker
///
/// Cloning yields another handle to the same level.
#[derive(Debug, Clone)]
pub struct VolumeControl {
    /// f32 bit pattern
    bits: Arc<AtomicU32>,
}

impl VolumeControl {
    /// Create a control at `level` (clamped)
    pub fn new(level: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(clamp(level).to_bits())),
        }
    }

    /// Set the level (clamped to 0.0-1.0, NaN becomes 0.0)
    pub fn set(&self, level: f32) {
        self.bits.store(clamp(level).to_bits(), Ordering::Relaxed);
    }

    /// Current level
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

fn clamp(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = VolumeControl::new(0.8);
        assert_eq!(vol.get(), 0.8);
        assert_eq!(VolumeControl::default().get(), DEFAULT_VOLUME);
    }

    #[test]
    fn set_volume_clamps() {
        let vol = VolumeControl::new(0.5);

        vol.set(1.5);
        assert_eq!(vol.get(), 1.0);

        vol.set(-0.2);
        assert_eq!(vol.get(), 0.0);

        vol.set(f32::NAN);
        assert_eq!(vol.get(), 0.0);
    }

    #[test]
    fn clones_share_the_level() {
        let slider = VolumeControl::new(0.5);
        let polled = slider.clone();

        slider.set(0.25);
        assert_eq!(polled.get(), 0.25);
    }
}
