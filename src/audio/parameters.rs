// Atomic parameters - lock-free UI ↔ audio thread values
// f32 stored as its bit pattern in an AtomicU32

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe f32 parameter shared between the UI and the audio callback
#[derive(Clone)]
pub struct AtomicF32 {
    inner: Arc<AtomicU32>,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    /// Set the value (control thread)
    pub fn set(&self, value: f32) {
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Get the value (audio thread)
    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_f32_roundtrip() {
        let param = AtomicF32::new(0.5);
        assert_eq!(param.get(), 0.5);

        param.set(0.125);
        assert_eq!(param.get(), 0.125);

        // Clones share the same storage
        let clone = param.clone();
        clone.set(1.0);
        assert_eq!(param.get(), 1.0);
    }
}
