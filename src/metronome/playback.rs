// Shared playback state - transport info visible to the UI
// Written by the audio callback, read by the UI thread via atomics

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Lock-free view of what the click engine is currently doing
///
/// Display-only: the authoritative cursor lives with the window generator on
/// the audio side.
#[derive(Debug, Default)]
pub struct SharedPlayback {
    running: AtomicBool,
    beat_index: AtomicU32,
    bars_elapsed: AtomicU64,
}

impl SharedPlayback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    /// Beat currently sounding, 0-based within the bar
    pub fn beat_index(&self) -> u32 {
        self.beat_index.load(Ordering::Relaxed)
    }

    pub fn set_beat_index(&self, beat: u32) {
        self.beat_index.store(beat, Ordering::Relaxed);
    }

    pub fn bars_elapsed(&self) -> u64 {
        self.bars_elapsed.load(Ordering::Relaxed)
    }

    pub fn set_bars_elapsed(&self, bars: u64) {
        self.bars_elapsed.store(bars, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_state_updates() {
        let playback = SharedPlayback::new();
        assert!(!playback.is_running());
        assert_eq!(playback.beat_index(), 0);

        playback.set_running(true);
        playback.set_beat_index(2);
        playback.set_bars_elapsed(17);

        assert!(playback.is_running());
        assert_eq!(playback.beat_index(), 2);
        assert_eq!(playback.bars_elapsed(), 17);
    }
}
