// Tactus - drift-corrected metronome
// Library exports for tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod metronome;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::engine::AudioEngine;
pub use audio::parameters::AtomicF32;
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::command::Command;
pub use metronome::{
    ClickEngine, ClickSounds, ClickTrack, DriftPolicy, DriftTracker, MetronomeController,
    MetronomeError, SharedPlayback, Tempo, TimeSignature, WindowGenerator,
};
