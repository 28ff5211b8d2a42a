// Metronome module - drift-corrected click track engine
// Bar synthesis, sliding-window playback, and tempo-change coordination

pub mod bar;
pub mod coordinator;
pub mod drift;
pub mod playback;
pub mod sounds;
pub mod timeline;
pub mod window;

pub use bar::ClickTrack;
pub use coordinator::{ClickEngine, MetronomeController};
pub use drift::{DriftPolicy, DriftTracker};
pub use playback::SharedPlayback;
pub use sounds::ClickSounds;
pub use timeline::{Tempo, TimeSignature};
pub use window::WindowGenerator;

use thiserror::Error;

/// Metronome-related errors
///
/// Every failure is a synchronous validation failure at the call that
/// introduced it; nothing is ever propagated to the audio thread.
#[derive(Debug, Error)]
pub enum MetronomeError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type MetronomeResult<T> = Result<T, MetronomeError>;
