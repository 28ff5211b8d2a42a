// Command types - control surface → audio callback
//
// Each command is fully constructed on the control thread before it is
// pushed; popping one is the only way state reaches the audio side.

use crate::metronome::bar::ClickTrack;

#[derive(Debug, Clone)]
pub enum Command {
    /// Begin playback from the top of a bar with a freshly built track
    Start(ClickTrack),
    /// Stop playback; generator state is kept until the next start
    Stop,
    /// Replace the bar mid-playback, preserving the fractional bar position
    InstallTrack(ClickTrack),
}
