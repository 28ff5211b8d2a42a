// Tempo-change coordination across the two execution contexts
//
// MetronomeController is the control-thread half: it validates requests,
// builds the replacement bar off the audio thread, and publishes it to the
// callback as one fully-constructed ClickTrack through the command ring
// buffer. ClickEngine is the audio-thread half: it pops commands between
// buffer fills and swaps the new state in, so the callback only ever sees
// the old state or the new one, never a mix. A rejected request changes
// nothing; a superseded one is simply overtaken by the next pop.

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::Command;
use crate::metronome::MetronomeResult;
use crate::metronome::bar::ClickTrack;
use crate::metronome::drift::DriftPolicy;
use crate::metronome::playback::SharedPlayback;
use crate::metronome::sounds::ClickSounds;
use crate::metronome::timeline::{Tempo, TimeSignature};
use crate::metronome::window::WindowGenerator;
use std::sync::Arc;

/// Control boundary of the metronome: start/stop, tempo, time signature
pub struct MetronomeController {
    command_tx: CommandProducer,
    sounds: ClickSounds,
    sample_rate: u32,
    tempo: Tempo,
    time_signature: TimeSignature,
    pending_time_signature: Option<TimeSignature>,
    running: bool,
}

impl MetronomeController {
    pub fn new(
        command_tx: CommandProducer,
        sounds: ClickSounds,
        sample_rate: u32,
        tempo: Tempo,
        time_signature: TimeSignature,
    ) -> Self {
        Self {
            command_tx,
            sounds,
            sample_rate,
            tempo,
            time_signature,
            pending_time_signature: None,
            running: false,
        }
    }

    /// Begin playback from the top of a bar
    ///
    /// Builds a fresh bar at the current parameters, so a time signature
    /// deferred during the previous run takes effect here.
    pub fn start(&mut self) -> MetronomeResult<()> {
        if self.running {
            return Ok(());
        }
        if let Some(ts) = self.pending_time_signature.take() {
            self.time_signature = ts;
        }
        let track = ClickTrack::build(
            self.tempo,
            self.time_signature,
            self.sample_rate,
            &self.sounds,
        )?;
        self.publish(Command::Start(track));
        self.running = true;
        Ok(())
    }

    /// Stop playback; generator state stays put until the next start
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.publish(Command::Stop);
        self.running = false;
    }

    /// Change tempo, mid-playback or not
    ///
    /// While running, the replacement bar is built here and published whole;
    /// the audio side remaps its cursor so the bar position is preserved.
    /// On any validation failure playback continues at the old tempo.
    pub fn set_tempo(&mut self, bpm: f64) -> MetronomeResult<()> {
        let tempo = Tempo::new(bpm)?;
        if self.running {
            let track = ClickTrack::build(
                tempo,
                self.time_signature,
                self.sample_rate,
                &self.sounds,
            )?;
            self.publish(Command::InstallTrack(track));
        }
        self.tempo = tempo;
        Ok(())
    }

    /// Change the time signature
    ///
    /// Unsupported during active playback: the value is stored and applied
    /// on the next start. Returns true when it took effect immediately,
    /// false when deferred.
    pub fn set_time_signature(&mut self, beats: u8, unit: u8) -> MetronomeResult<bool> {
        let ts = TimeSignature::new(beats, unit)?;
        if self.running {
            self.pending_time_signature = Some(ts);
            Ok(false)
        } else {
            self.time_signature = ts;
            self.pending_time_signature = None;
            Ok(true)
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn pending_time_signature(&self) -> Option<TimeSignature> {
        self.pending_time_signature
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn publish(&mut self, command: Command) {
        if ringbuf::traits::Producer::try_push(&mut self.command_tx, command).is_err() {
            // Ring full means the audio side stalled; the next request will
            // land once it drains
            log::warn!("command ring buffer full, request dropped");
        }
    }
}

/// Audio-thread half of the coordination: applies popped commands to the
/// window generator and renders frames for the callback
pub struct ClickEngine {
    window: Option<WindowGenerator>,
    running: bool,
    drift_policy: DriftPolicy,
    playback: Arc<SharedPlayback>,
}

impl ClickEngine {
    pub fn new(playback: Arc<SharedPlayback>, drift_policy: DriftPolicy) -> Self {
        Self {
            window: None,
            running: false,
            drift_policy,
            playback,
        }
    }

    /// Apply one command popped from the ring buffer
    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::Start(track) => {
                // Every run begins at the top of a bar with clean drift
                self.window = Some(WindowGenerator::new(track, self.drift_policy));
                self.running = true;
                self.playback.set_running(true);
                self.playback.set_beat_index(0);
                self.playback.set_bars_elapsed(0);
            }
            Command::Stop => {
                self.running = false;
                self.playback.set_running(false);
            }
            Command::InstallTrack(track) => match &mut self.window {
                Some(window) => window.install(track),
                None => {
                    self.window = Some(WindowGenerator::new(track, self.drift_policy));
                }
            },
        }
    }

    /// Fill `out` with the next frames, silence while stopped
    ///
    /// Real-time safe: no allocation, no locks, never fails. Requests that
    /// arrive before any start produce silence rather than an error.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.running {
            out.fill(0.0);
            return;
        }
        let Some(window) = &mut self.window else {
            out.fill(0.0);
            return;
        };

        window.pull(out);
        self.playback.set_beat_index(window.beat_index() as u32);
        self.playback.set_bars_elapsed(window.bars_elapsed());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn window(&self) -> Option<&WindowGenerator> {
        self.window.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::{CommandConsumer, create_command_channel};
    use ringbuf::traits::Consumer;

    fn controller() -> (MetronomeController, CommandConsumer) {
        let (tx, rx) = create_command_channel(16);
        let sounds = ClickSounds::from_waveforms(vec![1.0, 0.5], vec![0.8, 0.4]).unwrap();
        let controller = MetronomeController::new(
            tx,
            sounds,
            48000,
            Tempo::default(),
            TimeSignature::four_four(),
        );
        (controller, rx)
    }

    #[test]
    fn test_start_publishes_fresh_track() {
        let (mut controller, mut rx) = controller();
        controller.start().unwrap();
        assert!(controller.is_running());

        match rx.try_pop() {
            Some(Command::Start(track)) => {
                assert_eq!(track.nominal_step(), 24000);
                assert_eq!(track.beats_per_bar(), 4);
            }
            other => panic!("expected Start, got {:?}", other.is_some()),
        }

        // Second start is a no-op
        controller.start().unwrap();
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_set_tempo_while_running_publishes_install() {
        let (mut controller, mut rx) = controller();
        controller.start().unwrap();
        let _ = rx.try_pop();

        controller.set_tempo(145.0).unwrap();
        assert_eq!(controller.tempo().bpm(), 145.0);

        match rx.try_pop() {
            Some(Command::InstallTrack(track)) => {
                assert_eq!(track.nominal_step(), 19862);
            }
            other => panic!("expected InstallTrack, got {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_set_tempo_while_stopped_publishes_nothing() {
        let (mut controller, mut rx) = controller();
        controller.set_tempo(90.0).unwrap();
        assert_eq!(controller.tempo().bpm(), 90.0);
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_invalid_tempo_rejected_without_side_effects() {
        let (mut controller, mut rx) = controller();
        controller.start().unwrap();
        let _ = rx.try_pop();

        assert!(controller.set_tempo(0.0).is_err());
        assert!(controller.set_tempo(-30.0).is_err());
        assert_eq!(controller.tempo().bpm(), 120.0);
        assert!(rx.try_pop().is_none());
    }

    #[test]
    fn test_time_signature_deferred_while_running() {
        let (mut controller, mut rx) = controller();
        controller.start().unwrap();
        let _ = rx.try_pop();

        let applied = controller.set_time_signature(3, 4).unwrap();
        assert!(!applied);
        assert_eq!(controller.time_signature(), TimeSignature::four_four());
        assert_eq!(
            controller.pending_time_signature(),
            Some(TimeSignature::three_four())
        );
        assert!(rx.try_pop().is_none());

        // Takes effect on the next start
        controller.stop();
        let _ = rx.try_pop();
        controller.start().unwrap();
        assert_eq!(controller.time_signature(), TimeSignature::three_four());
        match rx.try_pop() {
            Some(Command::Start(track)) => assert_eq!(track.beats_per_bar(), 3),
            other => panic!("expected Start, got {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_time_signature_applies_immediately_when_stopped() {
        let (mut controller, _rx) = controller();
        let applied = controller.set_time_signature(6, 8).unwrap();
        assert!(applied);
        assert_eq!(controller.time_signature(), TimeSignature::six_eight());
    }

    #[test]
    fn test_engine_renders_silence_until_started() {
        let playback = SharedPlayback::new();
        let mut engine = ClickEngine::new(playback.clone(), DriftPolicy::default());

        let mut out = [0.5f32; 64];
        engine.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!playback.is_running());
    }

    #[test]
    fn test_engine_start_stop_cycle() {
        let (mut controller, mut rx) = controller();
        let playback = SharedPlayback::new();
        let mut engine = ClickEngine::new(playback.clone(), DriftPolicy::default());

        controller.start().unwrap();
        engine.apply_command(rx.try_pop().unwrap());
        assert!(engine.is_running());
        assert!(playback.is_running());

        let mut out = [0.0f32; 4];
        engine.render(&mut out);
        assert_eq!(out[0], 1.0); // downbeat accent

        controller.stop();
        engine.apply_command(rx.try_pop().unwrap());
        assert!(!engine.is_running());
        assert!(!playback.is_running());

        let mut out = [0.5f32; 4];
        engine.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_engine_tempo_change_keeps_position() {
        let (mut controller, mut rx) = controller();
        let playback = SharedPlayback::new();
        let mut engine = ClickEngine::new(playback, DriftPolicy::default());

        controller.start().unwrap();
        engine.apply_command(rx.try_pop().unwrap());

        // Halfway through the bar at 120 BPM / 48kHz
        let mut out = vec![0.0f32; 48000];
        engine.render(&mut out);

        controller.set_tempo(145.0).unwrap();
        engine.apply_command(rx.try_pop().unwrap());

        let window = engine.window().unwrap();
        assert!((window.bar_fraction() - 0.5).abs() < 1e-3);
        assert_eq!(window.beat_index(), 2);
    }

    #[test]
    fn test_superseded_requests_last_one_wins() {
        let (mut controller, mut rx) = controller();
        let playback = SharedPlayback::new();
        let mut engine = ClickEngine::new(playback, DriftPolicy::default());

        controller.start().unwrap();
        controller.set_tempo(145.0).unwrap();
        controller.set_tempo(60.0).unwrap();
        controller.set_tempo(180.0).unwrap();

        // The callback drains the whole queue before the next fill
        while let Some(cmd) = rx.try_pop() {
            engine.apply_command(cmd);
        }

        let window = engine.window().unwrap();
        assert_eq!(window.track().nominal_step(), 16000); // 48000 * 60 / 180
    }
}
