use std::sync::{Arc, Mutex};
use tactus::metronome::{DriftPolicy, MetronomeController, SharedPlayback, Tempo, TimeSignature};
use tactus::ui::MetronomeApp;
use tactus::{AudioEngine, ClickSounds, create_command_channel, create_notification_channel};

// Ring buffer capacities
// Commands carry whole click tracks, and the audio callback drains the queue
// every buffer period (~a few ms), so even a burst of slider updates stays
// far below capacity
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

/// Click sample files probed at startup; synthesis is the fallback
const HI_CLICK_PATH: &str = "samples/hi.wav";
const LO_CLICK_PATH: &str = "samples/lo.wav";

fn main() {
    env_logger::init();
    log::info!("=== Tactus metronome ===");

    // Communication channels: commands toward the audio callback,
    // notifications back toward the UI
    let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    let playback = SharedPlayback::new();

    log::info!("Audio engine initialisation...");
    let audio_engine = match AudioEngine::new(
        command_rx,
        notification_tx,
        playback.clone(),
        DriftPolicy::default(),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let sample_rate = audio_engine.sample_rate();
    let sounds = match ClickSounds::from_wav_files(HI_CLICK_PATH, LO_CLICK_PATH, sample_rate) {
        Ok(sounds) => {
            log::info!("Click samples loaded from {} / {}", HI_CLICK_PATH, LO_CLICK_PATH);
            sounds
        }
        Err(e) => {
            log::warn!("Falling back to synthesized clicks: {}", e);
            ClickSounds::synthesized(sample_rate)
        }
    };

    let controller = MetronomeController::new(
        command_tx,
        sounds,
        sample_rate,
        Tempo::default(),
        TimeSignature::default(),
    );

    log::info!("Launching UI...");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 280.0])
            .with_title("Tactus"),
        ..Default::default()
    };

    // The engine owns the output stream; it must outlive the UI loop, so
    // only its shared handles move into the app
    let volume = audio_engine.volume.clone();
    let status = audio_engine.status.clone();

    let _ = eframe::run_native(
        "Tactus",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(MetronomeApp::new(
                controller,
                playback,
                volume,
                status,
                notification_rx,
            )))
        }),
    );
}
