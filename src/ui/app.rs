// Main metronome window
//
// The UI never touches playback state directly: every change goes through
// MetronomeController (which publishes into the command ring buffer) or an
// atomic parameter, and everything it displays comes back through the
// notification ring buffer or the shared playback atomics.

use crate::audio::device::{AtomicDeviceStatus, AudioDeviceManager, DeviceStatus};
use crate::audio::parameters::AtomicF32;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::metronome::coordinator::MetronomeController;
use crate::metronome::playback::SharedPlayback;
use eframe::egui;
use std::collections::VecDeque;
use std::sync::Arc;

/// Slider range; the engine itself accepts any positive tempo
const TEMPO_MIN: f64 = 40.0;
const TEMPO_MAX: f64 = 300.0;

/// Time signatures offered in the selector
const TIME_SIGNATURES: [(u8, u8); 6] = [(2, 4), (3, 4), (4, 4), (5, 4), (6, 8), (7, 8)];

pub struct MetronomeApp {
    controller: MetronomeController,
    playback: Arc<SharedPlayback>,
    volume_atomic: AtomicF32,
    volume_ui: f32,
    tempo_ui: f64,
    device_status: AtomicDeviceStatus,
    output_device_name: String,
    // Notification system
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    max_notifications: usize,
}

impl MetronomeApp {
    pub fn new(
        controller: MetronomeController,
        playback: Arc<SharedPlayback>,
        volume_atomic: AtomicF32,
        device_status: AtomicDeviceStatus,
        notification_rx: NotificationConsumer,
    ) -> Self {
        let tempo_ui = controller.tempo().bpm();
        let volume_ui = volume_atomic.get();

        let output_device_name = AudioDeviceManager::new()
            .list_output_devices()
            .into_iter()
            .find(|d| d.is_default)
            .map(|d| d.name)
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            controller,
            playback,
            volume_atomic,
            volume_ui,
            tempo_ui,
            device_status,
            output_device_name,
            notification_rx,
            notification_queue: VecDeque::new(),
            max_notifications: 10,
        }
    }

    /// Drain new notifications from the ring buffer into the display queue
    fn update_notifications(&mut self) {
        while let Some(notification) =
            ringbuf::traits::Consumer::try_pop(&mut self.notification_rx)
        {
            self.push_notification(notification);
        }
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notification_queue.push_back(notification);
        if self.notification_queue.len() > self.max_notifications {
            self.notification_queue.pop_front();
        }
    }

    /// Notifications younger than 5 seconds, newest first
    fn recent_notifications(&self) -> Vec<&Notification> {
        self.notification_queue
            .iter()
            .rev()
            .filter(|n| n.is_recent(5000))
            .take(3)
            .collect()
    }

    fn toggle_playback(&mut self) {
        if self.controller.is_running() {
            self.controller.stop();
        } else if let Err(e) = self.controller.start() {
            self.push_notification(Notification::error(
                NotificationCategory::Transport,
                format!("Cannot start: {}", e),
            ));
        }
    }

    /// Apply a tempo change, reverting the slider on rejection
    fn apply_tempo(&mut self, bpm: f64) {
        match self.controller.set_tempo(bpm) {
            Ok(()) => self.tempo_ui = bpm,
            Err(e) => {
                self.tempo_ui = self.controller.tempo().bpm();
                self.push_notification(Notification::error(
                    NotificationCategory::Transport,
                    format!("Tempo rejected: {}", e),
                ));
            }
        }
    }

    /// Nudge the tempo by a delta, pinned to the slider range
    fn adjust_tempo(&mut self, delta: f64) {
        let bpm = (self.controller.tempo().bpm() + delta).clamp(TEMPO_MIN, TEMPO_MAX);
        self.apply_tempo(bpm);
    }

    fn apply_time_signature(&mut self, beats: u8, unit: u8) {
        match self.controller.set_time_signature(beats, unit) {
            Ok(true) => {}
            Ok(false) => {
                self.push_notification(Notification::info(
                    NotificationCategory::Transport,
                    format!("Time signature {}/{} will apply on next start", beats, unit),
                ));
            }
            Err(e) => {
                self.push_notification(Notification::error(
                    NotificationCategory::Transport,
                    format!("Time signature rejected: {}", e),
                ));
            }
        }
    }

    /// Space for start/stop, arrows for tempo nudges
    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.toggle_playback();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowUp)) {
            self.adjust_tempo(1.0);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowDown)) {
            self.adjust_tempo(-1.0);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.adjust_tempo(10.0);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.adjust_tempo(-10.0);
        }
    }

    fn draw_tempo_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("{:.0} BPM", self.controller.tempo().bpm()));
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if ui.button("-10").clicked() {
                self.adjust_tempo(-10.0);
            }
            if ui.button("-5").clicked() {
                self.adjust_tempo(-5.0);
            }

            let slider = ui.add(
                egui::Slider::new(&mut self.tempo_ui, TEMPO_MIN..=TEMPO_MAX)
                    .step_by(1.0)
                    .show_value(false),
            );
            // Like the slider-release binding of old: the new tempo lands
            // when the drag ends, not on every pixel of movement
            if slider.drag_stopped() {
                self.apply_tempo(self.tempo_ui);
            }

            if ui.button("+5").clicked() {
                self.adjust_tempo(5.0);
            }
            if ui.button("+10").clicked() {
                self.adjust_tempo(10.0);
            }
        });
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.controller.is_running() {
                "STOP"
            } else {
                "START"
            };
            if ui
                .add(egui::Button::new(label).min_size(egui::vec2(120.0, 40.0)))
                .clicked()
            {
                self.toggle_playback();
            }

            ui.add_space(20.0);

            let current = self.controller.time_signature();
            let mut selected = (current.numerator, current.denominator);
            egui::ComboBox::from_label("Time signature")
                .selected_text(format!("{}/{}", selected.0, selected.1))
                .show_ui(ui, |ui| {
                    for &(beats, unit) in &TIME_SIGNATURES {
                        ui.selectable_value(
                            &mut selected,
                            (beats, unit),
                            format!("{}/{}", beats, unit),
                        );
                    }
                });
            if selected != (current.numerator, current.denominator) {
                self.apply_time_signature(selected.0, selected.1);
            }
        });
    }

    /// Light up the beat currently sounding
    fn draw_beat_indicator(&self, ui: &mut egui::Ui) {
        let beats = self.controller.time_signature().beats_per_bar();
        let running = self.playback.is_running();
        let current = self.playback.beat_index() as usize;

        ui.horizontal(|ui| {
            for beat in 0..beats {
                let active = running && beat == current;
                let color = if !active {
                    egui::Color32::from_gray(60)
                } else if beat == 0 {
                    egui::Color32::from_rgb(255, 165, 0) // downbeat
                } else {
                    egui::Color32::from_rgb(100, 200, 100)
                };
                ui.label(
                    egui::RichText::new(format!("{}", beat + 1))
                        .size(28.0)
                        .strong()
                        .color(color),
                );
                ui.add_space(8.0);
            }

            if running {
                ui.add_space(20.0);
                ui.label(format!("bar {}", self.playback.bars_elapsed() + 1));
            }
        });
    }

    fn draw_volume(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Volume");
            let slider = ui.add(egui::Slider::new(&mut self.volume_ui, 0.0..=1.0));
            if slider.changed() {
                self.volume_atomic.set(self.volume_ui);
            }
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            let (status_icon, status_color) = match self.device_status.get() {
                DeviceStatus::Connected => ("●", egui::Color32::from_rgb(100, 200, 100)),
                DeviceStatus::Connecting => ("●", egui::Color32::from_rgb(255, 165, 0)),
                DeviceStatus::Error | DeviceStatus::Disconnected => ("●", egui::Color32::RED),
            };
            ui.colored_label(status_color, status_icon);
            ui.label(&self.output_device_name);
            ui.add_space(10.0);

            let recent = self.recent_notifications();
            if recent.is_empty() {
                ui.label("Ready");
            } else {
                for notification in recent {
                    let (icon, color) = match notification.level {
                        NotificationLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 150, 255)),
                        NotificationLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 165, 0)),
                        NotificationLevel::Error => ("✖", egui::Color32::RED),
                    };
                    ui.colored_label(color, icon);
                    ui.colored_label(color, &notification.message);
                    ui.add_space(10.0);
                }
            }
        });
    }
}

impl eframe::App for MetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep repainting so the beat indicator follows the audio thread
        ctx.request_repaint();

        self.update_notifications();
        self.handle_keyboard(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(5.0);
            self.draw_tempo_controls(ui);
            ui.add_space(10.0);
            self.draw_beat_indicator(ui);
            ui.add_space(10.0);
            self.draw_transport(ui);
            ui.add_space(10.0);
            self.draw_volume(ui);

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                self.draw_status_bar(ui);
            });
        });
    }
}
