// Audio engine - CPAL real-time callback
//
// # Format Support
//
// The engine detects the output device's preferred sample format via
// `sample_format()` and builds the matching stream. All processing is mono
// f32 internally; conversion to the device format happens while writing the
// interleaved output buffer, with no allocation on the callback path.
//
// # Callback discipline
//
// The callback never blocks, allocates, or performs I/O. All state it needs
// is either atomic or reached through an uncontended `try_lock` (the control
// thread communicates exclusively through the command ring buffer, so the
// click engine lock has a single locker). If a lock were ever contended the
// callback writes silence for that period instead of waiting.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

use crate::audio::device::{AtomicDeviceStatus, DeviceStatus};
use crate::audio::dsp::{OnePoleSmoother, clip_guard};
use crate::audio::format::write_mono_frame;
use crate::audio::parameters::AtomicF32;
use crate::messaging::channels::{CommandConsumer, NotificationProducer};
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::metronome::coordinator::ClickEngine;
use crate::metronome::drift::DriftPolicy;
use crate::metronome::playback::SharedPlayback;

/// Frames rendered per inner block; callbacks asking for more are served in
/// slices of this size
const RENDER_BLOCK: usize = 1024;

/// Volume smoothing time constant (anti-click)
const VOLUME_SMOOTHING_MS: f32 = 10.0;

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: u32,
    pub volume: AtomicF32,
    pub status: AtomicDeviceStatus,
}

impl AudioEngine {
    pub fn new(
        command_rx: CommandConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
        playback: Arc<SharedPlayback>,
        drift_policy: DriftPolicy,
    ) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or("No audio output device found")?;
        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| format!("Output configuration error: {}", e))?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        log::debug!("Output config: {:?}", supported_config);

        let config: StreamConfig = supported_config.into();

        // Volume parameter shared with the UI thread
        let volume = AtomicF32::new(0.8);

        let status = AtomicDeviceStatus::new(DeviceStatus::Connecting);

        // Callback-owned generator state; the control thread never locks
        // this, it talks through the command ring buffer
        let click_engine = Arc::new(Mutex::new(ClickEngine::new(playback, drift_policy)));
        let command_rx = Arc::new(Mutex::new(command_rx));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                command_rx,
                click_engine,
                volume.clone(),
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                command_rx,
                click_engine,
                volume.clone(),
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                command_rx,
                click_engine,
                volume.clone(),
                status.clone(),
                notification_tx.clone(),
            ),
            _ => {
                return Err(format!(
                    "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                    sample_format
                ));
            }
        }?;

        stream
            .play()
            .map_err(|e| format!("Error starting stream: {}", e))?;

        status.set(DeviceStatus::Connected);
        log::info!("Audio engine started: {} Hz, {} channels", sample_rate, channels);

        if let Ok(mut tx) = notification_tx.try_lock() {
            let notif = Notification::info(
                NotificationCategory::Audio,
                format!("Audio connected: {} Hz", sample_rate),
            );
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            volume,
            status,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Build an output stream with automatic format conversion
    ///
    /// Generic over the device sample type; the callback renders f32 and
    /// converts at the buffer write.
    #[allow(clippy::too_many_arguments)]
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        command_rx: Arc<Mutex<CommandConsumer>>,
        click_engine: Arc<Mutex<ClickEngine>>,
        volume: AtomicF32,
        status: AtomicDeviceStatus,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, String>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        // Pre-allocated outside the callback; the callback only slices it
        let mut scratch = vec![0.0f32; RENDER_BLOCK];
        let mut volume_smoother = OnePoleSmoother::new(
            volume.get(),
            VOLUME_SMOOTHING_MS,
            config.sample_rate.0 as f32,
        );

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // ========== REAL-TIME ZONE ==========
                    // No allocations, no I/O, no blocking locks

                    // Apply pending control commands (start/stop/new track)
                    if let Ok(mut rx) = command_rx.try_lock() {
                        if let Ok(mut engine) = click_engine.try_lock() {
                            while let Some(cmd) = ringbuf::traits::Consumer::try_pop(&mut *rx) {
                                engine.apply_command(cmd);
                            }
                        }
                    }

                    // Render the click track
                    if let Ok(mut engine) = click_engine.try_lock() {
                        for block in data.chunks_mut(RENDER_BLOCK * channels) {
                            let frames = block.len() / channels;
                            engine.render(&mut scratch[..frames]);

                            for (frame, &sample) in
                                block.chunks_mut(channels).zip(scratch.iter())
                            {
                                let gain = volume_smoother.process(volume.get());
                                write_mono_frame(clip_guard(sample * gain), frame);
                            }
                        }
                    } else {
                        // Silence beats waiting if the state is ever contended
                        for frame in data.chunks_mut(channels) {
                            write_mono_frame(0.0, frame);
                        }
                    }
                    // ========== REAL-TIME ZONE END ==========
                },
                move |err| {
                    // Runs outside the audio callback, I/O is fine here
                    log::error!("Audio stream error: {}", err);

                    status.set(DeviceStatus::Error);

                    if let Ok(mut tx) = notification_tx.try_lock() {
                        let notif = Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio stream error: {}", err),
                        );
                        let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                    }
                },
                None,
            )
            .map_err(|e| format!("Error in stream creation: {}", e))?;

        Ok(stream)
    }
}
