use std::{fs::File, time::Duration};

use anyhow::Context;
use rodio::{
    Decoder, DeviceTrait, OutputStream, OutputStreamBuilder, Sink, Source,
    cpal::{self, traits::HostTrait},
};

use crate::track::Track;

/// Playback capability driven by the player, mirroring the surface of a host
/// media element: transport, volume, position and duration.
///
/// The boundary is infallible; implementations log failures and carry on,
/// and report an unknown duration as NaN.
pub trait MediaHandle {
    /// Begin or resume playback.
    fn play(&mut self);
    /// Pause playback, keeping the position.
    fn pause(&mut self);
    /// Apply a volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Current playback position in seconds.
    fn position_secs(&self) -> f32;
    /// Move the playback position.
    fn seek(&mut self, secs: f32);
    /// Stream duration in seconds, NaN while unknown.
    fn duration_secs(&self) -> f32;
}

/// `MediaHandle` over a rodio sink on the default output device.
pub struct RodioHandle {
    _stream: OutputStream,
    sink: Sink,
    device_name: String,
    duration_secs: f32,
}

impl RodioHandle {
    /// Open the default output device. Fails when the machine has none.
    pub fn try_default() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no default output device found")?;

        let device_name = device.name().unwrap_or_else(|_| "(unknown)".to_string());

        let stream = OutputStreamBuilder::from_device(device)
            .context("cannot create output stream builder for device")?
            .open_stream()
            .context("cannot open output stream")?;

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        log::info!("audio output on {device_name}");
        Ok(RodioHandle {
            _stream: stream,
            sink,
            device_name,
            duration_secs: f32::NAN,
        })
    }

    /// Replace the sink contents with the track's decoded audio. The sink is
    /// left in its current transport state; call `play` to start.
    pub fn load(&mut self, track: &Track) -> anyhow::Result<()> {
        let file = File::open(&track.path)
            .with_context(|| format!("failed to open {}", track.path.display()))?;
        let decoder = Decoder::try_from(file)
            .with_context(|| format!("failed to decode {}", track.path.display()))?;

        // Prefer the decoder's own figure, fall back to the tagged duration.
        self.duration_secs = decoder
            .total_duration()
            .map(|d| d.as_secs_f32())
            .unwrap_or(if track.duration_secs > 0.0 {
                track.duration_secs
            } else {
                f32::NAN
            });

        self.sink.clear();
        self.sink.append(decoder);
        log::debug!(
            "loaded {} ({:.1}s) on {}",
            track.path.display(),
            self.duration_secs,
            self.device_name
        );
        Ok(())
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl MediaHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position_secs(&self) -> f32 {
        self.sink.get_pos().as_secs_f32()
    }

    fn seek(&mut self, secs: f32) {
        if !secs.is_finite() || secs < 0.0 {
            return;
        }
        if let Err(e) = self.sink.try_seek(Duration::from_secs_f32(secs)) {
            log::warn!("seek to {secs:.1}s failed: {e}");
        }
    }

    fn duration_secs(&self) -> f32 {
        self.duration_secs
    }
}
