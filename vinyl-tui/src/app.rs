use crossbeam_channel::Receiver;
use ratatui::{crossterm::event::KeyCode, widgets::ListState};
use vinyl_core::{
    MediaHandle, Player, PlayerEvent, Track,
    media::RodioHandle,
};

const VOLUME_STEP: f32 = 0.05;

/// Application state for the TUI: the player itself plus view-only state.
pub struct App {
    pub player: Player<RodioHandle>,
    events: Receiver<PlayerEvent>,
    pub queue_state: ListState,
    pub status: String,
}

impl App {
    pub fn new(mut player: Player<RodioHandle>) -> Self {
        let events = player.subscribe();
        App {
            player,
            events,
            queue_state: ListState::default(),
            status: String::new(),
        }
    }

    /// Build the track list from CLI paths and start on the first track.
    pub fn load_paths(&mut self, paths: &[String]) {
        let mut tracks = Vec::with_capacity(paths.len());
        for path in paths {
            match Track::from_path(path) {
                Ok(track) => tracks.push(track),
                Err(e) => log::warn!("skipping {path}: {e:#}"),
            }
        }

        let Some(first) = tracks.first().cloned() else {
            self.status = "no playable files".to_string();
            return;
        };
        self.player.load_track(first, tracks);
        self.player.play();
    }

    /// Feed the controller a progress tick from the handle position.
    pub fn poll_progress(&mut self) {
        let position = self.player.handle().map(|h| h.position_secs());
        if let Some(position) = position {
            self.player.tick(position);
        }
    }

    /// Apply pending player events to the UI state.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PlayerEvent::TrackChanged(track) => self.on_track_changed(track),
                PlayerEvent::QueueChanged(_) => {
                    self.queue_state.select(self.current_queue_index());
                }
                PlayerEvent::Playing => self.status = "Playing".to_string(),
                PlayerEvent::Paused => self.status = "Paused".to_string(),
                PlayerEvent::VolumeChanged(v) => {
                    self.status = format!("Volume {:.0}%", v * 100.0);
                }
                PlayerEvent::RepeatChanged(mode) => {
                    self.status = format!("Repeat: {mode}");
                }
                PlayerEvent::ShuffleChanged(on) => {
                    self.status = format!("Shuffle {}", if on { "on" } else { "off" });
                }
                PlayerEvent::Progress { .. } => {}
            }
        }
    }

    /// The controller decided on a new current track; give its audio to the
    /// handle and resume if we were playing.
    fn on_track_changed(&mut self, track: Track) {
        let was_playing = self.player.is_playing();
        if let Some(handle) = self.player.handle_mut() {
            if let Err(e) = handle.load(&track) {
                log::error!("failed to load {}: {e:#}", track.path.display());
                self.status = format!("cannot play {}", track.display_title());
                return;
            }
        }
        if was_playing {
            self.player.play();
        }
        self.queue_state.select(self.current_queue_index());
        self.status = format!("Now: {}", track.display_title());
    }

    fn current_queue_index(&self) -> Option<usize> {
        self.player
            .current_track()
            .and_then(|t| self.player.queue().position_of(t))
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Char(' ') => {
                if self.player.is_playing() {
                    self.player.pause();
                } else {
                    self.player.play();
                }
            }
            KeyCode::Char('n') => self.player.next_track(),
            KeyCode::Char('p') => self.player.prev_track(),
            KeyCode::Char('r') => self.player.toggle_repeat(),
            KeyCode::Char('s') => self.player.toggle_shuffle(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let v = (self.player.volume() + VOLUME_STEP).min(1.0);
                self.player.set_volume(v);
            }
            KeyCode::Char('-') => {
                let v = (self.player.volume() - VOLUME_STEP).max(0.0);
                self.player.set_volume(v);
            }
            KeyCode::Char('0') => self.player.rewind(),
            _ => {}
        }
        false
    }
}
