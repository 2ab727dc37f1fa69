use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{queue::RepeatMode, track::Track};

/// Change notifications emitted by the player so front-ends can react to
/// state they did not cause themselves (auto-advance in particular).
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The current track changed, whether by load, manual skip or auto-advance
    TrackChanged(Track),
    /// Playback started or resumed
    Playing,
    /// Playback paused
    Paused,
    /// Stored volume changed
    VolumeChanged(f32),
    /// Progress tick was applied
    Progress {
        position_secs: f32,
        duration_secs: f32,
        percent: f32,
    },
    /// Repeat mode cycled
    RepeatChanged(RepeatMode),
    /// Shuffle was toggled
    ShuffleChanged(bool),
    /// The navigation queue was rebuilt
    QueueChanged(Vec<Track>),
}

/// Fan-out of player events to any number of subscribers. Senders whose
/// receiver has been dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<PlayerEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
