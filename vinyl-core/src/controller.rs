use crossbeam_channel::Receiver;

use crate::{
    event::{EventBus, PlayerEvent},
    media::MediaHandle,
    queue::{PlayQueue, RepeatMode},
    track::Track,
};

/// Position threshold in seconds under which "previous" changes track
/// instead of rewinding the current one.
const PREV_REWIND_THRESHOLD_SECS: f32 = 3.0;

/// The playback controller: current track, transport state, volume, queue
/// order and progress, driving an optional attached [`MediaHandle`].
///
/// Every operation runs synchronously to completion and never fails; invalid
/// input or a detached handle degrades to a silent no-op. Observable state
/// changes are published through [`subscribe`](Player::subscribe).
pub struct Player<H: MediaHandle> {
    handle: Option<H>,
    current: Option<Track>,
    playing: bool,
    volume: f32,
    position_secs: f32,
    duration_secs: f32,
    percent: f32,
    repeat: RepeatMode,
    queue: PlayQueue,
    events: EventBus,
}

impl<H: MediaHandle> Player<H> {
    pub fn new() -> Self {
        Player {
            handle: None,
            current: None,
            playing: false,
            volume: 1.0,
            position_secs: 0.0,
            duration_secs: 0.0,
            percent: 0.0,
            repeat: RepeatMode::default(),
            queue: PlayQueue::new(),
            events: EventBus::default(),
        }
    }

    pub fn with_handle(handle: H) -> Self {
        let mut player = Player::new();
        player.handle = Some(handle);
        player
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    pub fn attach(&mut self, handle: H) {
        self.handle = Some(handle);
    }

    pub fn detach(&mut self) -> Option<H> {
        self.handle.take()
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut H> {
        self.handle.as_mut()
    }

    /// Open a new event subscription. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position_secs(&self) -> f32 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Progress through the current track in `[0, 100]`.
    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.queue.shuffle_enabled()
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Set the current track and its containing list, rebuilding the
    /// navigation queue per the shuffle mode.
    pub fn load_track(&mut self, track: Track, tracks: Vec<Track>) {
        log::debug!(
            "loading {:?} with a list of {} tracks",
            track.display_title(),
            tracks.len()
        );
        self.current = Some(track.clone());
        self.queue.set_tracks(tracks);
        self.events.emit(PlayerEvent::TrackChanged(track));
        self.events
            .emit(PlayerEvent::QueueChanged(self.queue.tracks().to_vec()));
    }

    /// Apply the stored volume to the handle and start playback.
    pub fn play(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.set_volume(self.volume);
            handle.play();
            self.playing = true;
            self.events.emit(PlayerEvent::Playing);
        }
    }

    pub fn pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pause();
            self.playing = false;
            self.events.emit(PlayerEvent::Paused);
        }
    }

    /// Reset the handle's playback position to the start of the track.
    pub fn rewind(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.seek(0.0);
        }
    }

    /// Store and apply a volume. Values outside `[0, 1]` are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !(0.0..=1.0).contains(&volume) {
            return;
        }
        self.volume = volume;
        if let Some(handle) = self.handle.as_mut() {
            handle.set_volume(volume);
        }
        self.events.emit(PlayerEvent::VolumeChanged(volume));
    }

    /// Progress tick, fed by the caller on its poll cadence. A duration the
    /// backend does not know yet (NaN) suppresses the update entirely. When
    /// progress reaches 100% the track is considered complete and the
    /// controller auto-advances once.
    pub fn tick(&mut self, position_secs: f32) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        let duration = handle.duration_secs();
        if !duration.is_finite() {
            return;
        }

        self.position_secs = position_secs;
        self.duration_secs = duration;
        self.percent = if duration > 0.0 {
            (position_secs / duration * 100.0).min(100.0)
        } else {
            0.0
        };
        self.events.emit(PlayerEvent::Progress {
            position_secs: self.position_secs,
            duration_secs: self.duration_secs,
            percent: self.percent,
        });

        if self.percent >= 100.0 {
            self.auto_advance();
        }
    }

    /// Advance on track completion. Unlike the manual skip this respects the
    /// repeat mode: Off stops at the end of the queue instead of wrapping.
    fn auto_advance(&mut self) {
        if self.current.is_none() && self.handle.is_none() {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        let Some(index) = self.queue.position_of(&current) else {
            log::warn!("current track is not in the queue, cannot auto-advance");
            return;
        };

        let next = match self.repeat {
            RepeatMode::All => {
                let wrapped = (index + 1) % self.queue.len();
                self.queue.get(wrapped).cloned()
            }
            RepeatMode::One => {
                // Replay the same track; completion handling ends here.
                self.current = Some(current.clone());
                self.play();
                self.events.emit(PlayerEvent::TrackChanged(current));
                return;
            }
            RepeatMode::Off => {
                if index + 1 < self.queue.len() {
                    self.queue.get(index + 1).cloned()
                } else {
                    self.pause();
                    return;
                }
            }
        };

        if let Some(next) = next {
            log::debug!("auto-advancing to {:?}", next.display_title());
            self.current = Some(next.clone());
            self.events.emit(PlayerEvent::TrackChanged(next));
        }
    }

    /// Manual skip to the next queue entry. Always wraps past the end,
    /// regardless of repeat mode; only completion-driven advance stops there.
    pub fn next_track(&mut self) {
        if self.current.is_none() && self.handle.is_none() {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        let Some(index) = self.queue.position_of(&current) else {
            return;
        };

        let next_index = (index + 1) % self.queue.len();
        if let Some(next) = self.queue.get(next_index).cloned() {
            self.current = Some(next.clone());
            self.events.emit(PlayerEvent::TrackChanged(next));
        }
    }

    /// Go to the previous queue entry, wrapping from the first to the last.
    /// Past the rewind threshold this restarts the current track instead.
    pub fn prev_track(&mut self) {
        if self.current.is_none() || self.handle.is_none() {
            return;
        }
        let position = self
            .handle
            .as_ref()
            .map(|h| h.position_secs())
            .unwrap_or(0.0);

        if position < PREV_REWIND_THRESHOLD_SECS {
            let Some(index) = self
                .current
                .as_ref()
                .and_then(|t| self.queue.position_of(t))
            else {
                return;
            };
            let prev_index = if index > 0 {
                index - 1
            } else {
                self.queue.len() - 1
            };
            if let Some(prev) = self.queue.get(prev_index).cloned() {
                self.current = Some(prev.clone());
                self.events.emit(PlayerEvent::TrackChanged(prev));
            }
        } else {
            self.rewind();
        }
    }

    /// Cycle the repeat mode: Off -> All -> One -> Off.
    pub fn toggle_repeat(&mut self) {
        self.repeat = self.repeat.next();
        log::debug!("repeat mode now {}", self.repeat);
        self.events.emit(PlayerEvent::RepeatChanged(self.repeat));
    }

    /// Toggle shuffle and rebuild the navigation queue.
    pub fn toggle_shuffle(&mut self) {
        let enabled = self.queue.toggle_shuffle();
        log::debug!("shuffle {}", if enabled { "on" } else { "off" });
        self.events.emit(PlayerEvent::ShuffleChanged(enabled));
        self.events
            .emit(PlayerEvent::QueueChanged(self.queue.tracks().to_vec()));
    }
}

impl<H: MediaHandle> Default for Player<H> {
    fn default() -> Self {
        Player::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted media handle that records what the controller does to it.
    struct FakeHandle {
        playing: bool,
        volume: f32,
        position: f32,
        duration: f32,
        seeks: Vec<f32>,
        play_calls: usize,
        pause_calls: usize,
    }

    impl FakeHandle {
        fn new(duration: f32) -> Self {
            FakeHandle {
                playing: false,
                volume: 1.0,
                position: 0.0,
                duration,
                seeks: Vec::new(),
                play_calls: 0,
                pause_calls: 0,
            }
        }

        fn at_position(duration: f32, position: f32) -> Self {
            let mut handle = FakeHandle::new(duration);
            handle.position = position;
            handle
        }
    }

    impl MediaHandle for FakeHandle {
        fn play(&mut self) {
            self.playing = true;
            self.play_calls += 1;
        }

        fn pause(&mut self) {
            self.playing = false;
            self.pause_calls += 1;
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn position_secs(&self) -> f32 {
            self.position
        }

        fn seek(&mut self, secs: f32) {
            self.position = secs;
            self.seeks.push(secs);
        }

        fn duration_secs(&self) -> f32 {
            self.duration
        }
    }

    fn tracks(n: usize) -> Vec<Track> {
        (0..n).map(|i| Track::new(format!("{i}.mp3"))).collect()
    }

    fn player_on(list: &[Track], index: usize, handle: FakeHandle) -> Player<FakeHandle> {
        let mut player = Player::with_handle(handle);
        player.load_track(list[index].clone(), list.to_vec());
        player
    }

    fn track_changes(rx: &Receiver<PlayerEvent>) -> Vec<Track> {
        rx.try_iter()
            .filter_map(|e| match e {
                PlayerEvent::TrackChanged(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn volume_out_of_range_is_ignored() {
        let mut player = Player::with_handle(FakeHandle::new(10.0));
        player.set_volume(0.5);
        player.set_volume(1.5);
        player.set_volume(-0.1);
        player.set_volume(f32::NAN);
        assert_eq!(player.volume(), 0.5);
        assert_eq!(player.handle().unwrap().volume, 0.5);
    }

    #[test]
    fn volume_is_stored_while_detached() {
        let mut player: Player<FakeHandle> = Player::new();
        player.set_volume(0.3);
        assert_eq!(player.volume(), 0.3);
    }

    #[test]
    fn play_applies_volume_to_handle() {
        let mut player = Player::with_handle(FakeHandle::new(10.0));
        player.set_volume(0.25);
        player.play();
        let handle = player.handle().unwrap();
        assert!(handle.playing);
        assert_eq!(handle.volume, 0.25);
        assert!(player.is_playing());
    }

    #[test]
    fn transport_is_a_noop_while_detached() {
        let mut player: Player<FakeHandle> = Player::new();
        player.play();
        assert!(!player.is_playing());
        player.pause();
        assert!(!player.is_playing());
    }

    #[test]
    fn load_track_keeps_list_order_with_shuffle_off() {
        let list = tracks(4);
        let player = player_on(&list, 0, FakeHandle::new(10.0));
        let queued: Vec<_> = player.queue().tracks().iter().map(Track::id).collect();
        let expected: Vec<_> = list.iter().map(Track::id).collect();
        assert_eq!(queued, expected);
    }

    #[test]
    fn manual_next_wraps_at_end_regardless_of_repeat() {
        let list = tracks(3);
        let mut player = player_on(&list, 2, FakeHandle::new(10.0));
        assert_eq!(player.repeat(), RepeatMode::Off);

        player.next_track();
        assert_eq!(player.current_track(), Some(&list[0]));
    }

    #[test]
    fn tick_updates_progress() {
        let list = tracks(2);
        let mut player = player_on(&list, 0, FakeHandle::new(200.0));
        player.tick(50.0);
        assert_eq!(player.position_secs(), 50.0);
        assert_eq!(player.duration_secs(), 200.0);
        assert_eq!(player.percent(), 25.0);
    }

    #[test]
    fn tick_with_unknown_duration_is_suppressed() {
        let list = tracks(2);
        let mut player = player_on(&list, 0, FakeHandle::new(f32::NAN));
        let rx = player.subscribe();
        player.tick(5.0);
        assert_eq!(player.position_secs(), 0.0);
        assert_eq!(player.percent(), 0.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn completion_advances_exactly_once() {
        let list = tracks(3);
        let mut player = player_on(&list, 0, FakeHandle::new(10.0));
        let rx = player.subscribe();

        player.tick(10.0);

        let changes = track_changes(&rx);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0], list[1]);
        assert_eq!(player.current_track(), Some(&list[1]));
    }

    #[test]
    fn completion_at_end_pauses_without_wrapping() {
        let list = tracks(3);
        let mut player = player_on(&list, 2, FakeHandle::new(10.0));
        player.play();

        player.tick(10.0);

        assert_eq!(player.current_track(), Some(&list[2]));
        assert!(!player.is_playing());
        assert_eq!(player.handle().unwrap().pause_calls, 1);
    }

    #[test]
    fn completion_with_repeat_all_wraps_to_start() {
        let list = tracks(3);
        let mut player = player_on(&list, 2, FakeHandle::new(10.0));
        player.toggle_repeat();
        assert_eq!(player.repeat(), RepeatMode::All);

        player.tick(10.0);
        assert_eq!(player.current_track(), Some(&list[0]));
    }

    #[test]
    fn completion_with_repeat_one_replays_current() {
        let list = tracks(3);
        let mut player = player_on(&list, 1, FakeHandle::new(10.0));
        player.toggle_repeat();
        player.toggle_repeat();
        assert_eq!(player.repeat(), RepeatMode::One);
        let rx = player.subscribe();

        player.tick(10.0);

        assert_eq!(player.current_track(), Some(&list[1]));
        assert!(player.is_playing());
        assert_eq!(player.handle().unwrap().play_calls, 1);
        assert_eq!(track_changes(&rx), vec![list[1].clone()]);
    }

    #[test]
    fn prev_near_start_wraps_to_last() {
        let list = tracks(3);
        let mut player = player_on(&list, 0, FakeHandle::at_position(10.0, 1.0));
        player.prev_track();
        assert_eq!(player.current_track(), Some(&list[2]));
    }

    #[test]
    fn prev_mid_track_rewinds_instead() {
        let list = tracks(3);
        let mut player = player_on(&list, 1, FakeHandle::at_position(10.0, 5.0));
        player.prev_track();
        assert_eq!(player.current_track(), Some(&list[1]));
        assert_eq!(player.handle().unwrap().seeks, vec![0.0]);
    }

    #[test]
    fn prev_is_a_noop_without_handle() {
        let list = tracks(3);
        let mut player: Player<FakeHandle> = Player::new();
        player.load_track(list[1].clone(), list.clone());
        player.prev_track();
        assert_eq!(player.current_track(), Some(&list[1]));
    }

    #[test]
    fn repeat_cycles_through_all_modes() {
        let mut player: Player<FakeHandle> = Player::new();
        assert_eq!(player.repeat(), RepeatMode::Off);
        player.toggle_repeat();
        assert_eq!(player.repeat(), RepeatMode::All);
        player.toggle_repeat();
        assert_eq!(player.repeat(), RepeatMode::One);
        player.toggle_repeat();
        assert_eq!(player.repeat(), RepeatMode::Off);
    }

    #[test]
    fn shuffle_rebuilds_queue_as_permutation() {
        let list = tracks(16);
        let mut player = player_on(&list, 0, FakeHandle::new(10.0));
        player.toggle_shuffle();
        assert!(player.shuffle_enabled());

        let mut queued: Vec<_> = player.queue().tracks().iter().map(Track::id).collect();
        let mut expected: Vec<_> = list.iter().map(Track::id).collect();
        queued.sort();
        expected.sort();
        assert_eq!(queued, expected);

        player.toggle_shuffle();
        let queued: Vec<_> = player.queue().tracks().iter().map(Track::id).collect();
        let expected: Vec<_> = list.iter().map(Track::id).collect();
        assert_eq!(queued, expected);
    }

    #[test]
    fn next_skips_nothing_when_current_not_in_queue() {
        let list = tracks(3);
        let stranger = Track::new("elsewhere.mp3");
        let mut player = Player::with_handle(FakeHandle::new(10.0));
        player.load_track(stranger.clone(), list);
        player.next_track();
        assert_eq!(player.current_track(), Some(&stranger));
    }
}
