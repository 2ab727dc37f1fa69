use rand::seq::SliceRandom;
use strum::EnumIter;

use crate::track::Track;

/// Repeat mode for queue playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, strum::Display)]
pub enum RepeatMode {
    /// Stop at the end of the queue
    #[default]
    #[strum(serialize = "Off")]
    Off,
    /// Wrap to the first track past the end of the queue
    #[strum(serialize = "List")]
    All,
    /// Replay the current track indefinitely
    #[strum(serialize = "Track")]
    One,
}

impl RepeatMode {
    /// Cycle Off -> All -> One -> Off
    pub fn next(self) -> RepeatMode {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Track ordering used for next/previous navigation.
///
/// `queue` is always a copy of either `track_list` or `shuffled` and is never
/// mutated independently. The shuffled permutation is regenerated each time
/// shuffle is turned on.
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    track_list: Vec<Track>,
    shuffled: Vec<Track>,
    queue: Vec<Track>,
    shuffle: bool,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the track list and rebuild the queue per the shuffle mode.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.track_list = tracks;
        if self.shuffle {
            self.reshuffle();
            self.queue = self.shuffled.clone();
        } else {
            self.queue = self.track_list.clone();
        }
    }

    /// Toggle shuffle, returning the new state. Turning it on regenerates the
    /// shuffled permutation; turning it off restores list order and keeps the
    /// stale permutation, which is regenerated on the next toggle anyway.
    pub fn toggle_shuffle(&mut self) -> bool {
        if self.shuffle {
            self.shuffle = false;
            self.queue = self.track_list.clone();
        } else {
            self.shuffle = true;
            if !self.track_list.is_empty() {
                self.reshuffle();
                self.queue = self.shuffled.clone();
            }
        }
        self.shuffle
    }

    /// Regenerate the shuffled permutation (Fisher-Yates).
    fn reshuffle(&mut self) {
        let mut order = self.track_list.clone();
        let mut rng = rand::rng();
        order.shuffle(&mut rng);
        self.shuffled = order;
    }

    /// Locate a track in the queue by identity.
    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.queue.iter().position(|t| t == track)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.queue.get(index)
    }

    /// The active navigation order.
    pub fn tracks(&self) -> &[Track] {
        &self.queue
    }

    /// The list as uploaded by the caller, unshuffled.
    pub fn track_list(&self) -> &[Track] {
        &self.track_list
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackId;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n).map(|i| Track::new(format!("{i}.mp3"))).collect()
    }

    fn ids(tracks: &[Track]) -> Vec<TrackId> {
        tracks.iter().map(|t| t.id()).collect()
    }

    #[test]
    fn queue_mirrors_list_when_shuffle_off() {
        let list = tracks(4);
        let mut q = PlayQueue::new();
        q.set_tracks(list.clone());
        assert_eq!(ids(q.tracks()), ids(&list));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let list = tracks(32);
        let mut q = PlayQueue::new();
        q.set_tracks(list.clone());
        q.toggle_shuffle();

        assert_eq!(q.len(), list.len());
        let mut expected: Vec<_> = ids(&list);
        let mut actual: Vec<_> = ids(q.tracks());
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn shuffle_off_restores_list_order() {
        let list = tracks(8);
        let mut q = PlayQueue::new();
        q.set_tracks(list.clone());
        q.toggle_shuffle();
        q.toggle_shuffle();

        assert!(!q.shuffle_enabled());
        assert_eq!(ids(q.tracks()), ids(&list));
        // the stale permutation is kept, not cleared
        assert_eq!(q.shuffled.len(), list.len());
    }

    #[test]
    fn set_tracks_reshuffles_when_shuffle_on() {
        let mut q = PlayQueue::new();
        q.toggle_shuffle();
        let list = tracks(16);
        q.set_tracks(list.clone());

        let mut expected: Vec<_> = ids(&list);
        let mut actual: Vec<_> = ids(q.tracks());
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn position_of_uses_identity() {
        let list = tracks(3);
        let mut q = PlayQueue::new();
        q.set_tracks(list.clone());

        assert_eq!(q.position_of(&list[1].clone()), Some(1));
        assert_eq!(q.position_of(&Track::new("1.mp3")), None);
    }

    #[test]
    fn repeat_mode_cycles_back_to_start() {
        let mut mode = RepeatMode::default();
        assert_eq!(mode, RepeatMode::Off);
        mode = mode.next();
        assert_eq!(mode, RepeatMode::All);
        mode = mode.next();
        assert_eq!(mode, RepeatMode::One);
        mode = mode.next();
        assert_eq!(mode, RepeatMode::Off);
    }
}
