use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context;
use lofty::{
    file::{AudioFile, TaggedFileExt},
    probe::Probe,
    tag::Accessor,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Session-unique track identity. Two `Track` values refer to the same track
/// exactly when their ids are equal, so clones stay interchangeable while
/// distinct tracks pointing at the same file do not collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(u64);

impl TrackId {
    fn next() -> Self {
        TrackId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A single playable track and its display metadata.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Duration in seconds as reported by the file's tags, 0.0 when unknown.
    pub duration_secs: f32,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Track {
    /// Create a bare track with a fresh id and no metadata.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Track {
            id: TrackId::next(),
            path: path.into(),
            title: None,
            artist: None,
            album: None,
            duration_secs: 0.0,
        }
    }

    /// Create a track from an audio file, reading title/artist/album tags
    /// and the stream duration.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Track> {
        let path = path.as_ref();
        let tagged_file = Probe::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?
            .read()
            .with_context(|| format!("failed to read tags from {}", path.display()))?;

        let mut track = Track::new(path);
        track.duration_secs = tagged_file.properties().duration().as_secs_f32();

        if let Some(tag) = tagged_file.primary_tag() {
            track.title = tag.title().map(|s| s.to_string());
            track.artist = tag.artist().map(|s| s.to_string());
            track.album = tag.album().map(|s| s.to_string());
        }

        log::debug!(
            "loaded track {:?} by {:?} from {}",
            track.title,
            track.artist,
            path.display()
        );
        Ok(track)
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Tagged title, falling back to the file stem.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Track::new("a.mp3");
        let b = Track::new("a.mp3");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn clones_share_identity() {
        let a = Track::new("a.mp3");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn display_title_falls_back_to_file_stem() {
        let mut track = Track::new("/music/some song.flac");
        assert_eq!(track.display_title(), "some song");
        track.title = Some("Some Song".to_string());
        assert_eq!(track.display_title(), "Some Song");
    }
}
