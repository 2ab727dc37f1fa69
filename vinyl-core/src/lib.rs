pub mod controller;
pub mod event;
pub mod media;
pub mod queue;
pub mod track;

pub use controller::Player;
pub use event::PlayerEvent;
pub use media::MediaHandle;
pub use queue::{PlayQueue, RepeatMode};
pub use track::{Track, TrackId};
