pub mod feed;
pub mod item;
pub mod session;
pub mod station;

pub use feed::{FeedPage, ParsedFeed};
pub use item::{FeedItem, MediaCandidate, RawItem, UNKNOWN_CREATOR};
pub use session::{clamp_volume, PlaybackSession, PlaybackState, DEFAULT_VOLUME};
pub use station::{RawStation, Station, UNKNOWN_COUNTRY};
