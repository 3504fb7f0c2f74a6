//! Provider clients for the external services queried by the bot
//!
//! Each submodule wraps one external service behind the same shape: a client
//! owning its HTTP session, one or more async query operations, a typed
//! result record, and a provider-specific error enum. Clients that declare
//! caching (pronouns, color) check a disk cache before the request and write
//! it after a successful decode; the others always hit the network.

pub mod anilist;
pub mod color;
pub mod feed;
pub mod pronouns;
pub mod songlink;
pub mod status;

pub use anilist::{AniListClient, AniListError, Media, MediaKind};
pub use color::{ColorClient, ColorError, ColorRecord};
pub use feed::{FeedClient, FeedError, FeedItem, FeedKind, Progress, WatchStatus};
pub use pronouns::{PronounClient, PronounError, PronounRecord, PronounSet};
pub use songlink::{EntityKind, SongLinkClient, SongLinkError, SongLinks, SongQuery};
pub use status::{ServiceState, ServiceStatus, StatusClient, StatusError};
