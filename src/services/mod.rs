//! Services module
//!
//! Collaborators of the playback core:
//! - Xtream panel client (login, catalog, stream URLs)
//! - Persistent key-value store and the typed stores built on it
//! - Open-channel directories

pub mod account;
pub mod channels;
pub mod content_cache;
pub mod favorites;
pub mod store;
pub mod xtream;

// Re-export commonly used items
pub use account::{CredentialStore, KidsPin, SavedCredentials};
pub use channels::{ChannelDirectory, RemoteDirectory};
pub use content_cache::{CacheStatus, Cached, ContentCache};
pub use favorites::FavoritesStore;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreHandle, StoreResult};
