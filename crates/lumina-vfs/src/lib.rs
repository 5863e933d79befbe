//! In-memory virtual file store.
//!
//! One [`VirtualFileStore`] is owned per project session. Paths are
//! normalized for a flat-root preview target before every access, and every
//! mutation is reported synchronously to registered observers.

pub mod defaults;
pub mod path;
pub mod store;

pub use path::normalize_path;
pub use store::{FileEvent, FileEventKind, Snapshot, VirtualFileStore, WatchId};
