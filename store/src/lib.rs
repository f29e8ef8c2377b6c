//! Message store client and live-query subscriptions.
//!
//! [`MessageStore`] is the write side of a room and [`LiveQuery`] the read
//! side. [`MemoryRoom`] keeps a room in process; with the `remote` feature,
//! [`RemoteStore`] talks to a `wishwall-node`.

pub mod config;
pub mod memory;
#[cfg(feature = "remote")]
pub mod remote;
pub mod store;
pub mod subscription;

pub use config::ClientConfig;
pub use memory::MemoryRoom;
#[cfg(feature = "remote")]
pub use remote::RemoteStore;
pub use store::{subscribe, LiveQuery, MessageStore, SnapshotFeed, CLEAR_CONCURRENCY};
pub use subscription::Subscription;
