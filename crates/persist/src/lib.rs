//! Persistence: the depletion overlay, its change events and saves.
//!
//! # Invariants
//! - The overlay is keyed by stable entity ids and outlives sector eviction.
//! - Nothing expires implicitly; only an explicit respawn clears a record.
//! - Saves are hash-chained and verified on load.

mod store;
mod tracker;

pub use store::{ChangeStore, IntegrityManifest, ManifestEntry, StoreError, StoreMeta};
pub use tracker::{ChangeEvent, WorldChanges};
