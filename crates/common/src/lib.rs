//! Shared types for the voidspace workspace.

mod types;

pub use types::{EntityId, EntityKind, SectorBounds, SectorCoord};
