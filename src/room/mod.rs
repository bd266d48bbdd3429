//! Room orchestration: one coordinator actor per room plus the
//! process-wide directory that routes connections to them.

pub mod coordinator;
pub mod registry;

pub use coordinator::{Outbound, Room};
pub use registry::RoomDirectory;
