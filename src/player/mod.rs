//! Player records and the registry that owns them

pub mod profile;
pub mod registry;

pub use profile::{Player, PlayerHandle, PlayerSnapshot};
pub use registry::PlayerRegistry;
