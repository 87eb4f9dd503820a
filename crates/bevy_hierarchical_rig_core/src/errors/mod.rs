mod asset_loader_error;
mod rig_error;

pub use asset_loader_error::*;
pub use rig_error::*;
