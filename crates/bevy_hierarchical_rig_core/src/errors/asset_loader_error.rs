use thiserror::Error;

use super::RigError;

/// Possible errors that can be produced by the rig asset loader.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    /// An [IO](std::io) Error
    #[error("Could not read asset: {0}")]
    Io(#[from] std::io::Error),
    /// A [RON](ron) Error
    #[error("Could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("Rig definition does not satisfy constraints: {0}")]
    InvalidRig(#[from] RigError),
}
