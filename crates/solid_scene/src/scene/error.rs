//! Scene graph errors

use crate::scene::camera::CameraId;
use crate::scene::node::NodeId;

/// Invariant violations of the scene graph.
///
/// These abort the offending call; the tree is left exactly as it was before it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node was disposed and can never re-enter a tree
    #[error("Node is disposed")]
    Disposed,

    /// The node already belongs to another camera
    #[error("Node already has parent {existing:?}, cannot attach it to {requested:?}")]
    MultipleParents {
        /// Current parent
        existing: CameraId,
        /// Rejected parent
        requested: CameraId,
    },

    /// The node must be removed from its camera before disposal
    #[error("Node is still attached to {0:?}")]
    DisposeWhileAttached(CameraId),

    /// The camera holds no child with this id
    #[error("No child {0:?} in this camera")]
    UnknownChild(NodeId),

    /// Another thread panicked while holding the live scene
    #[error("Scene lock poisoned")]
    LockPoisoned,
}

/// Result type for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;
