pub mod assets;
pub mod material;
pub mod mesh;
pub mod packed;
pub mod physics;
pub mod transform;
pub mod tree;

pub use assets::{Assets, Handle};
pub use packed::PackedScene;
pub use tree::{NodeId, NodeKind, SceneError, SceneTree};
