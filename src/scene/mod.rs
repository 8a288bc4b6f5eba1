//! Scene graph
//!
//! - [`Node`]: hierarchy + transform, the per-frame hot data
//! - [`Transform`]: TRS with cached matrices and dirty tracking
//! - [`Scene`]: node arena plus component maps (mesh, camera, light, skin)
//! - [`Camera`]: perspective projection component
//! - [`Light`]: ambient fill and shadow-casting spotlights
//! - [`Skeleton`]: skinning data for the loaded character
//! - [`builder`]: one-shot construction of the viewer scene

pub mod builder;
pub mod camera;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use camera::Camera;
pub use light::{Light, LightKind, ShadowConfig};
pub use mesh::{Geometry, Material, Mesh, TextureData};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
