use glam::Affine3A;

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// A minimal scene node: hierarchy links, a transform, and a visibility flag.
///
/// Everything else (mesh, camera, light, skin binding, name) lives in the
/// [`Scene`](crate::scene::Scene) component maps, keeping the per-frame
/// traversal data small and contiguous.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    /// Visibility flag; invisible nodes are skipped by light iteration and
    /// draw submission, but their transforms still update.
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World transformation matrix, valid after the scene's matrix update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
