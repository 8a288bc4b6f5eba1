use glam::{Affine3A, Mat4};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::scene::node::Node;
use crate::scene::NodeHandle;

/// Skinning data for an imported character.
///
/// `bones[i]` corresponds to joint `i` in the mesh's joint attribute; the
/// computed `joint_matrices` are uploaded to the GPU each frame.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    /// Ordered bone list, matching the shader joint indices.
    pub bones: Vec<NodeHandle>,
    /// Static inverse bind matrices from the asset; transform vertices from
    /// mesh space into each bone's local space.
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    /// Per-frame joint matrices in mesh-local space.
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, inverse_bind_matrices: Vec<Affine3A>) -> Self {
        let count = bones.len();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Recomputes joint matrices from the current bone world matrices.
    ///
    /// `root_matrix_inv` is the inverse world matrix of the node carrying the
    /// skinned mesh; it cancels the mesh's own transform so the joint
    /// matrices end up in mesh-local space.
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone) else {
                continue;
            };
            let bone_world = bone_node.transform.world_matrix;
            let ibm = self.inverse_bind_matrices[i];
            self.joint_matrices[i] = (root_matrix_inv * bone_world * ibm).into();
        }
    }
}
