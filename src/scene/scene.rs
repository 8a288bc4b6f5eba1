use std::sync::atomic::{AtomicU32, Ordering};

use glam::Affine3A;
use slotmap::{SecondaryMap, SlotMap};

use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::{NodeHandle, SkeletonKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// The scene graph container.
///
/// Nodes live in a slotmap arena; components (name, mesh, camera, light,
/// skin binding) are attached through secondary maps keyed by node handle.
/// `Scene` is pure data: GPU upload is the renderer's job.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    names: SecondaryMap<NodeHandle, String>,
    meshes: SecondaryMap<NodeHandle, Mesh>,
    cameras: SecondaryMap<NodeHandle, Camera>,
    lights: SecondaryMap<NodeHandle, Light>,
    skin_bindings: SecondaryMap<NodeHandle, SkeletonKey>,

    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    pub active_camera: Option<NodeHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            names: SecondaryMap::new(),
            meshes: SecondaryMap::new(),
            cameras: SecondaryMap::new(),
            lights: SecondaryMap::new(),
            skin_bindings: SecondaryMap::new(),
            skeletons: SlotMap::with_key(),
            active_camera: None,
        }
    }

    // ========================================================================
    // Node creation & hierarchy
    // ========================================================================

    /// Creates an empty node at the scene root.
    pub fn create_node(&mut self) -> NodeHandle {
        self.add_node(Node::new())
    }

    /// Creates an empty named node at the scene root.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Inserts a node at the scene root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Inserts a node as a child of `parent`.
    pub fn add_to_parent(&mut self, node: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }
        if let Some(c) = self.nodes.get_mut(handle) {
            c.parent = Some(parent);
        }
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from its previous
    /// parent (or the root list). Attaching a node to itself is a no-op.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself");
            return;
        }

        // Detach from the old parent or the root list
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        } else {
            log::error!("Parent node not found during attach");
            self.root_nodes.push(child);
            return;
        }

        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            // The world matrix must be rebuilt under the new parent.
            c.transform.mark_dirty();
        }
    }

    /// Removes a node and its entire subtree, including attached components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let children = match self.nodes.get(handle) {
            Some(node) => node.children.clone(),
            None => return,
        };
        for child in children {
            self.remove_node(child);
        }

        let parent = self.nodes.get(handle).and_then(|n| n.parent);
        if let Some(p) = parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == handle)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == handle) {
            self.root_nodes.remove(i);
        }

        self.names.remove(handle);
        self.meshes.remove(handle);
        self.cameras.remove(handle);
        self.lights.remove(handle);
        self.skin_bindings.remove(handle);
        self.nodes.remove(handle);
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Collects `root` and every descendant in depth-first order.
    #[must_use]
    pub fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                out.push(handle);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    // ========================================================================
    // Names
    // ========================================================================

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        self.names.insert(handle, name.to_string());
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    /// Searches `root`'s subtree (inclusive) for a node with the given name.
    /// Animation tracks address their targets this way.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if self.get_name(handle) == Some(name) {
                return Some(handle);
            }
            if let Some(node) = self.nodes.get(handle) {
                stack.extend(node.children.iter().copied());
            }
        }
        None
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) {
        self.meshes.insert(handle, mesh);
    }

    #[must_use]
    pub fn get_mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn get_mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle)
    }

    /// Iterates all nodes carrying a mesh.
    pub fn iter_meshes(&self) -> impl Iterator<Item = (NodeHandle, &Mesh)> {
        self.meshes.iter()
    }

    pub fn set_camera(&mut self, handle: NodeHandle, camera: Camera) {
        self.cameras.insert(handle, camera);
    }

    #[must_use]
    pub fn get_camera(&self, handle: NodeHandle) -> Option<&Camera> {
        self.cameras.get(handle)
    }

    pub fn get_camera_mut(&mut self, handle: NodeHandle) -> Option<&mut Camera> {
        self.cameras.get_mut(handle)
    }

    pub fn set_light(&mut self, handle: NodeHandle, light: Light) {
        self.lights.insert(handle, light);
    }

    #[must_use]
    pub fn get_light(&self, handle: NodeHandle) -> Option<&Light> {
        self.lights.get(handle)
    }

    pub fn get_light_mut(&mut self, handle: NodeHandle) -> Option<&mut Light> {
        self.lights.get_mut(handle)
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    /// Binds a skeleton to the node carrying the skinned mesh.
    pub fn bind_skin(&mut self, handle: NodeHandle, skeleton: SkeletonKey) {
        self.skin_bindings.insert(handle, skeleton);
    }

    #[must_use]
    pub fn get_skin(&self, handle: NodeHandle) -> Option<SkeletonKey> {
        self.skin_bindings.get(handle).copied()
    }

    /// Iterates visible lights together with their world matrices.
    pub fn iter_visible_lights(&self) -> impl Iterator<Item = (NodeHandle, &Light, &Affine3A)> {
        self.lights.iter().filter_map(move |(handle, light)| {
            let node = self.nodes.get(handle)?;
            node.visible
                .then_some((handle, light, &node.transform.world_matrix))
        })
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Updates world matrices and skeleton joint matrices. Call once per
    /// frame after animation and controls have written their transforms.
    pub fn update(&mut self) {
        self.update_world_matrices();
        self.update_skeletons();
    }

    /// Recomputes world matrices over the whole graph, iteratively to keep
    /// deep imported hierarchies off the call stack.
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = self
            .root_nodes
            .iter()
            .map(|&h| (h, Affine3A::IDENTITY, false))
            .collect();

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };

            let local_changed = node.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                let world = parent_world * node.transform.local_matrix;
                node.transform.set_world_matrix(world);
            }

            let world = node.transform.world_matrix;
            for &child in &node.children {
                stack.push((child, world, changed));
            }
        }
    }

    /// Recomputes joint matrices for every bound skeleton from the current
    /// bone world matrices.
    pub fn update_skeletons(&mut self) {
        let mut tasks = Vec::new();
        for (handle, &skeleton) in &self.skin_bindings {
            if let Some(node) = self.nodes.get(handle) {
                tasks.push((skeleton, node.transform.world_matrix.inverse()));
            }
        }

        let nodes = &self.nodes;
        for (key, root_inv) in tasks {
            if let Some(skeleton) = self.skeletons.get_mut(key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }
}
