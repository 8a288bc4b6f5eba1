use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::clip::{AnimationClip, TargetPath};
use crate::scene::{NodeHandle, Scene};

/// Connects track `track_index` of a clip to a property of a scene node.
/// Resolved once when an action starts, by matching the track's node name
/// inside the bound subtree.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node: NodeHandle,
    pub target: TargetPath,
}

/// The per-model animation runtime. Bound once to a model's root node;
/// advances every playing action each frame and writes the sampled values
/// into the node transforms under that root.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    /// Starts playing `clip` from time zero. Track targets are resolved to
    /// node handles by name search under the mixer root; tracks that address
    /// nodes missing from the scene are skipped.
    pub fn play(&mut self, scene: &Scene, clip: Arc<AnimationClip>) {
        let mut action = AnimationAction::new(clip);
        action.bindings = Self::bind(scene, self.root, action.clip());

        if action.bindings.is_empty() {
            log::warn!(
                "Clip '{}' resolved no bindings under the mixer root",
                action.clip().name
            );
        }

        self.actions.push(action);
    }

    /// Stops and discards every action, a hard cut with no fade.
    pub fn stop_all(&mut self) {
        self.actions.clear();
    }

    /// Advances all actions by `dt` and applies the sampled values to the
    /// scene's node transforms.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if action.paused || !action.enabled {
                continue;
            }

            for i in 0..action.bindings.len() {
                let (track_index, node, target) = {
                    let b = &action.bindings[i];
                    (b.track_index, b.node, b.target)
                };
                let Some(value) = action.sample_track(track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(node) else {
                    continue;
                };

                match (value, target) {
                    (TrackValue::Vector3(v), TargetPath::Translation) => {
                        node.transform.position = v;
                    }
                    (TrackValue::Vector3(v), TargetPath::Scale) => {
                        node.transform.scale = v;
                    }
                    (TrackValue::Quaternion(q), TargetPath::Rotation) => {
                        node.transform.rotation = q;
                    }
                    _ => {}
                }
            }
        }
    }

    /// Resolves clip tracks to node handles by recursive name search.
    fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for (track_index, track) in clip.tracks.iter().enumerate() {
            if let Some(node) = scene.find_by_name(root, &track.meta.node_name) {
                bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target: track.meta.target,
                });
            } else {
                log::debug!(
                    "Track target '{}' not found in scene, skipping",
                    track.meta.node_name
                );
            }
        }
        bindings
    }
}
