use crate::animation::clip::{ClipKey, ClipSet};
use crate::animation::mixer::AnimationMixer;
use crate::scene::{NodeHandle, Scene};

/// Lifecycle of the animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No model bound yet; selection changes are not observable.
    Unbound,
    /// Mixer exists, nothing selected or playing.
    BoundIdle,
    /// Exactly one action playing the given clip.
    BoundPlaying(ClipKey),
}

/// The animation selection state machine.
///
/// `Unbound` until the model is in the scene, then `BoundIdle` /
/// `BoundPlaying(key)` driven by [`AnimationController::select`]. Switching
/// is a hard cut: the previous action is stopped unconditionally before the
/// next one starts. Selecting `None` is the defined way to play nothing and
/// is not an error.
pub struct AnimationController {
    state: ControllerState,
    mixer: Option<AnimationMixer>,
    clips: Option<ClipSet>,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ControllerState::Unbound,
            mixer: None,
            clips: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Number of actions the mixer currently holds. The controller's
    /// invariant keeps this at zero or one.
    #[must_use]
    pub fn active_action_count(&self) -> usize {
        self.mixer.as_ref().map_or(0, AnimationMixer::action_count)
    }

    /// Name of the clip the active action plays, if any.
    #[must_use]
    pub fn active_clip_name(&self) -> Option<&str> {
        self.mixer
            .as_ref()?
            .actions()
            .first()
            .map(|a| a.clip().name.as_str())
    }

    /// `Unbound -> BoundIdle`: creates the mixer for the model rooted at
    /// `root`. Fires once; rebinding an already-bound controller is ignored.
    pub fn bind(&mut self, root: NodeHandle, clips: ClipSet) {
        if self.mixer.is_some() {
            log::warn!("Animation controller already bound, ignoring rebind");
            return;
        }
        log::info!("Animation controller bound ({} clips)", clips.len());
        self.mixer = Some(AnimationMixer::new(root));
        self.clips = Some(clips);
        self.state = ControllerState::BoundIdle;
    }

    /// Applies a selection change: stop whatever plays, then start the clip
    /// for `key` if one is selected. Inert before [`AnimationController::bind`].
    pub fn select(&mut self, scene: &Scene, key: Option<ClipKey>) {
        let (Some(mixer), Some(clips)) = (self.mixer.as_mut(), self.clips.as_ref()) else {
            return;
        };

        mixer.stop_all();
        self.state = ControllerState::BoundIdle;

        if let Some(key) = key {
            let clip = clips.get(key).clone();
            log::debug!("Playing animation '{}'", clip.name);
            mixer.play(scene, clip);
            self.state = ControllerState::BoundPlaying(key);
        }
    }

    /// Advances the active action by wall-clock `dt` and applies it to the
    /// scene. Inert before bind.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.update(dt, scene);
        }
    }
}
