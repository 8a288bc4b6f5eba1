//! Keyframe animation
//!
//! Data flows bottom-up: [`KeyframeTrack`] samples raw values,
//! [`AnimationClip`] groups tracks with node-name metadata, a validated
//! [`ClipSet`] maps the idle/walk/run keys onto clips, [`AnimationAction`]
//! advances a playhead over one clip, [`AnimationMixer`] writes sampled
//! values into scene node transforms, and [`AnimationController`] is the
//! selection state machine driven by the debug panel.

pub mod action;
pub mod clip;
pub mod controller;
pub mod mixer;
pub mod tracks;
mod values;

pub use action::{AnimationAction, LoopMode};
pub use clip::{AnimationClip, ClipKey, ClipSet, TargetPath, Track, TrackData, TrackMeta};
pub use controller::{AnimationController, ControllerState};
pub use mixer::{AnimationMixer, PropertyBinding};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
