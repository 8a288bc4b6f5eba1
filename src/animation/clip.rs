use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;
use crate::errors::{Result, ViewerError};

/// The node property a track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// Track metadata: which node (by name) and which property.
#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

/// A complete track: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    fn end_time(&self) -> f32 {
        match &self.data {
            TrackData::Vector3(t) => t.times.last().copied().unwrap_or(0.0),
            TrackData::Quaternion(t) => t.times.last().copied().unwrap_or(0.0),
        }
    }
}

/// A named, time-bounded animation sequence. Duration is derived from the
/// latest keyframe across all tracks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0_f32, f32::max);
        Self {
            name,
            duration,
            tracks,
        }
    }
}

/// The closed set of selectable animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipKey {
    Idle,
    Walk,
    Run,
}

impl ClipKey {
    pub const ALL: [ClipKey; 3] = [ClipKey::Idle, ClipKey::Walk, ClipKey::Run];

    /// Index of this key's clip in the asset's animation list. The asset is
    /// required to ship its clips in this order; [`ClipSet::from_clips`]
    /// enforces that enough clips exist.
    #[inline]
    #[must_use]
    pub fn clip_index(self) -> usize {
        match self {
            ClipKey::Idle => 0,
            ClipKey::Walk => 1,
            ClipKey::Run => 2,
        }
    }

    /// Human-readable label shown in the debug panel.
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ClipKey::Idle => "idle",
            ClipKey::Walk => "walking",
            ClipKey::Run => "run",
        }
    }
}

/// Validated mapping from [`ClipKey`] to clips.
///
/// Built once at load time; construction fails if the asset does not provide
/// at least one clip per key, so a malformed asset is rejected up front
/// instead of silently not animating.
#[derive(Debug, Clone)]
pub struct ClipSet {
    clips: Vec<Arc<AnimationClip>>,
}

impl ClipSet {
    pub fn from_clips(clips: Vec<Arc<AnimationClip>>) -> Result<Self> {
        let expected = ClipKey::ALL.len();
        if clips.len() < expected {
            return Err(ViewerError::ClipCountMismatch {
                expected,
                found: clips.len(),
            });
        }
        Ok(Self { clips })
    }

    #[must_use]
    pub fn get(&self, key: ClipKey) -> &Arc<AnimationClip> {
        &self.clips[key.clip_index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
