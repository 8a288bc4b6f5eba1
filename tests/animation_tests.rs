//! Animation Integration Tests
//!
//! Tests for:
//! - KeyframeTrack: linear/step sampling, cursor-assisted sampling
//! - AnimationClip: duration derivation
//! - ClipSet: idle/walk/run validation and lookup
//! - AnimationMixer: binding by node name, transform write-through
//! - AnimationController: state machine, hard-cut switching, none-selection

use std::sync::Arc;

use glam::Vec3;

use foxglade::animation::{
    AnimationAction, AnimationClip, AnimationController, AnimationMixer, ClipKey, ClipSet,
    ControllerState, InterpolationMode, KeyframeCursor, KeyframeTrack, LoopMode, TargetPath,
    Track, TrackData, TrackMeta,
};
use foxglade::errors::ViewerError;
use foxglade::scene::Scene;
use foxglade::settings::DebugSettings;

const EPS: f32 = 1e-5;

fn assert_vec3_eq(a: Vec3, b: Vec3) {
    assert!((a - b).length() < EPS, "expected {b:?}, got {a:?}");
}

fn translation_track(node_name: &str, times: Vec<f32>, values: Vec<Vec3>) -> Track {
    Track {
        meta: TrackMeta {
            node_name: node_name.to_string(),
            target: TargetPath::Translation,
        },
        data: TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

fn clip(name: &str, node_name: &str, end_time: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name.to_string(),
        vec![translation_track(
            node_name,
            vec![0.0, end_time],
            vec![Vec3::ZERO, Vec3::new(end_time, 0.0, 0.0)],
        )],
    ))
}

fn three_clips(node_name: &str) -> Vec<Arc<AnimationClip>> {
    vec![
        clip("idle", node_name, 1.0),
        clip("walking", node_name, 2.0),
        clip("run", node_name, 0.5),
    ]
}

// ============================================================================
// Keyframe sampling
// ============================================================================

#[test]
fn track_linear_interpolation_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)],
        InterpolationMode::Linear,
    );
    assert_vec3_eq(track.sample(0.5), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn track_clamps_outside_time_range() {
    let track = KeyframeTrack::new(
        vec![1.0, 2.0],
        vec![Vec3::X, Vec3::Y],
        InterpolationMode::Linear,
    );
    assert_vec3_eq(track.sample(0.0), Vec3::X);
    assert_vec3_eq(track.sample(5.0), Vec3::Y);
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::X, Vec3::Y],
        InterpolationMode::Step,
    );
    assert_vec3_eq(track.sample(0.99), Vec3::X);
    assert_vec3_eq(track.sample(1.0), Vec3::Y);
}

#[test]
fn cursor_sampling_matches_binary_search() {
    let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.1).collect();
    let values: Vec<Vec3> = (0..20).map(|i| Vec3::splat(i as f32)).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    // Sequential playback, then a loop wrap back to the start.
    let samples = [0.05, 0.15, 0.16, 0.4, 0.41, 1.9, 0.02];
    for &t in &samples {
        let with_cursor = track.sample_with_cursor(t, &mut cursor);
        let reference = track.sample(t);
        assert_vec3_eq(with_cursor, reference);
    }
}

// ============================================================================
// Clips & ClipSet
// ============================================================================

#[test]
fn clip_duration_is_latest_keyframe() {
    let tracks = vec![
        translation_track("A", vec![0.0, 1.5], vec![Vec3::ZERO, Vec3::X]),
        translation_track("B", vec![0.0, 0.75], vec![Vec3::ZERO, Vec3::Y]),
    ];
    let clip = AnimationClip::new("test".to_string(), tracks);
    assert!((clip.duration - 1.5).abs() < EPS);
}

#[test]
fn clip_set_rejects_too_few_clips() {
    let clips = vec![clip("idle", "A", 1.0), clip("walking", "A", 1.0)];
    match ClipSet::from_clips(clips) {
        Err(ViewerError::ClipCountMismatch { expected, found }) => {
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected ClipCountMismatch, got {other:?}"),
    }
}

#[test]
fn clip_set_maps_keys_by_index() {
    let set = ClipSet::from_clips(three_clips("A")).unwrap();
    assert_eq!(set.get(ClipKey::Idle).name, "idle");
    assert_eq!(set.get(ClipKey::Walk).name, "walking");
    assert_eq!(set.get(ClipKey::Run).name, "run");
}

#[test]
fn clip_key_labels_and_indices() {
    assert_eq!(ClipKey::Idle.clip_index(), 0);
    assert_eq!(ClipKey::Walk.clip_index(), 1);
    assert_eq!(ClipKey::Run.clip_index(), 2);
    assert_eq!(ClipKey::Walk.label(), "walking");
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn action_loop_mode_wraps_the_playhead() {
    let mut action = AnimationAction::new(clip("idle", "A", 1.0));
    action.update(1.25);
    assert!((action.time - 0.25).abs() < EPS);
    assert!(!action.paused);
}

#[test]
fn action_once_mode_pauses_at_the_end() {
    let mut action = AnimationAction::new(clip("idle", "A", 1.0));
    action.loop_mode = LoopMode::Once;
    action.update(1.5);
    assert!((action.time - 1.0).abs() < EPS);
    assert!(action.paused);

    // A paused action no longer advances.
    action.update(0.5);
    assert!((action.time - 1.0).abs() < EPS);
}

#[test]
fn action_ping_pong_reflects_at_the_end() {
    let mut action = AnimationAction::new(clip("idle", "A", 1.0));
    action.loop_mode = LoopMode::PingPong;
    action.update(1.25);
    assert!((action.time - 0.75).abs() < EPS);
}

#[test]
fn action_time_scale_stretches_wall_clock_time() {
    let mut action = AnimationAction::new(clip("walking", "A", 2.0));
    action.time_scale = 2.0;
    action.update(0.25);
    assert!((action.time - 0.5).abs() < EPS);
}

// ============================================================================
// Mixer
// ============================================================================

#[test]
fn mixer_writes_sampled_values_into_node_transforms() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Model");
    let bone = scene.create_node_with_name("Bone");
    scene.attach(bone, root);

    let clip = Arc::new(AnimationClip::new(
        "move".to_string(),
        vec![translation_track(
            "Bone",
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)],
        )],
    ));

    let mut mixer = AnimationMixer::new(root);
    mixer.play(&scene, clip);
    mixer.update(0.5, &mut scene);

    let position = scene.get_node(bone).unwrap().transform.position;
    assert_vec3_eq(position, Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn mixer_skips_tracks_with_unknown_targets() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Model");

    let clip = Arc::new(AnimationClip::new(
        "move".to_string(),
        vec![translation_track(
            "NoSuchBone",
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::X],
        )],
    ));

    let mut mixer = AnimationMixer::new(root);
    mixer.play(&scene, clip);
    // No bindings resolved, but playback must not panic.
    mixer.update(0.5, &mut scene);
    assert_eq!(mixer.action_count(), 1);
    assert!(mixer.actions()[0].bindings.is_empty());
}

#[test]
fn mixer_stop_all_discards_every_action() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Model");

    let mut mixer = AnimationMixer::new(root);
    mixer.play(&scene, clip("idle", "Model", 1.0));
    mixer.play(&scene, clip("run", "Model", 1.0));
    assert_eq!(mixer.action_count(), 2);

    mixer.stop_all();
    assert_eq!(mixer.action_count(), 0);
}

// ============================================================================
// Controller state machine
// ============================================================================

fn bound_controller(scene: &mut Scene) -> AnimationController {
    let root = scene.create_node_with_name("Fox");
    let bone = scene.create_node_with_name("Bone");
    scene.attach(bone, root);

    let clips = ClipSet::from_clips(three_clips("Bone")).unwrap();
    let mut controller = AnimationController::new();
    controller.bind(root, clips);
    controller
}

#[test]
fn controller_starts_unbound_and_selection_is_inert() {
    let scene = Scene::new();
    let mut controller = AnimationController::new();
    assert_eq!(controller.state(), ControllerState::Unbound);

    controller.select(&scene, Some(ClipKey::Run));
    assert_eq!(controller.state(), ControllerState::Unbound);
    assert_eq!(controller.active_action_count(), 0);
}

#[test]
fn controller_bind_enters_idle() {
    let mut scene = Scene::new();
    let controller = bound_controller(&mut scene);
    assert_eq!(controller.state(), ControllerState::BoundIdle);
    assert_eq!(controller.active_action_count(), 0);
}

#[test]
fn controller_keeps_at_most_one_action() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);

    controller.select(&scene, Some(ClipKey::Walk));
    assert_eq!(controller.state(), ControllerState::BoundPlaying(ClipKey::Walk));
    assert_eq!(controller.active_action_count(), 1);

    // Switching is a hard cut: the old action is gone, one new action plays.
    controller.select(&scene, Some(ClipKey::Run));
    assert_eq!(controller.state(), ControllerState::BoundPlaying(ClipKey::Run));
    assert_eq!(controller.active_action_count(), 1);
    assert_eq!(controller.active_clip_name(), Some("run"));
}

#[test]
fn controller_selecting_none_plays_nothing() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);

    controller.select(&scene, Some(ClipKey::Idle));
    assert_eq!(controller.active_action_count(), 1);

    controller.select(&scene, None);
    assert_eq!(controller.state(), ControllerState::BoundIdle);
    assert_eq!(controller.active_action_count(), 0);

    // With nothing selected, updates leave the transforms alone.
    let before = scene.get_node(scene.find_by_name(scene.root_nodes[0], "Bone").unwrap())
        .unwrap()
        .transform
        .position;
    controller.update(0.5, &mut scene);
    let after = scene.get_node(scene.find_by_name(scene.root_nodes[0], "Bone").unwrap())
        .unwrap()
        .transform
        .position;
    assert_vec3_eq(before, after);
}

#[test]
fn controller_reselecting_same_clip_restarts_from_zero() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);

    controller.select(&scene, Some(ClipKey::Walk));
    controller.update(0.75, &mut scene);
    let advanced = scene
        .get_node(scene.find_by_name(scene.root_nodes[0], "Bone").unwrap())
        .unwrap()
        .transform
        .position;
    assert!(advanced.x > 0.0);

    // A fresh selection rebuilds the action, so the playhead resets.
    controller.select(&scene, Some(ClipKey::Walk));
    controller.update(0.0, &mut scene);
    let restarted = scene
        .get_node(scene.find_by_name(scene.root_nodes[0], "Bone").unwrap())
        .unwrap()
        .transform
        .position;
    assert_vec3_eq(restarted, Vec3::ZERO);
}

#[test]
fn controller_default_selection_plays_the_walk_clip() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);

    // The panel's startup selection is walk, the clip at index 1.
    let settings = DebugSettings::default();
    controller.select(&scene, settings.selected_animation);

    assert_eq!(controller.state(), ControllerState::BoundPlaying(ClipKey::Walk));
    assert_eq!(controller.active_action_count(), 1);
    assert_eq!(ClipKey::Walk.clip_index(), 1);
    assert_eq!(controller.active_clip_name(), Some("walking"));
}

#[test]
fn controller_rapid_switching_settles_on_the_last_clip() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);

    // Three selections in quick succession, no updates in between.
    controller.select(&scene, Some(ClipKey::Walk));
    controller.select(&scene, Some(ClipKey::Run));
    controller.select(&scene, Some(ClipKey::Idle));

    assert_eq!(controller.state(), ControllerState::BoundPlaying(ClipKey::Idle));
    assert_eq!(controller.active_action_count(), 1);
    assert_eq!(ClipKey::Idle.clip_index(), 0);
    assert_eq!(controller.active_clip_name(), Some("idle"));
}

#[test]
fn controller_update_advances_by_wall_clock_delta() {
    let mut scene = Scene::new();
    let mut controller = bound_controller(&mut scene);
    controller.select(&scene, Some(ClipKey::Walk));

    // walk clip: 2 seconds, translation 0 -> (2, 0, 0)
    controller.update(0.5, &mut scene);
    controller.update(0.5, &mut scene);
    let bone = scene.find_by_name(scene.root_nodes[0], "Bone").unwrap();
    let position = scene.get_node(bone).unwrap().transform.position;
    assert_vec3_eq(position, Vec3::new(1.0, 0.0, 0.0));
}
