//! Scene Graph Integration Tests
//!
//! Tests for:
//! - Node creation, naming, attach/remove
//! - World matrix propagation and transform dirty tracking
//! - Camera aspect handling
//! - Light cone updates and visible-light iteration
//! - Disc geometry
//! - Skeleton joint matrices
//! - Stage setters (light settings, normal-map toggle)
//! - Orbit controls (pose round-trip, damping decay, zoom clamping)

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use foxglade::app::input::Input;
use foxglade::scene::builder::{apply_light_settings, set_normal_map, SceneHandles};
use foxglade::scene::light::SpotLight;
use foxglade::scene::{
    Camera, Geometry, Light, LightKind, Material, Mesh, Node, NodeHandle, Scene, Skeleton,
    Transform,
};
use foxglade::settings::DebugSettings;
use foxglade::utils::OrbitControls;
use winit::event::MouseButton;

const EPS: f32 = 1e-5;

fn assert_vec3_eq(a: Vec3, b: Vec3) {
    assert!((a - b).length() < EPS, "expected {b:?}, got {a:?}");
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn create_and_name_nodes() {
    let mut scene = Scene::new();
    let a = scene.create_node_with_name("A");
    let b = scene.create_node();

    assert_eq!(scene.get_name(a), Some("A"));
    assert_eq!(scene.get_name(b), None);
    assert_eq!(scene.root_nodes.len(), 2);

    scene.set_name(b, "B");
    assert_eq!(scene.get_name(b), Some("B"));
}

#[test]
fn attach_reparents_and_leaves_root_list() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.create_node_with_name("Child");
    assert_eq!(scene.root_nodes.len(), 2);

    scene.attach(child, parent);
    assert_eq!(scene.root_nodes, vec![parent]);
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
}

#[test]
fn attach_to_self_is_a_no_op() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    scene.attach(node, node);
    assert_eq!(scene.root_nodes, vec![node]);
    assert_eq!(scene.get_node(node).unwrap().parent(), None);
}

#[test]
fn remove_node_drops_subtree_and_components() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.create_node_with_name("Child");
    scene.attach(child, parent);
    scene.set_mesh(child, plain_mesh());

    scene.remove_node(parent);
    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_mesh(child).is_none());
    assert!(scene.root_nodes.is_empty());
}

#[test]
fn find_by_name_searches_subtree_only() {
    let mut scene = Scene::new();
    let root_a = scene.create_node_with_name("A");
    let inner = scene.create_node_with_name("Inner");
    scene.attach(inner, root_a);
    let root_b = scene.create_node_with_name("B");

    assert_eq!(scene.find_by_name(root_a, "Inner"), Some(inner));
    assert_eq!(scene.find_by_name(root_b, "Inner"), None);
}

// ============================================================================
// Transforms & world matrices
// ============================================================================

#[test]
fn world_matrices_propagate_through_hierarchy() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, parent);

    scene.get_node_mut(parent).unwrap().transform.position = Vec3::new(1.0, 2.0, 3.0);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::new(0.0, 1.0, 0.0);
    scene.update_world_matrices();

    let world = *scene.get_node(child).unwrap().transform.world_matrix();
    assert_vec3_eq(world.translation.into(), Vec3::new(1.0, 3.0, 3.0));
}

#[test]
fn parent_scale_applies_to_children() {
    let mut scene = Scene::new();
    let parent = scene.create_node();
    let child = scene.create_node();
    scene.attach(child, parent);

    scene.get_node_mut(parent).unwrap().transform.scale = Vec3::splat(2.0);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::new(1.0, 0.0, 0.0);
    scene.update_world_matrices();

    let world = *scene.get_node(child).unwrap().transform.world_matrix();
    assert_vec3_eq(world.translation.into(), Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn transform_dirty_check_skips_unchanged() {
    let mut transform = Transform::new();
    // First call always rebuilds.
    assert!(transform.update_local_matrix());
    assert!(!transform.update_local_matrix());

    transform.position = Vec3::X;
    assert!(transform.update_local_matrix());
    assert!(!transform.update_local_matrix());

    transform.mark_dirty();
    assert!(transform.update_local_matrix());
}

#[test]
fn look_at_points_negative_z_at_target() {
    let mut transform = Transform::new();
    transform.position = Vec3::new(0.0, 0.0, 5.0);
    transform.look_at(Vec3::ZERO, Vec3::Y);

    let forward = transform.rotation * -Vec3::Z;
    assert_vec3_eq(forward, Vec3::new(0.0, 0.0, -1.0));
}

#[test]
fn look_at_degenerate_up_leaves_rotation() {
    let mut transform = Transform::new();
    transform.position = Vec3::new(0.0, 5.0, 0.0);
    let before = transform.rotation;
    // Forward would be parallel to up.
    transform.look_at(Vec3::ZERO, Vec3::Y);
    assert_eq!(transform.rotation, before);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_set_aspect_is_idempotent() {
    let mut camera = Camera::new_perspective(55.0, 16.0 / 9.0, 1.0, 100.0);
    camera.set_aspect(2.0);
    let first = camera.view_projection();
    camera.set_aspect(2.0);
    assert_eq!(camera.view_projection(), first);
}

#[test]
fn camera_rejects_degenerate_aspect() {
    let mut camera = Camera::new_perspective(55.0, 16.0 / 9.0, 1.0, 100.0);
    let before = camera.view_projection();

    camera.set_aspect(0.0);
    camera.set_aspect(-1.0);
    camera.set_aspect(f32::NAN);
    assert_eq!(camera.view_projection(), before);
}

#[test]
fn camera_view_follows_node_world_transform() {
    let mut camera = Camera::new_perspective(55.0, 1.0, 1.0, 100.0);
    let world = Affine3A::from_translation(Vec3::new(0.0, 0.0, 10.0));
    camera.update_view_projection(&world);

    // A point at the origin should project in front of the camera.
    let projected = camera.view_projection() * Vec3::ZERO.extend(1.0);
    assert!(projected.w > 0.0);
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn spot_cone_inner_shrinks_with_penumbra() {
    let mut light = Light::new_spot(Vec3::ONE, 2.0, 12.0, 0.5, 0.6);
    light.set_spot_cone(0.8, 0.25);

    match &light.kind {
        LightKind::Spot(SpotLight {
            inner_cone,
            outer_cone,
            ..
        }) => {
            assert!((outer_cone - 0.8).abs() < EPS);
            assert!((inner_cone - 0.6).abs() < EPS);
        }
        LightKind::Ambient => panic!("expected a spot light"),
    }
}

#[test]
fn spot_cone_update_ignores_ambient() {
    let mut light = Light::new_ambient(Vec3::ONE, 0.15);
    light.set_spot_cone(0.8, 0.25);
    assert!(matches!(light.kind, LightKind::Ambient));
}

#[test]
fn visible_light_iteration_skips_hidden_nodes() {
    let mut scene = Scene::new();
    let lit = scene.create_node();
    scene.set_light(lit, Light::new_spot(Vec3::ONE, 1.0, 12.0, 0.4, 0.5));
    let hidden = scene.create_node();
    scene.set_light(hidden, Light::new_spot(Vec3::ONE, 1.0, 12.0, 0.4, 0.5));
    scene.get_node_mut(hidden).unwrap().visible = false;

    let visible: Vec<NodeHandle> = scene.iter_visible_lights().map(|(h, _, _)| h).collect();
    assert_eq!(visible, vec![lit]);
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn disc_geometry_counts_and_radius() {
    let segments = 32;
    let disc = Geometry::disc(6.0, segments);

    // Center + one ring vertex per segment boundary (the seam is duplicated).
    assert_eq!(disc.positions.len(), segments as usize + 2);
    assert_eq!(disc.indices.len(), segments as usize * 3);
    assert_eq!(disc.positions.len(), disc.normals.len());
    assert_eq!(disc.positions.len(), disc.uvs.len());
    assert!(!disc.is_skinned());

    for p in disc.positions.iter().skip(1) {
        let r = Vec3::from(*p).length();
        assert!((r - 6.0).abs() < 1e-4, "ring vertex at radius {r}");
    }
}

#[test]
fn disc_clamps_to_minimum_segments() {
    let disc = Geometry::disc(1.0, 0);
    assert_eq!(disc.indices.len(), 9);
}

// ============================================================================
// Skeleton
// ============================================================================

#[test]
fn joint_matrices_follow_bone_world_transforms() {
    let mut scene = Scene::new();
    let bone = scene.create_node_with_name("Bone");
    scene.get_node_mut(bone).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
    scene.update_world_matrices();

    // Identity bind pose and identity mesh root: the joint matrix is the
    // bone's world matrix.
    let mut skeleton = Skeleton::new("test", vec![bone], vec![Affine3A::IDENTITY]);
    skeleton.compute_joint_matrices(&scene.nodes, Affine3A::IDENTITY);

    let joint = skeleton.joint_matrices()[0];
    let translation = joint.w_axis.truncate();
    assert_vec3_eq(translation, Vec3::new(0.0, 2.0, 0.0));
}

#[test]
fn mesh_root_transform_cancels_out_of_joints() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let bone = scene.create_node();
    scene.attach(bone, root);
    scene.get_node_mut(root).unwrap().transform.position = Vec3::new(5.0, 0.0, 0.0);
    scene.get_node_mut(bone).unwrap().transform.position = Vec3::new(0.0, 1.0, 0.0);
    scene.update_world_matrices();

    let root_inv = scene.get_node(root).unwrap().transform.world_matrix().inverse();
    let mut skeleton = Skeleton::new("test", vec![bone], vec![Affine3A::IDENTITY]);
    skeleton.compute_joint_matrices(&scene.nodes, root_inv);

    let translation = skeleton.joint_matrices()[0].w_axis.truncate();
    assert_vec3_eq(translation, Vec3::new(0.0, 1.0, 0.0));
}

// ============================================================================
// Stage setters
// ============================================================================

fn plain_mesh() -> Mesh {
    Mesh::new(Arc::new(Geometry::disc(1.0, 8)), Material::default())
}

fn hand_built_stage(scene: &mut Scene) -> SceneHandles {
    let plate = scene.create_node_with_name("GroundPlate");
    scene.set_mesh(plate, plain_mesh());

    let spotlights = [(); 3].map(|()| {
        let handle = scene.create_node();
        let mut light = Light::new_spot(Vec3::ONE, 2.0, 12.0, 0.5, 0.6);
        light.cast_shadows = true;
        scene.set_light(handle, light);
        handle
    });

    let fox_root = scene.create_node_with_name("Fox");
    let camera = scene.create_node();
    scene.set_camera(camera, Camera::new_perspective(55.0, 1.0, 1.0, 100.0));

    SceneHandles {
        plate,
        fox_root,
        spotlights,
        camera,
    }
}

#[test]
fn light_settings_reach_all_three_spots() {
    let mut scene = Scene::new();
    let handles = hand_built_stage(&mut scene);

    let settings = DebugSettings {
        light_intensity: 1.25,
        light_angle: 0.5,
        penumbra: 0.2,
        ..DebugSettings::default()
    };
    apply_light_settings(&mut scene, &handles, &settings);

    // The panel's angle value is the cone half-angle in radians, unscaled.
    let expected_outer = 0.5;
    for &handle in &handles.spotlights {
        let light = scene.get_light(handle).unwrap();
        assert!((light.intensity - 1.25).abs() < EPS);
        match &light.kind {
            LightKind::Spot(spot) => {
                assert!((spot.outer_cone - expected_outer).abs() < EPS);
                assert!((spot.inner_cone - expected_outer * 0.8).abs() < EPS);
            }
            LightKind::Ambient => panic!("expected a spot light"),
        }
    }
}

#[test]
fn default_light_angle_is_the_stage_cone_in_radians() {
    let settings = DebugSettings::default();
    assert!((settings.light_angle - 0.2 * std::f32::consts::PI).abs() < EPS);

    let mut scene = Scene::new();
    let handles = hand_built_stage(&mut scene);
    apply_light_settings(&mut scene, &handles, &settings);

    let light = scene.get_light(handles.spotlights[0]).unwrap();
    match &light.kind {
        LightKind::Spot(spot) => {
            assert!((spot.outer_cone - settings.light_angle).abs() < EPS);
        }
        LightKind::Ambient => panic!("expected a spot light"),
    }
}

#[test]
fn normal_map_toggle_reaches_plate_material() {
    let mut scene = Scene::new();
    let handles = hand_built_stage(&mut scene);

    set_normal_map(&mut scene, &handles, false);
    assert!(!scene.get_mesh(handles.plate).unwrap().material.use_normal_map);

    set_normal_map(&mut scene, &handles, true);
    assert!(scene.get_mesh(handles.plate).unwrap().material.use_normal_map);
}

// ============================================================================
// Orbit controls
// ============================================================================

const DT: f32 = 1.0 / 60.0;

#[test]
fn orbit_from_position_reconstructs_the_pose() {
    let start = Vec3::new(4.0, 5.0, 8.0);
    let mut controls = OrbitControls::from_position(start, Vec3::ZERO);
    let mut transform = Transform::new();

    let input = Input::new();
    controls.update(&mut transform, &input, DT);
    assert!((transform.position - start).length() < 1e-3);
}

#[test]
fn orbit_damping_decays_after_the_drag_ends() {
    let mut controls = OrbitControls::from_position(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut transform = Transform::new();

    // One frame of drag input.
    let mut input = Input::new();
    input.handle_resize(800, 600);
    input.mouse_buttons.insert(MouseButton::Left);
    input.cursor_delta = glam::Vec2::new(120.0, 0.0);
    controls.update(&mut transform, &input, DT);

    // Released: the residual motion shrinks every frame and dies out.
    let idle = Input::new();
    let mut last = controls.theta;
    let mut previous_step = f32::INFINITY;
    for _ in 0..20 {
        controls.update(&mut transform, &idle, DT);
        let step = (controls.theta - last).abs();
        assert!(step <= previous_step + 1e-6);
        previous_step = step;
        last = controls.theta;
    }
    for _ in 0..600 {
        controls.update(&mut transform, &idle, DT);
    }
    let settled = controls.theta;
    controls.update(&mut transform, &idle, DT);
    assert!((controls.theta - settled).abs() < 1e-5);
}

#[test]
fn orbit_zoom_clamps_to_distance_limits() {
    let mut controls = OrbitControls::from_position(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    let mut transform = Transform::new();

    let mut input = Input::new();
    input.scroll_delta = glam::Vec2::new(0.0, 1000.0);
    controls.update(&mut transform, &input, DT);
    assert!((controls.radius - controls.min_distance).abs() < EPS);

    input.scroll_delta = glam::Vec2::new(0.0, -1000.0);
    controls.update(&mut transform, &input, DT);
    assert!((controls.radius - controls.max_distance).abs() < EPS);
}

#[test]
fn rotated_plate_normal_points_up() {
    let mut scene = Scene::new();
    let plate = scene.create_node();
    scene.get_node_mut(plate).unwrap().transform.rotation =
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    scene.update_world_matrices();

    let world = scene.get_node(plate).unwrap().transform.world_matrix();
    let normal = world.transform_vector3(Vec3::Z);
    assert_vec3_eq(normal, Vec3::Y);
}
