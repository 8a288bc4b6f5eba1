//! Stage assembly
//!
//! Builds the fixed viewer stage: a ground plate, the fox model, three
//! shadow-casting spot lights, an ambient fill, and the orbit camera. The
//! layout is intentionally static; only light parameters and the normal-map
//! toggle change at runtime, through the handle-scoped setters below.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::ClipSet;
use crate::assets::gltf::import_model;
use crate::assets::LoadedResources;
use crate::errors::Result;
use crate::scene::{Camera, Geometry, Light, Material, Mesh, Node, NodeHandle, Scene};
use crate::settings::DebugSettings;

const PLATE_RADIUS: f32 = 6.0;
const PLATE_SEGMENTS: u32 = 32;
const PLATE_COLOR: Vec3 = Vec3::new(0.604, 0.604, 0.604);

const SPOT_POSITIONS: [Vec3; 3] = [
    Vec3::new(-3.0, 6.0, 4.0),
    Vec3::new(2.0, 6.0, -3.0),
    Vec3::new(4.0, 6.0, 2.0),
];
const SPOT_RANGE: f32 = 12.0;

const AMBIENT_COLOR: Vec3 = Vec3::new(0.251, 0.251, 0.251);
const AMBIENT_INTENSITY: f32 = 0.15;

const CAMERA_POSITION: Vec3 = Vec3::new(4.0, 5.0, 8.0);
const CAMERA_FOV_DEGREES: f32 = 55.0;
const CAMERA_NEAR: f32 = 1.0;
const CAMERA_FAR: f32 = 100.0;

const FOX_SCALE: f32 = 0.02;

/// Handles to the stage objects that settings changes need to reach.
pub struct SceneHandles {
    pub plate: NodeHandle,
    pub fox_root: NodeHandle,
    pub spotlights: [NodeHandle; 3],
    pub camera: NodeHandle,
}

/// A fully assembled stage, ready for the render loop.
pub struct BuiltScene {
    pub scene: Scene,
    pub handles: SceneHandles,
    pub clips: ClipSet,
}

/// Assembles the stage from loaded resources. `aspect` seeds the camera's
/// projection; resizes adjust it later.
pub fn build_scene(
    resources: &LoadedResources,
    settings: &DebugSettings,
    aspect: f32,
) -> Result<BuiltScene> {
    let mut scene = Scene::new();

    let plate = build_plate(&mut scene, resources, settings);
    let spotlights = build_spotlights(&mut scene, settings);
    build_ambient(&mut scene);
    let camera = build_camera(&mut scene, aspect);

    let import = import_model(&mut scene, &resources.fox_bytes, "Fox")?;
    let fox_root = import.root;
    if let Some(node) = scene.get_node_mut(fox_root) {
        node.transform.scale = Vec3::splat(FOX_SCALE);
    }
    for handle in scene.collect_subtree(fox_root) {
        if let Some(mesh) = scene.get_mesh_mut(handle) {
            mesh.cast_shadow = true;
        }
    }

    scene.update();

    Ok(BuiltScene {
        scene,
        handles: SceneHandles {
            plate,
            fox_root,
            spotlights,
            camera,
        },
        clips: import.clips,
    })
}

fn build_plate(
    scene: &mut Scene,
    resources: &LoadedResources,
    settings: &DebugSettings,
) -> NodeHandle {
    let mut node = Node::new();
    // The disc is generated facing +Z; lay it flat on the XZ plane.
    node.transform.rotation = Quat::from_rotation_x(-FRAC_PI_2);

    let material = Material {
        base_color: PLATE_COLOR,
        color_map: Some(resources.floor_color.clone()),
        normal_map: Some(resources.floor_normal.clone()),
        use_normal_map: settings.use_normal_map,
    };
    let mut mesh = Mesh::new(
        Arc::new(Geometry::disc(PLATE_RADIUS, PLATE_SEGMENTS)),
        material,
    );
    mesh.receive_shadow = true;

    let handle = scene.add_node(node);
    scene.set_name(handle, "GroundPlate");
    scene.set_mesh(handle, mesh);
    handle
}

fn build_spotlights(scene: &mut Scene, settings: &DebugSettings) -> [NodeHandle; 3] {
    SPOT_POSITIONS.map(|position| {
        let mut node = Node::new();
        node.transform.position = position;
        node.transform.look_at(Vec3::ZERO, Vec3::Y);

        let outer = settings.light_angle;
        let mut light = Light::new_spot(
            Vec3::ONE,
            settings.light_intensity,
            SPOT_RANGE,
            outer * (1.0 - settings.penumbra),
            outer,
        );
        light.cast_shadows = true;

        let handle = scene.add_node(node);
        scene.set_light(handle, light);
        handle
    })
}

fn build_ambient(scene: &mut Scene) -> NodeHandle {
    let handle = scene.create_node_with_name("AmbientFill");
    scene.set_light(handle, Light::new_ambient(AMBIENT_COLOR, AMBIENT_INTENSITY));
    handle
}

fn build_camera(scene: &mut Scene, aspect: f32) -> NodeHandle {
    let mut node = Node::new();
    node.transform.position = CAMERA_POSITION;
    node.transform.look_at(Vec3::ZERO, Vec3::Y);

    let handle = scene.add_node(node);
    scene.set_camera(
        handle,
        Camera::new_perspective(CAMERA_FOV_DEGREES, aspect, CAMERA_NEAR, CAMERA_FAR),
    );
    scene.active_camera = Some(handle);
    handle
}

/// Pushes the current light settings onto all three spot lights.
pub fn apply_light_settings(scene: &mut Scene, handles: &SceneHandles, settings: &DebugSettings) {
    let outer = settings.light_angle;
    for &handle in &handles.spotlights {
        if let Some(light) = scene.get_light_mut(handle) {
            light.intensity = settings.light_intensity;
            light.set_spot_cone(outer, settings.penumbra);
        }
    }
}

/// Toggles the ground plate's normal map.
pub fn set_normal_map(scene: &mut Scene, handles: &SceneHandles, enabled: bool) {
    if let Some(mesh) = scene.get_mesh_mut(handles.plate) {
        mesh.material.use_normal_map = enabled;
    }
}
