//! Binary glTF import
//!
//! Imports a `.glb` model into the scene: node hierarchy with decomposed TRS
//! transforms, skinned geometry, embedded base-color textures, and the
//! animation clips. The clip list is validated into a [`ClipSet`] before the
//! import is considered successful, so an asset missing the expected
//! idle/walk/run clips fails the load instead of silently not animating.

use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::animation::{
    AnimationClip, ClipSet, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData,
    TrackMeta,
};
use crate::assets::decode_texture_cpu;
use crate::errors::{Result, ViewerError};
use crate::scene::skeleton::Skeleton;
use crate::scene::{Geometry, Material, Mesh, Node, NodeHandle, Scene, SkeletonKey};

/// Result of a model import: the wrapper node everything hangs under, and
/// the validated animation clip set.
pub struct GltfImport {
    pub root: NodeHandle,
    pub clips: ClipSet,
}

/// Imports a binary glTF asset into `scene` under a new root node named
/// `label`.
pub fn import_model(scene: &mut Scene, bytes: &[u8], label: &str) -> Result<GltfImport> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let buffers = load_buffers(&gltf)?;

    // Shallow node pass: one scene node per glTF node, hierarchy wired up
    // afterwards. The name fallback must stay in sync with animation track
    // targets, which address nodes by this same name.
    let handles: Vec<NodeHandle> = gltf
        .nodes()
        .map(|gltf_node| {
            let mut node = Node::new();
            let (t, r, s) = gltf_node.transform().decomposed();
            node.transform.position = Vec3::from_array(t);
            node.transform.rotation = Quat::from_array(r);
            node.transform.scale = Vec3::from_array(s);

            let handle = scene.add_node(node);
            match gltf_node.name() {
                Some(name) => scene.set_name(handle, name),
                None => scene.set_name(handle, &format!("Node_{}", gltf_node.index())),
            }
            handle
        })
        .collect();

    for gltf_node in gltf.nodes() {
        for child in gltf_node.children() {
            scene.attach(handles[child.index()], handles[gltf_node.index()]);
        }
    }

    let root = scene.create_node_with_name(label);
    let doc_scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| ViewerError::GltfError("asset contains no scene".to_string()))?;
    for top in doc_scene.nodes() {
        scene.attach(handles[top.index()], root);
    }

    let skeleton_keys = load_skins(scene, &gltf, &buffers, &handles)?;
    load_meshes(scene, &gltf, &buffers, &handles, &skeleton_keys)?;

    let clips = load_animations(&gltf, &buffers)?;
    log::info!(
        "Imported model '{label}': {} nodes, {} clips",
        handles.len(),
        clips.len()
    );

    Ok(GltfImport { root, clips })
}

fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf.blob.as_deref().ok_or_else(|| {
                    ViewerError::GltfError("missing GLB binary chunk".to_string())
                })?;
                // A truncated file can declare more bytes than the chunk holds.
                if blob.len() < buffer.length() {
                    return Err(ViewerError::GltfError(format!(
                        "binary chunk holds {} bytes but the buffer declares {}",
                        blob.len(),
                        buffer.length()
                    )));
                }
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                return Err(ViewerError::GltfError(format!(
                    "external buffer '{uri}' not supported, pack the asset as binary glTF"
                )));
            }
        }
    }
    Ok(buffer_data)
}

fn load_skins(
    scene: &mut Scene,
    gltf: &gltf::Gltf,
    buffers: &[Vec<u8>],
    handles: &[NodeHandle],
) -> Result<Vec<SkeletonKey>> {
    let mut keys = Vec::new();

    for skin in gltf.skins() {
        let name = skin.name().unwrap_or("Skeleton");

        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let ibms: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
            Some(iter) => iter
                .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                .collect(),
            None => vec![Affine3A::IDENTITY; skin.joints().count()],
        };

        let bones: Vec<NodeHandle> = skin
            .joints()
            .map(|joint| handles[joint.index()])
            .collect();

        if bones.len() != ibms.len() {
            return Err(ViewerError::GltfError(format!(
                "skin '{name}': {} joints but {} inverse bind matrices",
                bones.len(),
                ibms.len()
            )));
        }

        keys.push(scene.add_skeleton(Skeleton::new(name, bones, ibms)));
    }

    Ok(keys)
}

fn load_meshes(
    scene: &mut Scene,
    gltf: &gltf::Gltf,
    buffers: &[Vec<u8>],
    handles: &[NodeHandle],
    skeleton_keys: &[SkeletonKey],
) -> Result<()> {
    for gltf_node in gltf.nodes() {
        let Some(gltf_mesh) = gltf_node.mesh() else {
            continue;
        };
        let handle = handles[gltf_node.index()];
        let skeleton = gltf_node.skin().map(|s| skeleton_keys[s.index()]);

        let primitives: Vec<_> = gltf_mesh.primitives().collect();
        if primitives.len() == 1 {
            let mesh = build_mesh(&primitives[0], buffers)?;
            scene.set_mesh(handle, mesh);
            if let Some(key) = skeleton {
                scene.bind_skin(handle, key);
            }
        } else {
            // One child node per primitive, so each draw has one material.
            for (i, primitive) in primitives.iter().enumerate() {
                let mesh = build_mesh(primitive, buffers)?;
                let child = scene.add_to_parent(Node::new(), handle);
                scene.set_name(child, &format!("Node_{}_primitive_{i}", gltf_node.index()));
                scene.set_mesh(child, mesh);
                if let Some(key) = skeleton {
                    scene.bind_skin(child, key);
                }
            }
        }
    }
    Ok(())
}

fn build_mesh(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Result<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| ViewerError::GltfError("primitive has no positions".to_string()))?
        .collect();

    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(iter) => iter.collect(),
        None => vec![[0.0, 1.0, 0.0]; positions.len()],
    };

    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(iter) => iter.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    let joints = reader
        .read_joints(0)
        .map(|iter| iter.into_u16().collect::<Vec<[u16; 4]>>());
    let weights = reader
        .read_weights(0)
        .map(|iter| iter.into_f32().collect::<Vec<[f32; 4]>>());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let geometry = Geometry {
        positions,
        normals,
        uvs,
        joints,
        weights,
        indices,
    };

    let material = build_material(&primitive.material(), buffers)?;
    Ok(Mesh::new(Arc::new(geometry), material))
}

fn build_material(material: &gltf::Material, buffers: &[Vec<u8>]) -> Result<Material> {
    let pbr = material.pbr_metallic_roughness();
    let factor = pbr.base_color_factor();

    let color_map = match pbr.base_color_texture() {
        Some(info) => match info.texture().source().source() {
            gltf::image::Source::View { view, .. } => {
                let start = view.offset();
                let end = start + view.length();
                let bytes = buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                    .ok_or_else(|| {
                        ViewerError::GltfError(format!(
                            "image view {start}..{end} lies outside its buffer"
                        ))
                    })?;
                Some(decode_texture_cpu(bytes, true)?)
            }
            gltf::image::Source::Uri { uri, .. } => {
                log::warn!("External image '{uri}' not supported, using base color factor");
                None
            }
        },
        None => None,
    };

    Ok(Material {
        base_color: Vec3::new(factor[0], factor[1], factor[2]),
        color_map,
        normal_map: None,
        use_normal_map: false,
    })
}

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<ClipSet> {
    let mut clips = Vec::new();

    for (anim_index, animation) in gltf.animations().enumerate() {
        let mut tracks = Vec::new();

        for channel in animation.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let Some(times) = reader.read_inputs().map(|iter| iter.collect::<Vec<f32>>()) else {
                continue;
            };

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let target_node = channel.target().node();
            let node_name = target_node
                .name()
                .map_or_else(|| format!("Node_{}", target_node.index()), str::to_string);

            let Some(outputs) = reader.read_outputs() else {
                continue;
            };

            let (target, data) = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => {
                    let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                    (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
                gltf::animation::util::ReadOutputs::Rotations(iter) => {
                    let values: Vec<Quat> = iter.into_f32().map(Quat::from_array).collect();
                    (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
                gltf::animation::util::ReadOutputs::Scales(iter) => {
                    let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                    (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
                gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
                    log::debug!("Skipping morph target channel in animation {anim_index}");
                    continue;
                }
            };

            tracks.push(Track {
                meta: TrackMeta { node_name, target },
                data,
            });
        }

        let name = animation
            .name()
            .map_or_else(|| format!("Animation_{anim_index}"), str::to_string);
        clips.push(Arc::new(AnimationClip::new(name, tracks)));
    }

    ClipSet::from_clips(clips)
}
