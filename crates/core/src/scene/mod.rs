use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{assets::AssetRef, texture::VideoMaterial, AppConfig};

/// Placement shared by every positioned node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    /// Euler angles in radians, XYZ order.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn rotated(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = [scale; 3];
        self
    }
}

/// Surface settings for the mirrored floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorMaterial {
    pub color: String,
    pub metalness: f32,
    pub roughness_map: String,
    pub normal_map: String,
    pub normal_scale: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneNode {
    Group {
        transform: Transform,
        children: Vec<SceneNode>,
    },
    Model {
        source: String,
        transform: Transform,
    },
    Text {
        content: String,
        font: String,
        font_size: f32,
        letter_spacing: f32,
        transform: Transform,
        material: VideoMaterial,
    },
    ReflectiveFloor {
        size: [f32; 2],
        resolution: u32,
        blur: [f32; 2],
        mirror: f32,
        mix_blur: f32,
        mix_strength: f32,
        transform: Transform,
        material: FloorMaterial,
    },
    AmbientLight {
        intensity: f32,
    },
    SpotLight {
        position: [f32; 3],
        intensity: f32,
    },
    DirectionalLight {
        position: [f32; 3],
        intensity: f32,
    },
}

impl SceneNode {
    fn collect_assets(&self, out: &mut Vec<AssetRef>) {
        match self {
            SceneNode::Group { children, .. } => {
                for child in children {
                    child.collect_assets(out);
                }
            }
            SceneNode::Model { source, .. } => out.push(AssetRef::model(source)),
            SceneNode::Text { font, .. } => out.push(AssetRef::font(font)),
            SceneNode::ReflectiveFloor { material, .. } => {
                out.push(AssetRef::texture(&material.roughness_map));
                out.push(AssetRef::texture(&material.normal_map));
            }
            SceneNode::AmbientLight { .. }
            | SceneNode::SpotLight { .. }
            | SceneNode::DirectionalLight { .. } => {}
        }
    }

    fn count(&self) -> usize {
        match self {
            SceneNode::Group { children, .. } => {
                1 + children.iter().map(SceneNode::count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Linear fog between two distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: String,
    pub near: f32,
    pub far: f32,
}

/// Full render tree handed to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub name: String,
    pub background: String,
    pub fog: Fog,
    /// Minimum and maximum device pixel ratio the renderer may use.
    pub pixel_ratio: [f32; 2],
    /// Video clips the text material cycles through.
    pub videos: Vec<String>,
    pub nodes: Vec<SceneNode>,
}

impl SceneDescriptor {
    /// Character model, video-textured text and a mirrored floor lit by
    /// ambient, spot and directional lights.
    pub fn video_text_demo(config: &AppConfig) -> Self {
        let playlist = &config.playlist;
        let environment = &config.environment;

        let character = SceneNode::Model {
            source: "/carla-draco.glb".to_string(),
            transform: Transform::at([-1.2, 0.0, 0.6])
                .rotated([0.0, PI - 0.4, 0.0])
                .scaled(0.26),
        };
        let text = SceneNode::Text {
            content: playlist.text.clone(),
            font: playlist.font.clone(),
            font_size: playlist.font_size,
            letter_spacing: playlist.letter_spacing,
            transform: Transform::at([0.0, 1.3, -2.0]),
            material: VideoMaterial::new(playlist.encoding),
        };
        let floor = SceneNode::ReflectiveFloor {
            size: [10.0, 10.0],
            resolution: 512,
            blur: [400.0, 100.0],
            mirror: 0.5,
            mix_blur: 6.0,
            mix_strength: 1.5,
            transform: Transform::default().rotated([-PI / 2.0, 0.0, PI / 2.0]),
            material: FloorMaterial {
                color: "#a0a0a0".to_string(),
                metalness: 0.4,
                roughness_map: "/SurfaceImperfections003_1K_var1.jpg".to_string(),
                normal_map: "/SurfaceImperfections003_1K_Normal.jpg".to_string(),
                normal_scale: [2.0, 2.0],
            },
        };

        Self {
            name: "Video Text".to_string(),
            background: environment.background.clone(),
            fog: Fog {
                color: environment.background.clone(),
                near: environment.fog_near,
                far: environment.fog_far,
            },
            pixel_ratio: environment.pixel_ratio,
            videos: playlist.sources.clone(),
            nodes: vec![
                SceneNode::Group {
                    transform: Transform::at([0.0, -1.0, 0.0]),
                    children: vec![character, text, floor],
                },
                SceneNode::AmbientLight { intensity: 0.5 },
                SceneNode::SpotLight {
                    position: [0.0, 10.0, 0.0],
                    intensity: 0.3,
                },
                SceneNode::DirectionalLight {
                    position: [-50.0, 0.0, -40.0],
                    intensity: 0.7,
                },
            ],
        }
    }

    /// Every asset the tree references, videos included.
    pub fn referenced_assets(&self) -> Vec<AssetRef> {
        let mut assets = Vec::new();
        for node in &self.nodes {
            node.collect_assets(&mut assets);
        }
        assets.extend(self.videos.iter().map(AssetRef::video));
        assets
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(SceneNode::count).sum()
    }

    /// The first text node's material, searching groups depth first.
    pub fn text_material_mut(&mut self) -> Option<&mut VideoMaterial> {
        fn find(nodes: &mut [SceneNode]) -> Option<&mut VideoMaterial> {
            for node in nodes {
                match node {
                    SceneNode::Text { material, .. } => return Some(material),
                    SceneNode::Group { children, .. } => {
                        if let Some(found) = find(children) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        find(&mut self.nodes)
    }
}

/// Pointer position normalised to [-1, 1] on both axes, y pointing up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        }
    }

    /// Converts a pixel position inside a `width` by `height` viewport.
    pub fn from_pixels(px: f32, py: f32, width: f32, height: f32) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::default();
        }
        Self::new(px / width * 2.0 - 1.0, -(py / height * 2.0 - 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetKind;

    #[test]
    fn demo_scene_has_expected_shape() {
        let scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        // group + model + text + floor + three lights
        assert_eq!(scene.node_count(), 7);
        assert_eq!(scene.videos.len(), 5);
        assert_eq!(scene.fog.near, 15.0);
        assert_eq!(scene.pixel_ratio, [1.0, 1.5]);
    }

    #[test]
    fn finds_text_material_inside_group() {
        let mut scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        let material = scene.text_material_mut().expect("text node");
        assert!(!material.tone_mapped);
    }

    #[test]
    fn lists_all_referenced_assets() {
        let scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        let assets = scene.referenced_assets();
        let count = |kind: AssetKind| assets.iter().filter(|asset| asset.kind == kind).count();

        assert_eq!(count(AssetKind::Model), 1);
        assert_eq!(count(AssetKind::Font), 1);
        assert_eq!(count(AssetKind::Texture), 2);
        assert_eq!(count(AssetKind::Video), 5);
    }

    #[test]
    fn serializes_nodes_with_kind_tag() {
        let scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["nodes"][0]["kind"], "group");
        assert_eq!(json["pixel_ratio"][1], 1.5);
        assert_eq!(json["nodes"][0]["children"][1]["content"], "Anime");
    }

    #[test]
    fn pointer_is_normalised_and_clamped() {
        let centre = PointerState::from_pixels(400.0, 300.0, 800.0, 600.0);
        assert_eq!(centre, PointerState::new(0.0, 0.0));

        let top_left = PointerState::from_pixels(0.0, 0.0, 800.0, 600.0);
        assert_eq!(top_left, PointerState::new(-1.0, 1.0));

        assert_eq!(PointerState::new(3.0, -7.0), PointerState::new(1.0, -1.0));
        assert_eq!(PointerState::from_pixels(1.0, 1.0, 0.0, 0.0), PointerState::default());
    }
}
