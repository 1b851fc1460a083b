use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{scene::SceneDescriptor, Result, SceneError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Model,
    Texture,
    Font,
    Video,
}

/// A locator together with the kind of loader it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub locator: String,
}

impl AssetRef {
    pub fn new(kind: AssetKind, locator: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
        }
    }

    pub fn model(locator: impl Into<String>) -> Self {
        Self::new(AssetKind::Model, locator)
    }

    pub fn texture(locator: impl Into<String>) -> Self {
        Self::new(AssetKind::Texture, locator)
    }

    pub fn font(locator: impl Into<String>) -> Self {
        Self::new(AssetKind::Font, locator)
    }

    pub fn video(locator: impl Into<String>) -> Self {
        Self::new(AssetKind::Video, locator)
    }
}

/// Registry for all assets referenced by scenes.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashSet<AssetRef>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already knows everything `scene` references.
    pub fn for_scene(scene: &SceneDescriptor) -> Self {
        let mut store = Self::new();
        for asset in scene.referenced_assets() {
            store.register(asset);
        }
        store
    }

    pub fn register(&mut self, asset: AssetRef) {
        self.assets.insert(asset);
    }

    pub fn contains(&self, asset: &AssetRef) -> bool {
        self.assets.contains(asset)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Fails on the first asset the scene references that is not registered.
    pub fn resolve_scene_assets(&self, scene: &SceneDescriptor) -> Result<()> {
        match scene
            .referenced_assets()
            .into_iter()
            .find(|asset| !self.assets.contains(asset))
        {
            Some(missing) => Err(SceneError::UnknownAsset(missing.locator)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;

    #[test]
    fn resolves_registered_assets() {
        let scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        let store = AssetStore::for_scene(&scene);

        assert!(store.resolve_scene_assets(&scene).is_ok());
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn errors_on_missing_assets() {
        let scene = SceneDescriptor::video_text_demo(&AppConfig::default());
        let mut store = AssetStore::new();
        store.register(AssetRef::model("/carla-draco.glb"));

        let err = store.resolve_scene_assets(&scene).unwrap_err();
        assert!(format!("{err}").contains("Inter-Bold.woff"));
    }

    #[test]
    fn kind_is_part_of_identity() {
        let mut store = AssetStore::new();
        store.register(AssetRef::texture("/1.mp4"));
        assert!(!store.contains(&AssetRef::video("/1.mp4")));
    }
}
