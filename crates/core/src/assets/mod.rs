use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{config::AssetConfig, LimboError, Result, Tone};

/// Opaque texture id handed out by the host's texture provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Host side texture provider. Image decoding lives behind this seam.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle>;
}

/// Pixel rectangle inside a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// A texture, optionally narrowed to a named atlas region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub region: Option<Region>,
}

#[derive(Debug, Deserialize)]
struct AtlasFile {
    texture: String,
    regions: Vec<AtlasEntry>,
}

#[derive(Debug, Deserialize)]
struct AtlasEntry {
    name: String,
    #[serde(flatten)]
    region: Region,
}

/// Named sub-regions of a single texture sheet.
#[derive(Debug, Clone, Default)]
pub struct Atlas {
    pub texture: String,
    regions: HashMap<String, Region>,
}

impl Atlas {
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: AtlasFile = serde_json::from_str(raw)?;
        let mut regions = HashMap::new();
        for entry in file.regions {
            if entry.name.is_empty() || entry.region.w == 0 || entry.region.h == 0 {
                return Err(LimboError::asset(
                    &file.texture,
                    format!("atlas region `{}` is empty", entry.name),
                ));
            }
            if regions.insert(entry.name.clone(), entry.region).is_some() {
                return Err(LimboError::asset(
                    &file.texture,
                    format!("duplicate atlas region `{}`", entry.name),
                ));
            }
        }
        Ok(Self {
            texture: file.texture,
            regions,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| LimboError::asset(path.display().to_string(), err.to_string()))?;
        Self::from_json(&raw)
    }

    pub fn region(&self, name: &str) -> Option<Region> {
        self.regions.get(name).copied()
    }
}

/// The four stacked layers a key is drawn from, bottom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayer {
    Main,
    Highlight,
    Shadow,
    Outline,
}

impl KeyLayer {
    pub const ALL: [KeyLayer; 4] = [
        KeyLayer::Main,
        KeyLayer::Highlight,
        KeyLayer::Shadow,
        KeyLayer::Outline,
    ];

    /// Palette tone tinting this layer; the outline is drawn untinted.
    pub fn tone(self) -> Option<Tone> {
        match self {
            KeyLayer::Main => Some(Tone::Main),
            KeyLayer::Highlight => Some(Tone::Highlight),
            KeyLayer::Shadow => Some(Tone::Shadow),
            KeyLayer::Outline => None,
        }
    }

    fn atlas_name(self) -> &'static str {
        match self {
            KeyLayer::Main => "key_main",
            KeyLayer::Highlight => "key_highlight",
            KeyLayer::Shadow => "key_shadow",
            KeyLayer::Outline => "key_outline",
        }
    }
}

/// Registry for every texture the show draws. Layers that failed to load are
/// `None` and simply skipped at draw time.
#[derive(Debug, Default, Clone)]
pub struct AssetStore {
    layers: [Option<Sprite>; 4],
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the key layers, from the atlas when one is configured.
    /// Failures are logged and leave the layer empty.
    pub fn load(loader: &mut dyn TextureLoader, config: &AssetConfig) -> Self {
        let mut store = Self::new();
        match config.atlas.as_deref() {
            Some(atlas_path) => store.load_from_atlas(loader, Path::new(atlas_path)),
            None => {
                let paths = [
                    &config.key_main,
                    &config.key_highlight,
                    &config.key_shadow,
                    &config.key_outline,
                ];
                for (layer, path) in KeyLayer::ALL.into_iter().zip(paths) {
                    match loader.load_texture(path) {
                        Ok(texture) => store.set_layer(layer, Sprite { texture, region: None }),
                        Err(err) => tracing::warn!(%err, ?layer, "key layer unavailable"),
                    }
                }
            }
        }
        store
    }

    fn load_from_atlas(&mut self, loader: &mut dyn TextureLoader, path: &Path) {
        let atlas = match Atlas::from_path(path) {
            Ok(atlas) => atlas,
            Err(err) => {
                tracing::warn!(%err, "atlas unavailable, keys will not be drawn");
                return;
            }
        };
        let texture = match loader.load_texture(&atlas.texture) {
            Ok(texture) => texture,
            Err(err) => {
                tracing::warn!(%err, "atlas texture unavailable, keys will not be drawn");
                return;
            }
        };
        for layer in KeyLayer::ALL {
            match atlas.region(layer.atlas_name()) {
                Some(region) => self.set_layer(
                    layer,
                    Sprite {
                        texture,
                        region: Some(region),
                    },
                ),
                None => tracing::warn!(?layer, "atlas has no region for key layer"),
            }
        }
    }

    pub fn set_layer(&mut self, layer: KeyLayer, sprite: Sprite) {
        self.layers[layer as usize] = Some(sprite);
    }

    pub fn layer(&self, layer: KeyLayer) -> Option<Sprite> {
        self.layers[layer as usize]
    }

    pub fn missing_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out sequential ids, failing for any path containing `missing`.
    #[derive(Default)]
    struct FakeLoader {
        loaded: Vec<String>,
    }

    impl TextureLoader for FakeLoader {
        fn load_texture(&mut self, path: &str) -> Result<TextureHandle> {
            if path.contains("missing") {
                return Err(LimboError::asset(path, "not found"));
            }
            self.loaded.push(path.to_string());
            Ok(TextureHandle(self.loaded.len() as u32))
        }
    }

    #[test]
    fn loads_separate_layer_textures() {
        let mut loader = FakeLoader::default();
        let store = AssetStore::load(&mut loader, &AssetConfig::default());
        assert_eq!(store.missing_layers(), 0);
        assert_eq!(loader.loaded.len(), 4);
        assert_eq!(
            store.layer(KeyLayer::Outline).map(|s| s.texture),
            Some(TextureHandle(4))
        );
    }

    #[test]
    fn missing_layers_degrade_instead_of_failing() {
        let mut loader = FakeLoader::default();
        let config = AssetConfig {
            key_shadow: "missing.png".to_string(),
            ..AssetConfig::default()
        };
        let store = AssetStore::load(&mut loader, &config);
        assert_eq!(store.missing_layers(), 1);
        assert!(store.layer(KeyLayer::Shadow).is_none());
    }

    #[test]
    fn unreadable_atlas_leaves_store_empty() {
        let mut loader = FakeLoader::default();
        let config = AssetConfig {
            atlas: Some("definitely/missing/atlas.json".to_string()),
            ..AssetConfig::default()
        };
        let store = AssetStore::load(&mut loader, &config);
        assert_eq!(store.missing_layers(), 4);
        assert!(loader.loaded.is_empty());
    }

    #[test]
    fn parses_atlas_regions() {
        let atlas = Atlas::from_json(
            r#"{ "texture": "keys.png", "regions": [
                { "name": "key_main", "x": 0, "y": 0, "w": 64, "h": 64 },
                { "name": "key_outline", "x": 64, "y": 0, "w": 64, "h": 64 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(atlas.texture, "keys.png");
        assert_eq!(atlas.region("key_outline").map(|r| r.x), Some(64));
        assert!(atlas.region("key_shadow").is_none());
    }

    #[test]
    fn rejects_duplicate_and_empty_regions() {
        let duplicate = r#"{ "texture": "k.png", "regions": [
            { "name": "a", "x": 0, "y": 0, "w": 1, "h": 1 },
            { "name": "a", "x": 1, "y": 0, "w": 1, "h": 1 }
        ] }"#;
        let err = Atlas::from_json(duplicate).unwrap_err();
        assert!(format!("{err}").contains("duplicate"));

        let empty = r#"{ "texture": "k.png", "regions": [
            { "name": "a", "x": 0, "y": 0, "w": 0, "h": 1 }
        ] }"#;
        assert!(matches!(
            Atlas::from_json(empty),
            Err(LimboError::Asset { .. })
        ));
    }
}
