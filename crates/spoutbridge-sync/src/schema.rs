//! Schema construction, publication and persistence.
//!
//! A schema is the ordered list of scenes the frame-sync session may ask
//! for. A scene's position is its scene index, so schemas are always built
//! from the insertion-stable source list.

use serde::{Deserialize, Serialize};
use spoutbridge_core::defaults::INPUT_PARAMETER_KEY;
use spoutbridge_core::{BridgeError, Result};
use spoutbridge_gpu::GpuBackend;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::services::FrameSyncService;

/// Current schema file version.
pub const CURRENT_VERSION: u32 = 1;

pub const ENGINE_NAME: &str = "SpoutRenderStream";
pub const ENGINE_VERSION: &str = "1.8";
pub const PLUGIN_VERSION: &str = "2.0";

/// Name of the single scene published when no sources are tracked.
pub const DEFAULT_SCENE: &str = "Default";

/// What a remote parameter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// An external texture supplied by the session each frame.
    Image,
}

/// DMX encoding for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DmxType {
    #[default]
    Dmx16BigEndian,
}

/// Parameter flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterFlags(pub u32);

impl ParameterFlags {
    pub const NONE: Self = Self(0);
}

/// One parameter exposed on a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteParameter {
    pub group: String,
    pub display_name: String,
    pub key: String,
    pub kind: ParameterKind,
    /// -1 leaves DMX patching to the session.
    pub dmx_offset: i32,
    pub dmx_type: DmxType,
    pub flags: ParameterFlags,
}

impl RemoteParameter {
    /// The incoming-texture parameter declared when input is enabled.
    pub fn image_input() -> Self {
        Self {
            group: "Input".to_string(),
            display_name: "SpoutSource".to_string(),
            key: INPUT_PARAMETER_KEY.to_string(),
            kind: ParameterKind::Image,
            dmx_offset: -1,
            dmx_type: DmxType::Dmx16BigEndian,
            flags: ParameterFlags::NONE,
        }
    }
}

/// A named endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub parameters: Vec<RemoteParameter>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: RemoteParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&RemoteParameter> {
        self.parameters.iter().find(|p| p.key == key)
    }
}

/// The descriptor published to the frame-sync session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub engine_name: String,
    pub engine_version: String,
    pub plugin_version: String,
    pub info: String,
    pub scenes: Vec<Scene>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            engine_name: ENGINE_NAME.to_string(),
            engine_version: ENGINE_VERSION.to_string(),
            plugin_version: PLUGIN_VERSION.to_string(),
            info: String::new(),
            scenes: Vec::new(),
        }
    }
}

impl Schema {
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Look up the scene a frame event refers to.
    pub fn scene(&self, index: u32) -> Result<&Scene> {
        self.scenes
            .get(index as usize)
            .ok_or(BridgeError::StaleSceneIndex {
                index,
                scene_count: self.scenes.len(),
            })
    }

    pub fn scene_names(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|s| s.name.as_str())
    }
}

/// Builds schemas from the tracked source list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaBuilder {
    include_input: bool,
}

impl SchemaBuilder {
    pub fn new(include_input: bool) -> Self {
        Self { include_input }
    }

    /// One scene per source name, in list order.
    ///
    /// With input enabled every scene declares the image parameter, and an
    /// empty source list still yields a single `"Default"` scene so that
    /// input-only sessions have something to bind to. Without input, an empty
    /// list yields an empty schema.
    pub fn build(&self, source_names: &[String]) -> Schema {
        if source_names.is_empty() && self.include_input {
            return Self::input_only();
        }

        let scenes = source_names
            .iter()
            .map(|name| {
                let scene = Scene::new(name.clone());
                if self.include_input {
                    scene.with_parameter(RemoteParameter::image_input())
                } else {
                    scene
                }
            })
            .collect();

        Schema {
            scenes,
            ..Schema::default()
        }
    }

    /// The fixed schema published when outputs are disabled.
    pub fn input_only() -> Schema {
        Schema {
            scenes: vec![Scene::new(DEFAULT_SCENE).with_parameter(RemoteParameter::image_input())],
            ..Schema::default()
        }
    }
}

/// Hand a schema to the session and persist it to the session's cache location.
///
/// Only a rejected publication is an error. Once the session holds the
/// schema, a failed write to the cache is logged and the schema stands.
pub fn publish<B, F>(service: &mut F, path: &Path, schema: &Schema) -> Result<()>
where
    B: GpuBackend,
    F: FrameSyncService<B> + ?Sized,
{
    service.publish_schema(schema)?;
    if let Err(e) = service.persist_schema(path, schema) {
        warn!(path = %path.display(), error = %e, "Failed to persist schema");
    }
    info!(
        scenes = schema.scene_count(),
        path = %path.display(),
        "Schema published"
    );
    Ok(())
}

/// Where the schema for an executable is cached: `<exe stem>.rs.json`
/// next to the executable.
pub fn schema_path_for_executable(executable: &Path) -> PathBuf {
    executable.with_extension("rs.json")
}

/// Versioned schema file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaFile {
    /// File format version for migration.
    pub version: u32,
    pub schema: Schema,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl SchemaFile {
    pub fn new(schema: Schema) -> Self {
        Self {
            version: CURRENT_VERSION,
            schema,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| BridgeError::Serialization(format!("Failed to serialize schema: {}", e)))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| BridgeError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
        if !matches!(u32::try_from(version), Ok(v) if v != 0 && v <= CURRENT_VERSION) {
            return Err(BridgeError::Serialization(format!(
                "Schema file version {} is not supported (expected {})",
                version, CURRENT_VERSION
            )));
        }

        serde_json::from_value(raw)
            .map_err(|e| BridgeError::Serialization(format!("Failed to parse schema: {}", e)))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
