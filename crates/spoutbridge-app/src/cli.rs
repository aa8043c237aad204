//! Command-line options.

use clap::Parser;
use spoutbridge_core::{
    validate_geometry, BridgeError, PixelFormat, Result, StreamDescriptor, StreamHandle,
};
use spoutbridge_sync::BridgeConfig;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "spoutbridge")]
#[command(author, version, about = "Bridge named GPU video sources into a frame-synchronized render session", long_about = None)]
pub struct Cli {
    /// Show a preview of the received source
    #[arg(short, long)]
    pub windowed: bool,

    /// Drop vanished sources from the published schema
    #[arg(short, long)]
    pub remove_sender_names: bool,

    /// Declare an image input on every scene and forward it as a source
    #[arg(short = 'i', long = "inputs")]
    pub enable_input: bool,

    /// Skip output streams and publish a single input-only scene
    #[arg(long)]
    pub disable_outputs: bool,

    /// Longest a single wait for a frame request may block
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Schema cache location (default: next to the executable)
    #[arg(long, value_name = "PATH")]
    pub schema_path: Option<PathBuf>,

    /// Simulated source name (can be specified multiple times)
    #[arg(long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// Simulated output stream (can be specified multiple times)
    #[arg(long = "stream", value_name = "WxH[:FORMAT]")]
    pub streams: Vec<StreamSpec>,

    /// Geometry of simulated sources
    #[arg(long, value_name = "WxH", default_value = "1920x1080")]
    pub source_size: StreamSpec,

    /// Frame rate of the simulated session
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,
}

impl Cli {
    pub fn bridge_config(&self) -> Result<BridgeConfig> {
        let config = BridgeConfig {
            windowed: self.windowed,
            remove_sender_names: self.remove_sender_names,
            enable_input: self.enable_input,
            disable_outputs: self.disable_outputs,
            await_timeout_ms: self.timeout_ms,
            schema_path: self.schema_path.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Descriptors for the simulated session, with handles numbered from 1.
    pub fn stream_descriptors(&self) -> Vec<StreamDescriptor> {
        self.streams
            .iter()
            .zip(1u64..)
            .map(|(spec, id)| spec.descriptor(StreamHandle(id)))
            .collect()
    }
}

/// `WIDTHxHEIGHT` with an optional `:FORMAT` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl StreamSpec {
    pub fn descriptor(&self, handle: StreamHandle) -> StreamDescriptor {
        StreamDescriptor::new(handle, self.width, self.height, self.format)
    }
}

impl FromStr for StreamSpec {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let (geometry, format) = match s.split_once(':') {
            Some((geometry, format)) => (geometry, format.parse()?),
            None => (s, PixelFormat::Bgra8),
        };

        let malformed = || BridgeError::Config(format!("expected WIDTHxHEIGHT, got '{}'", s));
        let (width, height) = geometry
            .split_once(['x', 'X'])
            .ok_or_else(malformed)?;
        let width: u32 = width.trim().parse().map_err(|_| malformed())?;
        let height: u32 = height.trim().parse().map_err(|_| malformed())?;
        validate_geometry(width, height)
            .map_err(|e| BridgeError::Config(format!("'{}': {}", s, e)))?;

        Ok(Self {
            width,
            height,
            format,
        })
    }
}
