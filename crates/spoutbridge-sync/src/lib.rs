//! SpoutBridge Sync - source tracking, schemas and the frame loop
//!
//! Ties named video sources to the scenes of an external frame-sync session
//! and fans each requested frame out to every declared output stream.

pub mod config;
pub mod frame_loop;
pub mod schema;
pub mod services;
pub mod simulated;
pub mod sources;

pub use config::BridgeConfig;
pub use frame_loop::{FrameSyncLoop, LoopState, LoopStats, SkipReason, TickOutcome};
pub use schema::{
    DmxType, ParameterFlags, ParameterKind, RemoteParameter, Scene, Schema, SchemaBuilder,
    SchemaFile,
};
pub use services::{FrameSyncService, Host, ShutdownSignal, VideoSourceService};
pub use simulated::{SimulatedSession, SimulatedSources};
pub use sources::{diff, SourceDiff, SourceRegistry};
