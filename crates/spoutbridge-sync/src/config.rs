//! Bridge configuration.

use serde::{Deserialize, Serialize};
use spoutbridge_core::defaults::AWAIT_TIMEOUT;
use spoutbridge_core::{BridgeError, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::schema::schema_path_for_executable;

/// Options recognized by the frame-sync loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Mirror the received source into a preview target each tick.
    pub windowed: bool,
    /// Drop vanished sources from the schema instead of keeping them forever.
    pub remove_sender_names: bool,
    /// Declare and forward the incoming image parameter.
    pub enable_input: bool,
    /// Skip output dispatch and publish a fixed input-only schema once.
    pub disable_outputs: bool,
    /// Upper bound on a single await-frame call.
    pub await_timeout_ms: u64,
    /// Where schemas are cached. Derived from the executable when unset.
    pub schema_path: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            windowed: false,
            remove_sender_names: false,
            enable_input: false,
            disable_outputs: false,
            await_timeout_ms: AWAIT_TIMEOUT.as_millis() as u64,
            schema_path: None,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.await_timeout_ms == 0 {
            return Err(BridgeError::Config(
                "await timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn await_timeout(&self) -> Duration {
        Duration::from_millis(self.await_timeout_ms)
    }

    pub fn outputs_enabled(&self) -> bool {
        !self.disable_outputs
    }

    /// The explicit schema path, or `<exe stem>.rs.json` beside the running executable.
    pub fn resolve_schema_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.schema_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe()?;
        Ok(schema_path_for_executable(&exe))
    }
}
