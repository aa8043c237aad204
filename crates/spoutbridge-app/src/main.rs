//! SpoutBridge - named GPU video sources in a frame-synchronized render session
//!
//! Entry point: parses options, opens the GPU, and runs the frame loop
//! against the simulated collaborators until Ctrl-C.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use spoutbridge_gpu::{GpuContext, RenderSurface, RenderTarget, WgpuBackend};
use spoutbridge_sync::{FrameSyncLoop, Host, ShutdownSignal, SimulatedSession, SimulatedSources};
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Process-level host: stop on Ctrl-C, hand previews to whoever displays them.
struct AppHost {
    shutdown: ShutdownSignal,
    previews: u64,
}

impl Host<WgpuBackend> for AppHost {
    fn should_stop(&self) -> bool {
        self.shutdown.is_triggered()
    }

    fn present(&mut self, _gpu: &mut WgpuBackend, preview: &RenderTarget) -> spoutbridge_core::Result<()> {
        self.previews += 1;
        trace!(
            frame = self.previews,
            width = preview.width(),
            height = preview.height(),
            "Preview ready"
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.bridge_config().context("Invalid configuration")?;

    info!("SpoutBridge starting...");

    let shutdown = ShutdownSignal::new();
    let handler_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        handler_signal.trigger();
    })
    .context("Failed to install Ctrl-C handler")?;

    let context = GpuContext::new_blocking().context("Failed to initialize GPU")?;
    info!("GPU: {}", context.adapter_info().name);
    let gpu = WgpuBackend::new(context).context("Failed to create copy engine")?;

    let sources = SimulatedSources::new(
        cli.sources.clone(),
        cli.source_size.width,
        cli.source_size.height,
    );
    let session = SimulatedSession::new(cli.stream_descriptors(), cli.fps)
        .context("Invalid simulation options")?;

    let mut bridge = FrameSyncLoop::new(config, gpu, sources, session)
        .context("Failed to set up frame loop")?;
    info!(path = %bridge.schema_path().display(), "Schema location");

    let mut host = AppHost {
        shutdown,
        previews: 0,
    };
    let stats = bridge.run(&mut host).context("Session ended with an error")?;

    info!(
        ticks = stats.ticks,
        frames = stats.frames_dispatched,
        sent = stats.frames_sent,
        timeouts = stats.timeouts,
        "SpoutBridge stopped"
    );
    Ok(())
}
