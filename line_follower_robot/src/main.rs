mod camera;
mod gpio;

use anyhow::Context;
use camera::OpenCvCamera;
use gpio::GpioBank;
use line_follower::{
    ControlLoop, LinePipeline, LoopError, LoopStats, MotorController, RobotConfig, StopSignal, stop_channel,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("line following robot starting");
    let config = load_config()?;

    // --- Interrupt Handling ---
    // ctrl-c only raises the flag; the loop notices at the next tick boundary.
    let (stop_handle, stop_signal) = stop_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted by user");
            stop_handle.raise();
        }
    });

    // --- Control Loop ---
    // Camera reads block, so the loop gets a dedicated blocking thread.
    let stats = tokio::task::spawn_blocking(move || drive(config, stop_signal))
        .await
        .context("control loop thread panicked")??;

    info!(
        ticks = stats.ticks,
        skipped = stats.skipped,
        intersections = stats.intersections,
        "robot shutdown complete"
    );
    Ok(())
}

fn load_config() -> anyhow::Result<RobotConfig> {
    match std::env::var("LF_CONFIG") {
        Ok(path) => RobotConfig::from_json_file(&path).with_context(|| format!("loading {path}")),
        Err(_) => Ok(RobotConfig::from_env()?),
    }
}

fn drive(config: RobotConfig, stop: StopSignal) -> Result<LoopStats, LoopError> {
    let mut control = ControlLoop::new(LinePipeline::new(config.calibration), config.tick_pause);
    control.start(
        || OpenCvCamera::open(config.camera_index),
        || -> anyhow::Result<_> { Ok(MotorController::new(GpioBank::open(config.pins)?)?) },
    )?;
    control.run(&stop)
}
