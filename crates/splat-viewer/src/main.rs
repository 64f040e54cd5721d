mod config;
mod scene;
mod viewer;

use anyhow::Result;

use splat_engine::device::GpuInit;
use splat_engine::logging::{init_logging, LoggingConfig};
use splat_engine::window::{Runtime, RuntimeConfig};

use crate::config::ViewerConfig;
use crate::viewer::Viewer;

fn main() -> Result<()> {
    // Logging first, so configuration warnings are visible.
    init_logging(LoggingConfig {
        env_filter: ViewerConfig::log_filter_from_env(),
        ..LoggingConfig::default()
    });

    let config = ViewerConfig::from_env();

    log::info!(
        "splat viewer: {} points, {:?} mode, scale {}",
        config.points,
        config.mode,
        config.scale
    );
    log::info!("controls: Tab mode, = / - scale, R reset, Esc quit");

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), Viewer::new(config))
}
