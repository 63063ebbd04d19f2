use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, SceneKey, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::scenes::{self, load_tuning, TuningError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) scenes: Vec<(SceneKey, Box<dyn Scene>)>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Sprite Demos Startup ===");

    let paths = resolve_app_paths()?;
    let tuning = load_tuning(&paths.root)?;
    info!(
        movement_speed = tuning.movement_speed_px_per_ms,
        chest_frame_count = tuning.chest_frame_count,
        potion_count = tuning.potion_count,
        "tuning_loaded"
    );

    Ok(AppWiring {
        config: LoopConfig::default(),
        paths,
        scenes: scenes::build_scenes(&tuning),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
