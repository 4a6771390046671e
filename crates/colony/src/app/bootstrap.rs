use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::SimConfig;
use super::map::parse_map;
use super::tick::Simulation;
use super::world::ColonyWorld;
use super::AppError;

pub(crate) struct AppWiring {
    pub(crate) simulation: Simulation,
    pub(crate) tick_count: u64,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Colony Startup ===");
    wire(SimConfig::load()?)
}

fn wire(config: SimConfig) -> Result<AppWiring, AppError> {
    let map = parse_map(&config.map_source()?)?;
    let world = ColonyWorld::from_map(map, config.settler_count);
    info!(
        width = world.grid.width(),
        height = world.grid.height(),
        depth = world.grid.depth(),
        settlers = world.settlers.len(),
        designations = world.designations.len(),
        max_node_count = config.search.max_node_count,
        bidirectional = config.search.bidirectional,
        "colony_startup"
    );
    Ok(AppWiring {
        simulation: Simulation::new(world, &config),
        tick_count: config.tick_count,
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
