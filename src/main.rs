use std::sync::Arc;

use serve_static::config::{Config, ServeOptions};
use serve_static::server::{self, AppState};
use serve_static::{logger, ServeStatic};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension; "config" loads config.toml
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let serve_static = ServeStatic::new(ServeOptions::from_config(&cfg.serve)?)?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);
    let state = Arc::new(AppState::new(cfg, serve_static));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await?;
    Ok(())
}
