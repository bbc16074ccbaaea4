use calc_server::{config, logger, server};
use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = config::CliArgs::parse();
    let cfg = config::Config::load(&args)?;
    logger::init(&cfg)?;

    // Worker threads from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    server::start_signal_handler(Arc::clone(&state.shutdown))?;
    logger::log_server_start(&listener.local_addr()?, &cfg);

    server::start_server_loop(listener, state, active_connections).await;
    Ok(())
}
