use actix_web::{web, App, HttpServer};
use durak_backend::services::deadline::spawn_deadline_sweeper;
use durak_backend::{routes, AppState, EngineConfig, ServerConfig};
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let (server, engine) = match (ServerConfig::from_env(), EngineConfig::from_env()) {
        (Ok(server), Ok(engine)) => (server, engine),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        host = %server.host,
        port = server.port,
        action_window_s = engine.action_window.whole_seconds(),
        "starting durak backend"
    );

    let sweep_interval = engine.sweep_interval;
    let app_state = AppState::new(engine);
    let sweeper = spawn_deadline_sweeper(
        app_state.registry.clone(),
        sweep_interval,
        app_state.shutdown.clone(),
    );

    let data = web::Data::new(app_state.clone());

    let result = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await;

    app_state.shutdown.cancel();
    app_state.registry.shutdown();
    if let Err(e) = sweeper.await {
        error!(error = %e, "deadline sweeper task failed");
    }
    info!("durak backend stopped");
    result
}
