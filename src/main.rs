use tokio::net::TcpListener;

use car_price_lookup::{AppState, api::create_router, config::Config, providers};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;

    let app_state = AppState {
        backend: providers::backend_from_config(&config),
    };

    let app = create_router(app_state);
    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
