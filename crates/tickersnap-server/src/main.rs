use std::process::ExitCode;
use std::sync::Arc;

use tickersnap_core::{
    HttpClient, ProfileSource, ReqwestHttpClient, SnapshotFetcher, YahooAdapter,
};
use tickersnap_server::{create_router, AppState, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider: Arc<dyn ProfileSource> = Arc::new(
        YahooAdapter::with_transport(transport).with_timeout_ms(config.provider_timeout_ms),
    );
    log::info!(
        "{} adapter ready, health {}",
        provider.id(),
        provider.health().await.as_str()
    );

    let state = AppState::new(Arc::new(SnapshotFetcher::new(provider)));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.addr,
            source,
        })?;
    log::info!("listening on {}", config.addr);

    axum::serve(listener, create_router(state))
        .await
        .map_err(ServerError::Serve)
}
