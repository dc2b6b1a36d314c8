use std::sync::Arc;

use axum::http::Method;
use clap::Parser;
use log::{debug, info, warn};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use api::service_controller::ServiceController;
use config::{Config, MemeSecrets};
use price_engine::{
    CoingeckoClient, GeckoTerminalClient, InferenceEngine, Jitter, RandomCredentialPool,
    UpshotOracleClient,
};

#[derive(Parser, Debug)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Seed for the price adjustment and key selection, random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    simple_logger::SimpleLogger::new().env().init().unwrap();

    let args = Args::parse();
    debug!("Args: {:?}", args);

    // Load configuration from yaml
    let mut config = Config::from_file(&args.config).expect("Failed to load config file");
    config.apply_env_overrides().expect("Invalid COINGECKO_API_KEYS");

    run_server(config, args.seed).await;
}

async fn run_server(config: Config, seed: Option<u64>) {
    info!("Starting Price Relay Server");

    let (app_host, app_port) = (config.server.host.clone(), config.server.port);

    let (credentials, jitter) = match seed {
        Some(seed) => (
            RandomCredentialPool::seeded(config.coingecko.api_keys.clone(), seed.wrapping_add(1)),
            Jitter::seeded(seed, &config.adjustment),
        ),
        None => (
            RandomCredentialPool::from_entropy(config.coingecko.api_keys.clone()),
            Jitter::from_entropy(&config.adjustment),
        ),
    };
    let credentials = credentials.expect("CoinGecko credential pool is empty");
    info!("Loaded {} CoinGecko API keys", credentials.len());

    let secrets = MemeSecrets::from_env();
    if secrets.upshot_api_key.is_none() || secrets.rpc_url.is_none() {
        warn!("UPSHOT_APIKEY or RPC not set, block height requests will fail");
    }

    let inference_engine = InferenceEngine::new(
        Arc::new(CoingeckoClient::new(&config.coingecko.base_url, Arc::new(credentials))),
        Arc::new(UpshotOracleClient::new(&config.upshot.base_url)),
        Arc::new(GeckoTerminalClient::new(&config.geckoterminal.base_url)),
        Arc::new(jitter),
        secrets,
    );

    let service_controller = ServiceController::new(Arc::new(inference_engine));

    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    let app = service_controller.router().layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", app_host, app_port))
        .await
        .expect("Failed to bind port");
    info!("Listening on {}:{}", app_host, app_port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server stopped.");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Unable to handle ctrl+c");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}
