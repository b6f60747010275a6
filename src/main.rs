mod config;
mod domain;
mod error;
mod portal_api;
mod readarr_client;

use std::{path::Path, sync::Arc};

use config::Config;
use poem::{
    EndpointExt, Route, Server, get,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use readarr_client::ReadarrClient;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type PortalResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> PortalResult<()> {
    // Initialize tracing (logs). Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,h2=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting Readarr portal"
    );
    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load();
    match config.validate() {
        Ok(_) => {}
        Err(e) => {
            return Err(anyhow::anyhow!(e));
        }
    }

    let client = ReadarrClient::new(&config.readarr_api_url, &config.readarr_api_key)?;
    tracing::info!(
        readarr_base = %config.readarr_api_url,
        books_path = %config.books_path.display(),
        "configured Readarr client"
    );

    run_poem(Arc::new(client), Arc::new(config)).await?;
    Ok(())
}

pub async fn run_poem(client: Arc<ReadarrClient>, config: Arc<Config>) -> PortalResult<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api = portal_api::routes::PortalApi {
        client: client.clone(),
    };
    let api_service = OpenApiService::new(api, "Readarr Portal API", version)
        .server(format!("http://{}", config.bind_addr));
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let bind_addr = config.bind_addr.clone();
    let route = Route::new()
        .at(
            "/api/download/:book_id",
            get(portal_api::download::download_book),
        )
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .data(client)
        .data(config)
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}
