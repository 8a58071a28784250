use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use rustwatch_common::traits::{ChatTransport, ProfileFetcher};
use rustwatch_core::eventbus::EventBus;
use rustwatch_core::platforms::discord::DiscordPlatform;
use rustwatch_core::platforms::{PlatformAuth, PlatformIntegration};
use rustwatch_core::services::{CommandService, ProfileService, StatusPublisher};
use rustwatch_core::tasks::{
    spawn_command_listener, spawn_status_publish_task, DEFAULT_PUBLISH_INTERVAL,
};
use rustwatch_core::{
    Error, HttpProfileFetcher, RosterStore, BATTLEMETRICS_PLAYERS_URL, DEFAULT_FETCH_TIMEOUT,
};

const CONFIG_PATH_VAR: &str = "RUSTWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("rustwatch=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    info!("rustwatch {} starting", env!("CARGO_PKG_VERSION"));

    let path = config_path();
    if let Err(e) = run(&path).await {
        error!("Fatal: {e}");
        return Err::<(), _>(e).with_context(|| format!("rustwatch stopped (config {})", path.display()));
    }
    Ok(())
}

async fn run(path: &Path) -> Result<(), Error> {
    // 1) Config + roster
    let store = Arc::new(RosterStore::load(path)?);
    info!(
        "Loaded {} tracked player(s) from {}; status channel {}",
        store.players().await.len(),
        path.display(),
        store.channel_id().await
    );

    // 2) Event bus; subscribe before the gateway can deliver anything
    let event_bus = Arc::new(EventBus::new());
    let chat_events = event_bus.subscribe(None).await;

    // 3) Discord
    let token = store.token().await;
    let mut discord = DiscordPlatform::new(token, event_bus.clone());
    discord.authenticate().await?;
    discord.connect().await?;
    info!("Discord status: {:?}", discord.get_connection_status().await?);

    // 4) Services
    let transport: Arc<dyn ChatTransport> = Arc::new(discord.transport());
    let fetcher: Arc<dyn ProfileFetcher> = Arc::new(HttpProfileFetcher::new(
        BATTLEMETRICS_PLAYERS_URL,
        DEFAULT_FETCH_TIMEOUT,
    )?);
    let profiles = ProfileService::new(fetcher);
    let publisher = Arc::new(StatusPublisher::new(
        store.clone(),
        profiles.clone(),
        transport.clone(),
    ));
    let commands = Arc::new(CommandService::new(
        store.clone(),
        profiles,
        publisher.clone(),
        transport,
    ));

    // 5) Background tasks
    let listener = spawn_command_listener(commands, chat_events, event_bus.shutdown_rx.clone());
    let periodic = spawn_status_publish_task(
        publisher,
        DEFAULT_PUBLISH_INTERVAL,
        event_bus.shutdown_rx.clone(),
    );

    // 6) Wait for a termination signal
    wait_for_signal().await;
    info!("Shutdown requested; stopping tasks...");
    event_bus.shutdown();

    for (name, handle) in [("command listener", listener), ("status publisher", periodic)] {
        if let Err(e) = handle.await {
            warn!("{name} task ended abnormally: {e}");
        }
    }

    // 7) Close the gateway and flush state
    if let Err(e) = discord.disconnect().await {
        warn!("Error while disconnecting from Discord: {e}");
    }
    if let Ok(status) = discord.get_connection_status().await {
        info!("Discord status: {status:?}");
    }
    store.persist().await?;
    info!("Bye.");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to listen for SIGTERM: {e}");
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {e}");
            }
            return;
        }
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for Ctrl-C: {e}");
            }
        }
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
    }
}
