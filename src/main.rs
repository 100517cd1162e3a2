use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uniplay::config::Config;
use uniplay::models::ContentKind;
use uniplay::player::Delivery;
use uniplay::services::{
    channels::{ChannelDirectory, RemoteDirectory},
    xtream::{XtreamClient, XtreamCredentials},
    ContentCache, CredentialStore, FavoritesStore, FileStore, KidsPin, StoreHandle,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uniplay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting uniplay v{}", env!("CARGO_PKG_VERSION"));

    let player_config = config.player_config();
    tracing::info!(
        watchdog_ms = player_config.watchdog_timeout.as_millis() as u64,
        controls_hide_ms = player_config.controls_hide_delay.as_millis() as u64,
        osd_ms = player_config.osd_duration.as_millis() as u64,
        "Player timers"
    );

    let store: StoreHandle = Arc::new(FileStore::open(&config.data_dir)?);
    tracing::info!("Data directory: {}", config.data_dir);

    // Saved credentials take precedence over the environment
    let credentials = CredentialStore::new(store.clone());
    let saved = credentials.load()?;
    let (username, password) = match (&saved, &config.panel_username, &config.panel_password) {
        (Some(saved), _, _) => (saved.username.clone(), saved.password.clone()),
        (None, Some(username), Some(password)) => (username.clone(), password.clone()),
        _ => anyhow::bail!("No saved login; set PANEL_USERNAME and PANEL_PASSWORD"),
    };

    let client = XtreamClient::new(
        XtreamCredentials::new(&config.panel_url, &username, &password),
        &config.user_agent,
        config.request_timeout(),
    )?;

    if let Err(e) = client.login().await {
        if saved.is_some() {
            credentials.clear()?;
            tracing::warn!("Saved login rejected and forgotten");
        }
        return Err(e.into());
    }
    credentials.save(&username, &password)?;

    let categories = client.refresh_categories().await?;
    tracing::info!(
        live = categories.live.len(),
        vod = categories.vod.len(),
        series = categories.series.len(),
        "Categories loaded"
    );

    // Warm the first live category through the content cache
    let cache = ContentCache::new(store.clone(), config.content_cache_ttl());
    if let Some(category) = categories.live.first() {
        let fetcher = client.clone();
        let category_id = category.id.clone();
        let listing = cache
            .load(ContentKind::Live, &category.id, move || async move {
                fetcher.get_live_streams(Some(&category_id)).await
            })
            .await?;
        tracing::info!(
            category = %category.name,
            channels = listing.data.len(),
            status = ?listing.status,
            "Live category ready"
        );
        if let Some(refresh) = listing.refresh {
            let _ = refresh.await;
        }
    }

    // Open channels, falling back to the built-in list
    let directory = ChannelDirectory::Remote(RemoteDirectory::new(
        &config.open_channels_url,
        config.open_channels_ttl(),
        config.request_timeout(),
    )?);
    let mut open_channels = directory.get_channels().await;
    if open_channels.is_empty() {
        open_channels = ChannelDirectory::builtin().get_channels().await;
    }
    for channel in open_channels.iter().take(5) {
        tracing::info!(
            name = %channel.name,
            delivery = %Delivery::classify(&channel.stream),
            "Open channel"
        );
    }

    let favorites = FavoritesStore::new(store.clone());
    let kids_pin = KidsPin::new(store);
    tracing::info!(
        favorites = favorites.list()?.len(),
        custom_pin = kids_pin.current()? != uniplay::services::account::DEFAULT_KIDS_PIN,
        "User state loaded"
    );

    Ok(())
}
