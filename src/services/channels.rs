//! Open-channel directories
//!
//! Free-to-air channel lists that sit next to the panel catalog. The remote
//! directory keeps a time-boxed in-memory cache and falls back to the last
//! good list when the endpoint is unreachable.

use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::OpenChannel;

/// Default cache lifetime for the remote directory
pub const DEFAULT_CHANNELS_TTL: Duration = Duration::from_secs(30 * 60);

struct CachedChannels {
    channels: Vec<OpenChannel>,
    fetched_at: Instant,
}

/// Channels fetched from a JSON endpoint returning an array of channels
pub struct RemoteDirectory {
    http: Client,
    endpoint: String,
    ttl: Duration,
    cache: Mutex<Option<CachedChannels>>,
}

impl RemoteDirectory {
    pub fn new(endpoint: &str, ttl: Duration, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            ttl,
            cache: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<Vec<OpenChannel>, String> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP error: {}", status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {}", e))?;

        // Anything other than an array counts as an empty directory
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| format!("Invalid JSON response: {}", e))?;
        match value {
            serde_json::Value::Array(_) => {
                serde_json::from_value(value).map_err(|e| format!("Invalid channel list: {}", e))
            }
            _ => Ok(Vec::new()),
        }
    }

    pub async fn get_channels(&self) -> Vec<OpenChannel> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.channels.clone();
            }
        }

        match self.fetch().await {
            Ok(channels) => {
                debug!("Fetched {} open channels from {}", channels.len(), self.endpoint);
                *cache = Some(CachedChannels {
                    channels: channels.clone(),
                    fetched_at: Instant::now(),
                });
                channels
            }
            Err(e) => {
                warn!("Open channel directory unavailable: {}", e);
                // Serve the last list even if expired
                cache
                    .as_ref()
                    .map(|cached| cached.channels.clone())
                    .unwrap_or_default()
            }
        }
    }
}

/// Source of free-to-air channels
pub enum ChannelDirectory {
    Remote(RemoteDirectory),
    Fixed(Vec<OpenChannel>),
}

impl ChannelDirectory {
    pub async fn get_channels(&self) -> Vec<OpenChannel> {
        match self {
            ChannelDirectory::Remote(remote) => remote.get_channels().await,
            ChannelDirectory::Fixed(channels) => channels.clone(),
        }
    }

    /// Built-in list of public broadcaster streams
    pub fn builtin() -> Self {
        let channel = |name: &str, folder: &str, cover: &str, stream: &str| OpenChannel {
            name: name.to_string(),
            folder: folder.to_string(),
            cover: cover.to_string(),
            stream: stream.to_string(),
        };

        ChannelDirectory::Fixed(vec![
            channel(
                "RTP Internacional",
                "Portugal",
                "https://upload.wikimedia.org/wikipedia/commons/thumb/7/7b/RTP_Internacional_Logo_2016.svg/250px-RTP_Internacional_Logo_2016.svg.png",
                "https://rtp-pull-live.m7.rtp.pt/liverepeater/rtpi_5_8.smil/playlist.m3u8",
            ),
            channel(
                "Euronews em Português",
                "Portugal",
                "https://upload.wikimedia.org/wikipedia/commons/thumb/4/41/Euronews_logo_2016.svg/1200px-Euronews_logo_2016.svg.png",
                "https://euronews-portuguese.m7.pt/liverepeater/euronews_portuguese_5_8.smil/playlist.m3u8",
            ),
            channel(
                "AR TV",
                "Portugal",
                "https://upload.wikimedia.org/wikipedia/pt/4/4b/Logo_ARTV.png",
                "https://artv-live.m7.rtp.pt/liverepeater/artv.smil/playlist.m3u8",
            ),
            channel(
                "Canal Alentejo",
                "Portugal",
                "https://rtmp.canalalentejo.pt/logo.png",
                "https://rtmp.canalalentejo.pt/live/canalalentejo/playlist.m3u8",
            ),
        ])
    }
}
