use std::env;
use std::time::Duration;

use crate::player::PlayerConfig;

const MAX_CONTENT_CACHE_TTL_HOURS: u64 = 24 * 365 * 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Panel
    pub panel_url: String,
    pub panel_username: Option<String>,
    pub panel_password: Option<String>,
    pub request_timeout_ms: u64,

    // Storage
    pub data_dir: String,
    pub content_cache_ttl_hours: u64,

    // Open channels
    pub open_channels_url: String,
    pub open_channels_ttl_secs: u64,

    // Player
    pub watchdog_timeout_ms: u64,
    pub controls_hide_ms: u64,
    pub osd_duration_ms: u64,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Panel
            panel_url: env::var("PANEL_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            panel_username: env::var("PANEL_USERNAME").ok().filter(|v| !v.is_empty()),
            panel_password: env::var("PANEL_PASSWORD").ok().filter(|v| !v.is_empty()),
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000),

            // Storage
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| ".uniplay".to_string()),
            content_cache_ttl_hours: env::var("CONTENT_CACHE_TTL_HOURS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .unwrap_or(12),

            // Open channels
            open_channels_url: env::var("OPEN_CHANNELS_URL")
                .unwrap_or_else(|_| "https://api.reidoscanais.io/channels".to_string()),
            open_channels_ttl_secs: env::var("OPEN_CHANNELS_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800), // 30 minutes

            // Player
            watchdog_timeout_ms: env::var("WATCHDOG_TIMEOUT_MS")
                .unwrap_or_else(|_| "12000".to_string())
                .parse()
                .unwrap_or(12_000),
            controls_hide_ms: env::var("CONTROLS_HIDE_MS")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .unwrap_or(4_000),
            osd_duration_ms: env::var("OSD_DURATION_MS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),

            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Clamped to ten years; larger values would overflow `chrono::Duration`
    pub fn content_cache_ttl(&self) -> chrono::Duration {
        let hours = self.content_cache_ttl_hours.min(MAX_CONTENT_CACHE_TTL_HOURS);
        chrono::Duration::hours(hours as i64)
    }

    pub fn open_channels_ttl(&self) -> Duration {
        Duration::from_secs(self.open_channels_ttl_secs)
    }

    /// Timer settings for the playback controller
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            watchdog_timeout: Duration::from_millis(self.watchdog_timeout_ms),
            controls_hide_delay: Duration::from_millis(self.controls_hide_ms),
            osd_duration: Duration::from_millis(self.osd_duration_ms),
            ..PlayerConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
