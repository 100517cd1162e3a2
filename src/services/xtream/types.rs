//! Xtream Codes API Types
//!
//! Wire types for Xtream Codes Player API v2 responses, and their
//! conversion into the canonical records in `crate::models::catalog`.
//!
//! Panels are inconsistent about JSON types: ids arrive as numbers or
//! strings, ratings as floats or strings, and empty objects as `[]`. The
//! `flex_*` and `lenient` deserializers absorb that here.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{
    Category, ContentKind, Episode, LiveChannel, Season, SeriesDetails, SeriesItem, VodDetails,
    VodItem,
};

/// Panel credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XtreamCredentials {
    /// Server base URL (e.g., "http://example.com:8080")
    pub server: String,
    /// Username for authentication
    pub username: String,
    /// Password for authentication
    pub password: String,
}

impl XtreamCredentials {
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Build the player_api.php base URL
    pub fn api_url(&self) -> String {
        format!(
            "{}/player_api.php?username={}&password={}",
            self.server,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password)
        )
    }

    /// Build a playable URL for a stream id
    ///
    /// Live channels use the raw `.ts` container, which panels serve more
    /// reliably to web-style players than their HLS output. Movies and
    /// episodes are requested as `.mp4`.
    pub fn stream_url(&self, id: &str, kind: ContentKind) -> String {
        let extension = match kind {
            ContentKind::Live => "ts",
            ContentKind::Movie | ContentKind::Series => "mp4",
        };
        format!(
            "{}/{}/{}/{}/{}.{}",
            self.server,
            kind.path_segment(),
            self.username,
            self.password,
            id,
            extension
        )
    }
}

// ============================================================================
// Lenient deserializers
// ============================================================================

fn flex_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn flex_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn flex_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Falls back to `T::default()` when the panel sends the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// First non-blank candidate, used to collapse image aliases
fn first_present(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
}

// ============================================================================
// Authentication Response Types
// ============================================================================

/// Authentication response from player_api.php (no action)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamAuthResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub user_info: XtreamUserInfo,
    #[serde(default, deserialize_with = "lenient")]
    pub server_info: XtreamServerInfo,
}

/// User account information
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamUserInfo {
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub exp_date: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub is_trial: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub active_cons: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub max_connections: Option<String>,
}

impl XtreamUserInfo {
    /// Panels report "Active" for usable accounts
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s == "Active")
            .unwrap_or(false)
    }

    /// Parse expiration timestamp to Unix timestamp
    pub fn exp_timestamp(&self) -> Option<i64> {
        self.exp_date.as_ref()?.parse().ok()
    }
}

/// Server information
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamServerInfo {
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub server_protocol: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub timezone: Option<String>,
}

// ============================================================================
// Category Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamCategory {
    #[serde(deserialize_with = "flex_string")]
    pub category_id: String,
    pub category_name: String,
    #[serde(default, deserialize_with = "flex_opt_i64")]
    pub parent_id: Option<i64>,
}

impl From<XtreamCategory> for Category {
    fn from(raw: XtreamCategory) -> Self {
        Category {
            id: raw.category_id,
            name: raw.category_name,
            parent_id: raw.parent_id.filter(|id| *id != 0),
        }
    }
}

// ============================================================================
// Live Stream Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamLiveStream {
    pub name: String,
    #[serde(deserialize_with = "flex_string")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub epg_channel_id: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub direct_source: Option<String>,
}

impl From<XtreamLiveStream> for LiveChannel {
    fn from(raw: XtreamLiveStream) -> Self {
        LiveChannel {
            id: raw.stream_id,
            name: raw.name,
            image: first_present([raw.stream_icon, raw.thumbnail]),
            category_id: raw.category_id,
            epg_channel_id: raw.epg_channel_id,
            direct_source: raw.direct_source,
        }
    }
}

// ============================================================================
// VOD Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamVodStream {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub container_extension: Option<String>,
}

impl From<XtreamVodStream> for VodItem {
    fn from(raw: XtreamVodStream) -> Self {
        VodItem {
            id: raw.stream_id,
            name: raw.name,
            image: first_present([raw.stream_icon, raw.thumbnail, raw.cover]),
            category_id: raw.category_id,
            rating: raw.rating,
            year: raw.year,
            plot: raw.plot,
            container_extension: raw.container_extension,
        }
    }
}

/// Detailed VOD information (from get_vod_info)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamVodInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub info: XtreamVodDetails,
    #[serde(default, deserialize_with = "lenient")]
    pub movie_data: XtreamVodStream,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamVodDetails {
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub cover_big: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub movie_image: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub releasedate: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<Value>,
}

impl XtreamVodInfo {
    /// Merge `info` over `movie_data` into the canonical details record
    pub fn into_details(self) -> VodDetails {
        let info = self.info;
        let mut item = VodItem::from(self.movie_data);

        if item.name.is_empty() {
            item.name = info.name.clone().unwrap_or_default();
        }
        item.image = first_present([info.cover_big, info.movie_image, item.image.take()]);
        if item.rating.is_none() {
            item.rating = info.rating;
        }
        if item.year.is_none() {
            item.year = info.releasedate.map(|d| d.chars().take(4).collect());
        }
        if item.plot.is_none() {
            item.plot = info.plot.clone();
        }

        let backdrop = match info.backdrop_path {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Array(paths)) => paths
                .into_iter()
                .find_map(|p| p.as_str().map(str::to_string)),
            _ => None,
        };

        VodDetails {
            item,
            description: first_present([info.description, info.plot]),
            genre: info.genre,
            cast: info.cast,
            director: info.director,
            duration: info.duration,
            backdrop,
        }
    }
}

// ============================================================================
// Series Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamSeries {
    #[serde(default, deserialize_with = "flex_string")]
    pub series_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub genre: Option<String>,
    #[serde(default, rename = "releaseDate", deserialize_with = "flex_opt_string")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub category_id: Option<String>,
}

impl From<XtreamSeries> for SeriesItem {
    fn from(raw: XtreamSeries) -> Self {
        SeriesItem {
            id: raw.series_id,
            name: raw.name,
            image: first_present([raw.cover, raw.thumbnail, raw.stream_icon]),
            category_id: raw.category_id,
            plot: raw.plot,
            cast: raw.cast,
            director: raw.director,
            genre: raw.genre,
            release_date: raw.release_date,
            rating: raw.rating,
        }
    }
}

/// Detailed series information (from get_series_info)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamSeriesInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub info: XtreamSeries,
    /// Episodes grouped by season number (key is season number as string)
    #[serde(default, deserialize_with = "lenient")]
    pub episodes: HashMap<String, Vec<XtreamEpisode>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamEpisode {
    #[serde(deserialize_with = "flex_string")]
    pub id: String,
    #[serde(default, deserialize_with = "flex_opt_i64")]
    pub episode_num: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub container_extension: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub info: XtreamEpisodeInfo,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamEpisodeInfo {
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub movie_image: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "flex_opt_string")]
    pub duration: Option<String>,
}

impl XtreamSeriesInfo {
    /// Normalise into seasons sorted numerically; `series_id` fills in
    /// panels that omit it from `info`
    pub fn into_details(self, series_id: &str) -> SeriesDetails {
        let mut info = SeriesItem::from(self.info);
        if info.id.is_empty() {
            info.id = series_id.to_string();
        }

        let mut seasons: Vec<Season> = self
            .episodes
            .into_iter()
            .filter_map(|(key, episodes)| {
                let number: i32 = key.trim().parse().ok()?;
                let episodes = episodes
                    .into_iter()
                    .map(|ep| Episode {
                        id: ep.id,
                        title: ep.title,
                        season: number,
                        episode_num: ep.episode_num.unwrap_or_default() as i32,
                        container_extension: ep.container_extension,
                        image: ep.info.movie_image,
                        plot: ep.info.plot,
                        duration: ep.info.duration,
                    })
                    .collect();
                Some(Season { number, episodes })
            })
            .collect();
        seasons.sort_by_key(|s| s.number);

        SeriesDetails { info, seasons }
    }
}
