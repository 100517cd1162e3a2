//! Canonical catalog records
//!
//! Panel responses vary by endpoint (`stream_icon` vs `cover` vs
//! `movie_image`, numeric vs string ids). They are normalised into these
//! types once, in `services::xtream::types`, so nothing past the client has
//! to care which alias a panel used.

use serde::{Deserialize, Serialize};

/// Content kind, used for stream URLs, cache keys and favorite ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Live,
    Movie,
    Series,
}

impl ContentKind {
    /// Path segment used by the panel for playable URLs
    pub fn path_segment(&self) -> &'static str {
        match self {
            ContentKind::Live => "live",
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
        }
    }

    /// Prefix used for favorite ids
    fn id_prefix(&self) -> &'static str {
        match self {
            ContentKind::Live => "live",
            ContentKind::Movie => "vod",
            ContentKind::Series => "series",
        }
    }

    /// Build a kind-namespaced content id (`vod_42`, `live_5`, ...)
    ///
    /// Stream ids and series ids come from different id spaces on the panel,
    /// so favorites are keyed with the kind prefix.
    pub fn content_id(&self, id: impl std::fmt::Display) -> String {
        format!("{}_{}", self.id_prefix(), id)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Category for live, VOD, or series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Live channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChannel {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub epg_channel_id: Option<String>,
    /// Upstream URL some panels expose alongside the stream id
    pub direct_source: Option<String>,
}

/// Movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VodItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub rating: Option<String>,
    pub year: Option<String>,
    pub plot: Option<String>,
    pub container_extension: Option<String>,
}

/// Series (the show, not an episode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub plot: Option<String>,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub rating: Option<String>,
}

/// Series episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub season: i32,
    pub episode_num: i32,
    pub container_extension: Option<String>,
    pub image: Option<String>,
    pub plot: Option<String>,
    pub duration: Option<String>,
}

impl Episode {
    /// Per-episode content id, distinct from the owning series' `series_<id>`
    pub fn content_id(&self) -> String {
        format!("{}_ep_{}", ContentKind::Series.id_prefix(), self.id)
    }
}

/// One season with its episodes, in panel order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub number: i32,
    pub episodes: Vec<Episode>,
}

/// Series info with seasons sorted by number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetails {
    pub info: SeriesItem,
    pub seasons: Vec<Season>,
}

impl SeriesDetails {
    pub fn season(&self, number: i32) -> Option<&Season> {
        self.seasons.iter().find(|s| s.number == number)
    }
}

/// Movie details from `get_vod_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VodDetails {
    pub item: VodItem,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub duration: Option<String>,
    pub backdrop: Option<String>,
}

/// Any playable or browsable catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CatalogItem {
    Live(LiveChannel),
    Vod(VodItem),
    Series(SeriesItem),
    Episode(Episode),
}

impl CatalogItem {
    pub fn id(&self) -> &str {
        match self {
            CatalogItem::Live(c) => &c.id,
            CatalogItem::Vod(v) => &v.id,
            CatalogItem::Series(s) => &s.id,
            CatalogItem::Episode(e) => &e.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CatalogItem::Live(c) => &c.name,
            CatalogItem::Vod(v) => &v.name,
            CatalogItem::Series(s) => &s.name,
            CatalogItem::Episode(e) => &e.title,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            CatalogItem::Live(c) => c.image.as_deref(),
            CatalogItem::Vod(v) => v.image.as_deref(),
            CatalogItem::Series(s) => s.image.as_deref(),
            CatalogItem::Episode(e) => e.image.as_deref(),
        }
    }

    /// Kind used to build the stream URL; episodes play from the series path
    pub fn kind(&self) -> ContentKind {
        match self {
            CatalogItem::Live(_) => ContentKind::Live,
            CatalogItem::Vod(_) => ContentKind::Movie,
            CatalogItem::Series(_) | CatalogItem::Episode(_) => ContentKind::Series,
        }
    }

    /// Kind-namespaced id for the favorites set
    pub fn content_id(&self) -> String {
        match self {
            CatalogItem::Episode(e) => e.content_id(),
            _ => self.kind().content_id(self.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_prefixes() {
        assert_eq!(ContentKind::Movie.content_id(42), "vod_42");
        assert_eq!(ContentKind::Live.content_id("5"), "live_5");
        assert_eq!(ContentKind::Series.content_id(7), "series_7");
    }

    #[test]
    fn test_episode_uses_series_kind() {
        let item = CatalogItem::Episode(Episode {
            id: "901".to_string(),
            title: "Pilot".to_string(),
            season: 1,
            episode_num: 1,
            container_extension: Some("mkv".to_string()),
            image: None,
            plot: None,
            duration: None,
        });

        assert_eq!(item.kind(), ContentKind::Series);
        assert_eq!(item.content_id(), "series_ep_901");
        assert_ne!(item.content_id(), ContentKind::Series.content_id(901));
        assert_eq!(item.title(), "Pilot");
    }
}
