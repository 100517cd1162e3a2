//! Next/previous navigation sources
//!
//! The player has no notion of a playlist; it asks a callback for the next
//! request. Live channel lists wrap around at both ends, episode lists stop
//! at the first and last episode.

use std::sync::{Arc, Mutex};

use super::controller::{MediaRequest, Navigation};
use crate::models::{ContentKind, Episode, LiveChannel, SeriesItem};
use crate::services::xtream::XtreamClient;

/// Position in an ordered list of playable items
pub trait PlaylistCursor: Send + 'static {
    fn current(&self) -> Option<&MediaRequest>;
    /// Move forward; `None` when there is nowhere to go
    fn advance(&mut self) -> Option<MediaRequest>;
    fn retreat(&mut self) -> Option<MediaRequest>;
    fn has_next(&self) -> bool;
    fn has_prev(&self) -> bool;
}

/// Live channel zapping, wrapping around both ends
#[derive(Debug, Clone)]
pub struct ChannelCursor {
    items: Vec<MediaRequest>,
    index: usize,
}

impl ChannelCursor {
    pub fn new(items: Vec<MediaRequest>, start: usize) -> Self {
        let index = start.min(items.len().saturating_sub(1));
        Self { items, index }
    }

    pub fn from_channels(client: &XtreamClient, channels: &[LiveChannel], start: usize) -> Self {
        let items = channels
            .iter()
            .map(|channel| {
                let mut request = MediaRequest::new(
                    client.build_stream_url(&channel.id, ContentKind::Live),
                )
                .live()
                .with_title(&channel.name)
                .with_content_id(ContentKind::Live.content_id(&channel.id));
                request.poster = channel.image.clone();
                request
            })
            .collect();
        Self::new(items, start)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PlaylistCursor for ChannelCursor {
    fn current(&self) -> Option<&MediaRequest> {
        self.items.get(self.index)
    }

    fn advance(&mut self) -> Option<MediaRequest> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.items.len();
        self.current().cloned()
    }

    fn retreat(&mut self) -> Option<MediaRequest> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + self.items.len() - 1) % self.items.len();
        self.current().cloned()
    }

    fn has_next(&self) -> bool {
        !self.items.is_empty()
    }

    fn has_prev(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Episodes of one season, bounded at both ends
#[derive(Debug, Clone)]
pub struct EpisodeCursor {
    items: Vec<MediaRequest>,
    index: usize,
}

impl EpisodeCursor {
    pub fn new(items: Vec<MediaRequest>, start: usize) -> Self {
        let index = start.min(items.len().saturating_sub(1));
        Self { items, index }
    }

    pub fn from_season(
        client: &XtreamClient,
        series: &SeriesItem,
        season: i32,
        episodes: &[Episode],
        start: usize,
    ) -> Self {
        let items = episodes
            .iter()
            .map(|episode| {
                let mut request = MediaRequest::new(
                    client.build_stream_url(&episode.id, ContentKind::Series),
                )
                .with_title(format!(
                    "{} - S{} E{}",
                    series.name, season, episode.episode_num
                ))
                .with_content_id(episode.content_id());
                request.poster = episode.image.clone().or_else(|| series.image.clone());
                request
            })
            .collect();
        Self::new(items, start)
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl PlaylistCursor for EpisodeCursor {
    fn current(&self) -> Option<&MediaRequest> {
        self.items.get(self.index)
    }

    fn advance(&mut self) -> Option<MediaRequest> {
        if !self.has_next() {
            return None;
        }
        self.index += 1;
        self.current().cloned()
    }

    fn retreat(&mut self) -> Option<MediaRequest> {
        if !self.has_prev() {
            return None;
        }
        self.index -= 1;
        self.current().cloned()
    }

    fn has_next(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    fn has_prev(&self) -> bool {
        self.index > 0 && !self.items.is_empty()
    }
}

impl Navigation {
    /// Next/prev callbacks sharing one cursor
    ///
    /// Availability follows the cursor, so a bounded list reports no `next`
    /// on its last item.
    pub fn from_cursor<C: PlaylistCursor>(cursor: C) -> Self {
        let cursor = Arc::new(Mutex::new(cursor));
        let next = cursor.clone();
        let prev = cursor.clone();
        let can_next = cursor.clone();
        let can_prev = cursor;

        Navigation {
            on_next: Some(Box::new(move || {
                next.lock().ok().and_then(|mut c| c.advance())
            })),
            on_prev: Some(Box::new(move || {
                prev.lock().ok().and_then(|mut c| c.retreat())
            })),
            can_next: Some(Box::new(move || {
                can_next.lock().map(|c| c.has_next()).unwrap_or(false)
            })),
            can_prev: Some(Box::new(move || {
                can_prev.lock().map(|c| c.has_prev()).unwrap_or(false)
            })),
            on_close: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::xtream::XtreamCredentials;

    fn requests(urls: &[&str]) -> Vec<MediaRequest> {
        urls.iter().map(|u| MediaRequest::new(*u)).collect()
    }

    fn urls(mut next: impl FnMut() -> Option<MediaRequest>, n: usize) -> Vec<String> {
        (0..n).filter_map(|_| next().map(|r| r.url)).collect()
    }

    #[test]
    fn test_channel_cursor_wraps() {
        let mut cursor = ChannelCursor::new(requests(&["a", "b", "c"]), 2);
        assert_eq!(cursor.advance().unwrap().url, "a");
        assert_eq!(cursor.retreat().unwrap().url, "c");
        assert_eq!(cursor.retreat().unwrap().url, "b");
        assert_eq!(urls(|| cursor.advance(), 4), vec!["c", "a", "b", "c"]);
    }

    #[test]
    fn test_empty_channel_cursor() {
        let mut cursor = ChannelCursor::new(Vec::new(), 3);
        assert!(cursor.is_empty());
        assert!(cursor.advance().is_none());
        assert!(cursor.retreat().is_none());
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_episode_cursor_is_bounded() {
        let mut cursor = EpisodeCursor::new(requests(&["e1", "e2", "e3"]), 0);
        assert!(!cursor.has_prev());
        assert!(cursor.retreat().is_none());
        assert_eq!(urls(|| cursor.advance(), 5), vec!["e2", "e3"]);
        assert!(!cursor.has_next());
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.retreat().unwrap().url, "e2");
    }

    #[test]
    fn test_channel_requests_from_catalog() {
        let client =
            XtreamClient::from_credentials(XtreamCredentials::new("http://panel:8080/", "u", "p"))
                .unwrap();
        let channels = vec![LiveChannel {
            id: "5".to_string(),
            name: "News".to_string(),
            image: Some("http://img/5.png".to_string()),
            category_id: None,
            epg_channel_id: None,
            direct_source: None,
        }];

        let cursor = ChannelCursor::from_channels(&client, &channels, 0);
        let request = cursor.current().unwrap();
        assert_eq!(request.url, "http://panel:8080/live/u/p/5.ts");
        assert!(request.is_live);
        assert_eq!(request.content_id.as_deref(), Some("live_5"));
        assert_eq!(request.poster.as_deref(), Some("http://img/5.png"));
    }

    #[test]
    fn test_episode_requests_from_season() {
        let client =
            XtreamClient::from_credentials(XtreamCredentials::new("http://panel", "u", "p"))
                .unwrap();
        let series = SeriesItem {
            id: "7".to_string(),
            name: "Show".to_string(),
            image: Some("cover".to_string()),
            category_id: None,
            plot: None,
            cast: None,
            director: None,
            genre: None,
            release_date: None,
            rating: None,
        };
        let episode = Episode {
            id: "701".to_string(),
            title: "Pilot".to_string(),
            season: 1,
            episode_num: 1,
            container_extension: Some("mkv".to_string()),
            image: None,
            plot: None,
            duration: None,
        };

        let cursor = EpisodeCursor::from_season(&client, &series, 1, &[episode], 0);
        let request = cursor.current().unwrap();
        assert_eq!(request.url, "http://panel/series/u/p/701.mp4");
        assert_eq!(request.title.as_deref(), Some("Show - S1 E1"));
        assert_eq!(request.content_id.as_deref(), Some("series_ep_701"));
        assert_eq!(request.poster.as_deref(), Some("cover"));
        assert!(!request.is_live);
    }

    #[test]
    fn test_navigation_reports_episode_bounds() {
        let last = Navigation::from_cursor(EpisodeCursor::new(requests(&["e1", "e2"]), 1));
        assert!(!last.has_next());
        assert!(last.has_prev());

        let mut first = Navigation::from_cursor(EpisodeCursor::new(requests(&["e1", "e2"]), 0));
        assert!(first.has_next());
        assert!(!first.has_prev());

        let next = first.on_next.as_mut().unwrap();
        assert_eq!(next().unwrap().url, "e2");
        assert!(!first.has_next());
        assert!(first.has_prev());
    }

    #[test]
    fn test_navigation_shares_cursor() {
        let mut nav = Navigation::from_cursor(ChannelCursor::new(requests(&["a", "b"]), 0));
        let next = nav.on_next.as_mut().unwrap();
        assert_eq!(next().unwrap().url, "b");
        let prev = nav.on_prev.as_mut().unwrap();
        assert_eq!(prev().unwrap().url, "a");
    }
}
