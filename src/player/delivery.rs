//! Delivery classification
//!
//! Stream URLs carry no content type, so the path decides: anything that
//! mentions a manifest (`.m3u8`) or a transport-stream segment (`.ts`) goes
//! through the segmented engine, the rest is handed to the sink as-is.

/// How a URL is played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Manifest-driven adaptive streaming through a [`StreamingEngine`](super::engine::StreamingEngine)
    Segmented,
    /// Single progressive resource played natively by the sink
    Direct,
}

impl Delivery {
    /// Classify by URL alone
    pub fn classify(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains(".m3u8") || url.contains(".ts") {
            Delivery::Segmented
        } else {
            Delivery::Direct
        }
    }

    /// Classify, falling back to direct delivery when the platform has no
    /// segmented engine (native HLS playback)
    pub fn select(url: &str, engine_supported: bool) -> Self {
        match Self::classify(url) {
            Delivery::Segmented if engine_supported => Delivery::Segmented,
            _ => Delivery::Direct,
        }
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self, Delivery::Segmented)
    }
}

impl std::fmt::Display for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delivery::Segmented => write!(f, "segmented"),
            Delivery::Direct => write!(f, "direct"),
        }
    }
}
