//! Tour videos per stay
//!
//! Picks the bungalow tour video(s) for a stay id and builds the message
//! sent to guests before they share their passport photos. The stay id
//! usually arrives inside a registration URL, see
//! [`extract_stay_id_from_url`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_TOUR_URL: &str = "https://youtu.be/EsmqwgqyKI4";
pub const BEACH_TOUR_URL: &str = "https://www.youtube.com/watch?v=TfD5ZHq53jE";
pub const JUNGLE_TOUR_URL: &str = "https://youtu.be/b15Vj5_3Tuc";
pub const NEW_TOUR_URL: &str = "https://youtu.be/yCgEuyLapmc";

const FALLBACK_LABEL: &str = "Your Bungalow";

static NUMBERED_ROOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|_)(A[3-9]|B[6-9])(_|$)").expect("valid regex"));

static STAY_ID_QUERY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[?&]stay_id=([^&]*)").expect("valid regex"));

static STAY_ID_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([A-Za-z0-9_]+(?:House)?_[A-Za-z0-9_]+)(?:[/?&]|$)").expect("valid regex")
});

/// Video links per room type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourUrls {
    /// Numbered rooms, Double House and anything unrecognised
    pub default_url: String,
    pub beach_url: String,
    pub jungle_url: String,
    pub new_url: String,
}

impl Default for TourUrls {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_TOUR_URL.to_string(),
            beach_url: BEACH_TOUR_URL.to_string(),
            jungle_url: JUNGLE_TOUR_URL.to_string(),
            new_url: NEW_TOUR_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TourVideo {
    pub label: String,
    pub url: String,
}

impl TourVideo {
    fn new(label: impl Into<String>, url: &str) -> Self {
        Self { label: label.into(), url: url.to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TourGuide {
    urls: TourUrls,
}

impl TourGuide {
    pub fn new(urls: TourUrls) -> Self {
        Self { urls }
    }

    /// All videos that apply to a stay id, never empty
    ///
    /// Matching is case-insensitive. A stay spanning several room types
    /// (`A4_New_House_Smith`) gets one video per type.
    pub fn videos(&self, stay_id: &str) -> Vec<TourVideo> {
        let upper = stay_id.to_uppercase();
        let mut videos = Vec::new();

        if let Some(caps) = NUMBERED_ROOM_RE.captures(&upper) {
            videos.push(TourVideo::new(&caps[2], &self.urls.default_url));
        }
        if upper.contains("DOUBLE") {
            videos.push(TourVideo::new("Double House", &self.urls.default_url));
        }
        if upper.contains("BEACH") {
            videos.push(TourVideo::new("Beach House", &self.urls.beach_url));
        }
        if upper.contains("JUNGLE") {
            videos.push(TourVideo::new("Jungle House", &self.urls.jungle_url));
        }
        if upper.contains("NEW") {
            videos.push(TourVideo::new("New House", &self.urls.new_url));
        }

        if videos.is_empty() {
            videos.push(TourVideo::new(FALLBACK_LABEL, &self.urls.default_url));
        }
        videos
    }

    /// First applicable video URL
    pub fn primary_url(&self, stay_id: &str) -> String {
        self.videos(stay_id)
            .into_iter()
            .next()
            .map(|v| v.url)
            .unwrap_or_else(|| self.urls.default_url.clone())
    }

    /// Guest message with the tour link(s)
    pub fn message(&self, stay_id: &str) -> String {
        let videos = self.videos(stay_id);
        let section = match videos.as_slice() {
            [single] => single.url.clone(),
            many => many.iter().map(|v| format!("{} - {}", v.label, v.url)).collect::<Vec<_>>().join("\n"),
        };
        format!(
            "Perfect!.. Final step is a video tour of your bungalow. Please have a watch, \
             and when finished, reply here with your passport photos.\n\n{section}\n\n\
             By the way, if you send a photo of your ferry details we pick up guests at the \
             main pier in Thong Sala for 500 THB total, or Baan Tai pier for 750, or Haad Rin \
             pier for 1,000"
        )
    }
}

/// Stay id from a registration URL
///
/// Reads the `stay_id` query parameter (percent-decoded) first, then a
/// `<word>_<word>` path segment.
pub fn extract_stay_id_from_url(url: &str) -> Option<String> {
    if let Some(raw) = STAY_ID_QUERY_RE.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str()) {
        if !raw.is_empty() {
            let decoded = urlencoding::decode(raw).map(|d| d.into_owned()).unwrap_or_else(|_| raw.to_string());
            return Some(decoded);
        }
    }
    STAY_ID_PATH_RE.captures(url).map(|c| c[1].to_string())
}
