//! Stay-id resolution
//!
//! Turns a free-text stay label ("a4 van der Berg", "New House Smith",
//! "B7_Kislinger") into the canonical `stay_id` used as the grouping key
//! for guest rows. Resolution is total: any input yields a structurally
//! valid (possibly empty) result.
//!
//! Steps:
//! 1. Pre-clean separators and punctuation, tokenize on whitespace
//! 2. Match multi-word room phrases left to right (`New House`)
//! 3. Match single-token rooms (`A4`, collapsed `BeachHouse`)
//! 4. Canonicalize the leftover tokens into a surname
//! 5. Join catalog-ordered rooms and surname with underscores

use crate::domain::{RoomCode, StayResolution};
use crate::services::text::{ascii_alphanumeric, capitalize, clean_label, strip_diacritics};
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// Numbered rooms in catalog order
pub const DEFAULT_NUMBERED_ROOMS: [&str; 11] =
    ["A3", "A4", "A5", "A6", "A7", "A8", "A9", "B6", "B7", "B8", "B9"];

/// Named rooms in catalog order, always sorted after numbered rooms
pub const DEFAULT_NAMED_ROOMS: [&str; 4] = ["Double House", "Jungle House", "Beach House", "New House"];

/// Surname particles kept lowercase wherever they appear
pub const DEFAULT_CONNECTORS: [&str; 11] =
    ["von", "van", "de", "der", "den", "del", "della", "di", "da", "la", "le"];

static DEFAULT_RESOLVER: LazyLock<StayIdResolver> = LazyLock::new(StayIdResolver::default);

/// Resolve a stay label with the built-in catalog and connectors
pub fn resolve(raw: &str) -> StayResolution {
    DEFAULT_RESOLVER.resolve(raw)
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    label: String,
    /// Lowercased words of the label
    words: Vec<String>,
    /// Lowercased label with the spaces removed (`beachhouse`)
    collapsed: String,
}

/// Closed set of recognised rooms; position in the catalog is the sort order
#[derive(Debug, Clone)]
pub struct RoomCatalog {
    entries: Vec<CatalogEntry>,
    /// Indices of multi-word entries, longest phrase first
    phrases: Vec<usize>,
}

impl RoomCatalog {
    /// Build a catalog: numbered rooms first, then named rooms, each in the
    /// order given. Blank and duplicate labels are skipped.
    pub fn new<N, M, S>(numbered: N, named: M) -> Self
    where
        N: IntoIterator<Item = S>,
        M: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<CatalogEntry> = Vec::new();
        for label in numbered.into_iter().chain(named) {
            let words: Vec<String> =
                label.as_ref().split_whitespace().map(str::to_lowercase).collect();
            if words.is_empty() {
                continue;
            }
            let collapsed = words.concat();
            if entries.iter().any(|e| e.collapsed == collapsed) {
                continue;
            }
            entries.push(CatalogEntry {
                label: words_label(label.as_ref()),
                words,
                collapsed,
            });
        }

        let mut phrases: Vec<usize> =
            (0..entries.len()).filter(|&i| entries[i].words.len() > 1).collect();
        phrases.sort_by_key(|&i| std::cmp::Reverse(entries[i].words.len()));

        Self { entries, phrases }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in catalog order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Multi-word phrase starting at `tokens[start]`, all tokens unused
    fn match_phrase(&self, tokens: &[String], used: &[bool], start: usize) -> Option<(usize, usize)> {
        self.phrases.iter().find_map(|&idx| {
            let words = &self.entries[idx].words;
            let end = start + words.len();
            if end > tokens.len() || used[start..end].iter().any(|&u| u) {
                return None;
            }
            let matches = tokens[start..end].iter().zip(words).all(|(t, w)| t == w);
            matches.then_some((idx, words.len()))
        })
    }

    /// Single token: numbered code, one-word name, or collapsed phrase
    fn match_single(&self, token: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.collapsed == token)
    }

    fn room(&self, idx: usize) -> RoomCode {
        RoomCode::new(self.entries[idx].label.clone())
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBERED_ROOMS, DEFAULT_NAMED_ROOMS)
    }
}

/// Normalise internal whitespace of a configured label
fn words_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stay-id resolver bound to a room catalog and a connector list
///
/// Holds only immutable tables, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone)]
pub struct StayIdResolver {
    catalog: RoomCatalog,
    connectors: FxHashSet<String>,
}

impl StayIdResolver {
    pub fn new<I, S>(catalog: RoomCatalog, connectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let connectors = connectors
            .into_iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self { catalog, connectors }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    /// Surname particle check, case-insensitive
    pub fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(&word.to_lowercase())
    }

    /// Resolve a free-text stay label
    pub fn resolve(&self, raw: &str) -> StayResolution {
        let cleaned = clean_label(raw);
        if cleaned.is_empty() {
            return StayResolution { input: raw.to_string(), ..StayResolution::default() };
        }

        let tokens: Vec<&str> = cleaned.split(' ').collect();
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let mut used = vec![false; tokens.len()];
        let mut room_indices: Vec<usize> = Vec::new();

        // Pass 1: multi-word phrases
        let mut i = 0;
        while i < tokens.len() {
            match self.catalog.match_phrase(&lowered, &used, i) {
                Some((idx, width)) => {
                    used[i..i + width].fill(true);
                    room_indices.push(idx);
                    i += width;
                }
                None => i += 1,
            }
        }

        // Pass 2: single tokens
        for (i, token) in lowered.iter().enumerate() {
            if used[i] {
                continue;
            }
            if let Some(idx) = self.catalog.match_single(token) {
                used[i] = true;
                room_indices.push(idx);
            }
        }

        room_indices.sort_unstable();
        room_indices.dedup();
        let rooms: Vec<RoomCode> = room_indices.into_iter().map(|idx| self.catalog.room(idx)).collect();

        let surname_tokens: Vec<&str> =
            tokens.iter().enumerate().filter(|(i, _)| !used[*i]).map(|(_, t)| *t).collect();
        let last_name_canonical = self.canonical_surname(&surname_tokens);

        let mut parts: Vec<String> = rooms.iter().map(RoomCode::slug).collect();
        if !last_name_canonical.is_empty() {
            parts.push(last_name_canonical.clone());
        }
        let stay_id = finalize_stay_id(&parts.join("_"));

        StayResolution {
            input: raw.to_string(),
            rooms,
            last_in: surname_tokens.join(" "),
            last_name_canonical,
            stay_id,
        }
    }

    /// Canonical surname from surname tokens
    ///
    /// Diacritics are stripped, connectors stay lowercase, every other part
    /// is capitalized, and the parts are concatenated without separators:
    /// `["van", "der", "Berg"]` → `"vanderBerg"`.
    pub fn canonical_surname<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        tokens
            .iter()
            .flat_map(|t| t.as_ref().split(|c: char| c == '-' || c == '_' || c.is_whitespace()))
            .map(|part| ascii_alphanumeric(&strip_diacritics(part)))
            .filter(|part| !part.is_empty())
            .map(|part| {
                if self.is_connector(&part) {
                    part.to_lowercase()
                } else {
                    capitalize(&part)
                }
            })
            .collect()
    }
}

impl Default for StayIdResolver {
    fn default() -> Self {
        Self::new(RoomCatalog::default(), DEFAULT_CONNECTORS)
    }
}

/// Whitespace to underscores, keep `[A-Za-z0-9_]`, collapse and trim underscores
fn finalize_stay_id(joined: &str) -> String {
    let mapped: String = strip_diacritics(joined)
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    mapped.split('_').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("_")
}
