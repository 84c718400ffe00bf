//! Shared value types for stay resolution

use serde::{Deserialize, Serialize};

/// A room from the closed room catalog (e.g. `A4`, `New House`)
///
/// Only the resolver constructs these, and only for catalog members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Display label, e.g. `New House`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label with spaces replaced by underscores, e.g. `New_House`
    pub fn slug(&self) -> String {
        self.0.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Holder sex as printed in the MRZ / VIZ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    X,
}

impl Gender {
    /// Strict MRZ character mapping (`M`, `F`, `X`), anything else is `None`
    pub fn from_mrz_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(Gender::M),
            'F' => Some(Gender::F),
            'X' => Some(Gender::X),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
            Gender::X => "X",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the stay-id resolver
///
/// All fields are empty when nothing could be recognised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayResolution {
    /// Raw input, verbatim
    pub input: String,
    /// Extracted rooms, deduplicated and in catalog order
    pub rooms: Vec<RoomCode>,
    /// Non-room tokens joined by single spaces, before canonicalization
    pub last_in: String,
    pub last_name_canonical: String,
    pub stay_id: String,
}

impl StayResolution {
    pub fn is_empty(&self) -> bool {
        self.stay_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_slug() {
        assert_eq!(RoomCode::new("New House").slug(), "New_House");
        assert_eq!(RoomCode::new("A4").slug(), "A4");
    }

    #[test]
    fn test_gender_from_mrz_char() {
        assert_eq!(Gender::from_mrz_char('F'), Some(Gender::F));
        assert_eq!(Gender::from_mrz_char('<'), None);
        assert_eq!(Gender::from_mrz_char('m'), None);
    }

    #[test]
    fn test_resolution_serializes_rooms_as_strings() {
        let resolution = StayResolution {
            input: "a4 smith".to_string(),
            rooms: vec![RoomCode::new("A4")],
            last_in: "smith".to_string(),
            last_name_canonical: "Smith".to_string(),
            stay_id: "A4_Smith".to_string(),
        };
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["rooms"][0], "A4");
        assert_eq!(json["stay_id"], "A4_Smith");
    }
}
