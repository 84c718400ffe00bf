//! Machine Readable Zone record

use super::types::Gender;
use serde::{Deserialize, Serialize};

/// Detected MRZ layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MrzFormat {
    /// Three 30-character lines (ID card)
    TD1,
    /// Two 44-character lines (passport), strictly shaped
    TD3,
    /// Line 1 starts with `P<` but the strict TD3 shape did not match
    #[serde(rename = "passport")]
    Passport,
    #[serde(rename = "unknown")]
    Unknown,
}

impl MrzFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MrzFormat::TD1 => "TD1",
            MrzFormat::TD3 => "TD3",
            MrzFormat::Passport => "passport",
            MrzFormat::Unknown => "unknown",
        }
    }
}

/// Parsed MRZ fields
///
/// Never mutated after the parser hands it out. Fields that could not be
/// read are empty strings (text) or `None` (coded values and dates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MrzRecord {
    pub format: MrzFormat,
    pub issuing_country: String,
    pub nationality: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub passport_number: String,
    pub gender: Option<Gender>,
    /// ISO `YYYY-MM-DD`
    pub birthdate: Option<String>,
    /// ISO `YYYY-MM-DD`
    pub expiry_date: Option<String>,
    pub valid: bool,
    pub error: Option<String>,
}

impl MrzRecord {
    pub(crate) fn empty(format: MrzFormat) -> Self {
        Self {
            format,
            issuing_country: String::new(),
            nationality: None,
            last_name: String::new(),
            first_name: String::new(),
            passport_number: String::new(),
            gender: None,
            birthdate: None,
            expiry_date: None,
            valid: true,
            error: None,
        }
    }

    pub(crate) fn failure(format: MrzFormat, error: impl Into<String>) -> Self {
        Self { valid: false, error: Some(error.into()), ..Self::empty(format) }
    }

    /// Split the given-names group into (first, middle)
    ///
    /// `"SANNE LISA MARIE"` gives `("SANNE", Some("LISA MARIE"))`.
    pub fn given_names(&self) -> (&str, Option<String>) {
        let mut parts = self.first_name.split_whitespace();
        let first = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();
        let middle = if rest.is_empty() { None } else { Some(rest.join(" ")) };
        (first, middle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_given_names_split() {
        let mut record = MrzRecord::empty(MrzFormat::TD3);
        record.first_name = "SANNE LISA".to_string();
        assert_eq!(record.given_names(), ("SANNE", Some("LISA".to_string())));

        record.first_name = "MARLOES".to_string();
        assert_eq!(record.given_names(), ("MARLOES", None));

        record.first_name = String::new();
        assert_eq!(record.given_names(), ("", None));
    }

    #[test]
    fn test_failure_shape() {
        let record = MrzRecord::failure(MrzFormat::Unknown, "Invalid MRZ string");
        assert!(!record.valid);
        assert_eq!(record.error.as_deref(), Some("Invalid MRZ string"));
        assert!(record.birthdate.is_none());
    }

    #[test]
    fn test_format_serialization() {
        assert_eq!(serde_json::to_value(MrzFormat::TD3).unwrap(), "TD3");
        assert_eq!(serde_json::to_value(MrzFormat::Passport).unwrap(), "passport");
        let record = MrzRecord::empty(MrzFormat::TD1);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("issuingCountry").is_some());
        assert!(json.get("expiryDate").is_some());
    }
}
