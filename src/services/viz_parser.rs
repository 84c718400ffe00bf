//! VIZ (Visual Inspection Zone) extraction from OCR text
//!
//! Pulls printed-page passport fields out of a free OCR text blob using
//! ordered label patterns. The first pattern that matches wins, so the
//! more specific layouts (US "Label/Label/Label" headers with the value on
//! the next line) come before the generic "LABEL: value" forms.

use crate::domain::Gender;
use crate::services::guest::parse_gender;
use crate::services::text::title_case_words;
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).expect("valid regex")).collect()
}

static SURNAME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"SURNAME/[^\n]*\n\s*([A-Z][A-Z \-']+)",
        r"SURNAME[:\s]+([A-Z][A-Z \-']+)",
        r"NAAM[:\s]+([A-Z \-']+)",
        r"APELLIDOS?[:\s]+([A-Z \-']+)",
    ])
});

static GIVEN_NAMES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"GIVEN\s+NAMES?/[^\n]*\n\s*([A-Z][A-Z \-']+)",
        r"GIVEN\s+NAMES?[:\s]+([A-Z][A-Z \-']+)",
        r"VOORNAMEN[:\s]+([A-Z \-']+)",
        r"NOMBRES?[:\s]+([A-Z \-']+)",
    ])
});

static DOCUMENT_NUMBER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"PASSPORT\s+NO\.?/[^\n]*\n\s*([A-Z0-9]+)",
        r"(?:DOCUMENT|PASSPORT)\s*NO\.?[:\s]*([A-Z0-9]+)",
        r"DOCUMENTNR[:\s]*([A-Z0-9]+)",
        r"\b([A-Z]\d{8})\b",
    ])
});

static NATIONALITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"NATIONALITY/[^\n]*\n\s*([A-Z][A-Z \-]+)",
        r"NATIONALITY[:\s]+([A-Z \-]+)",
        r"NATIONALITEIT[:\s]+([A-Z \-]+)",
        r"NATIONALIT[EÉ]\s*[:\s]*([A-Z \-]+)",
    ])
});

static BIRTH_DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"DATE\s+OF\s+BIRTH/[^\n]*\n\s*([0-9]{1,2}\s+[A-Z]{3}\s+[0-9]{4})",
        r"DATE\s+OF\s+BIRTH[:\s]+([0-9./\- ]+)",
        r"GEBOORTEDATUM[:\s]+([0-9./\- ]+)",
        r"FECHA\s+DE\s+NAC[:\s]+([0-9./\- ]+)",
    ])
});

static SEX: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"SEX/[^\n]*\n\s*([MFX])\b",
        r"SEX[:\s]+([MFX])\b",
        r"GESLACHT[:\s]+([MVX])\b",
        r"SEXE[:\s]+([MFX])\b",
    ])
});

static ISSUE_DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"DATE\s+OF\s+ISSUE/[^\n]*\n\s*([0-9]{1,2}\s+[A-Z]{3}\s+[0-9]{4})",
        r"DATE\s+OF\s+ISSUE[:\s]+([0-9./\- ]+)",
        r"DATE\s+D'EMISSION[:\s]+([0-9./\- ]+)",
        r"UITGIFTEDATUM[:\s]+([0-9./\- ]+)",
    ])
});

static EXPIRY_DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"DATE\s+OF\s+EXPIRATION/[^\n]*\n\s*([0-9]{1,2}\s+[A-Z]{3}\s+[0-9]{4})",
        r"DATE\s+OF\s+EXPIR[A-Z]*[:\s]+([0-9./\- ]+)",
        r"EXPIRATION[:\s]+([0-9./\- ]+)",
        r"VERVALDATUM[:\s]+([0-9./\- ]+)",
    ])
});

static DAY_MONTH_NAME_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s+([A-Z]{3})\s+(\d{4})").expect("valid regex"));

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})[/.\- ](\d{2})[/.\- ](\d{4})$").expect("valid regex")
});

static ALPHA3_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3}\b").expect("valid regex"));

/// Country names (or adjectives) recognised before falling back to the
/// first three-letter word
const KNOWN_NATIONALITIES: [(&str, &[&str]); 6] = [
    ("USA", &["USA", "UNITED STATES"]),
    ("NLD", &["NLD", "NETHERLANDS", "NEDERLAND"]),
    ("GBR", &["GBR", "UNITED KINGDOM", "BRITISH"]),
    ("DEU", &["DEU", "GERMANY", "DEUTSCH"]),
    ("FRA", &["FRA", "FRANCE", "FRANCAISE"]),
    ("ISR", &["ISR", "ISRAEL"]),
];

const MONTHS: [&str; 12] =
    ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];

/// Fields read from the printed passport page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VizFields {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub passport_number: Option<String>,
    pub nationality_alpha3: Option<String>,
    pub issuing_country_alpha3: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub passport_issue_date: Option<NaiveDate>,
    pub passport_expiry_date: Option<NaiveDate>,
}

impl VizFields {
    /// At least one of first or last name was found
    pub fn has_name(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some()
    }
}

/// Extract VIZ fields from an OCR text blob
pub fn parse_viz(text: &str) -> VizFields {
    let upper = text.to_uppercase();

    let given = pull(&upper, &GIVEN_NAMES).unwrap_or_default();
    let mut given_parts = given.split([' ', ',']).filter(|p| !p.is_empty());
    let first_name = given_parts.next().map(title_case_words);
    let rest: Vec<&str> = given_parts.collect();
    let middle_name = (!rest.is_empty()).then(|| title_case_words(&rest.join(" ")));

    let nationality = pull(&upper, &NATIONALITY).and_then(|n| nationality_alpha3(&n));

    VizFields {
        first_name,
        middle_name,
        last_name: pull(&upper, &SURNAME).map(|s| title_case_words(&s)),
        gender: pull(&upper, &SEX).and_then(|s| parse_gender(&s).ok().flatten()),
        passport_number: pull(&upper, &DOCUMENT_NUMBER)
            .map(|n| n.split_whitespace().collect::<String>()),
        issuing_country_alpha3: nationality.clone(),
        nationality_alpha3: nationality,
        birthday: pull(&upper, &BIRTH_DATE).and_then(|d| parse_viz_date(&d)),
        passport_issue_date: pull(&upper, &ISSUE_DATE).and_then(|d| parse_viz_date(&d)),
        passport_expiry_date: pull(&upper, &EXPIRY_DATE).and_then(|d| parse_viz_date(&d)),
    }
}

/// First capture of the first matching pattern, trimmed
fn pull(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        let value = re.captures(text)?.get(1)?.as_str().trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Map a printed nationality to ISO alpha-3
pub fn nationality_alpha3(value: &str) -> Option<String> {
    let cleaned: String = value
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || *c == ' ')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    for (code, needles) in KNOWN_NATIONALITIES {
        if needles.iter().any(|n| contains_word(cleaned, n)) {
            return Some(code.to_string());
        }
    }
    ALPHA3_WORD_RE.find(cleaned).map(|m| m.as_str().to_string())
}

/// Word-prefix match: `NEDERLAND` matches `NEDERLANDSE`, `USA` does not match `BUSAN`
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, _)| {
        i == 0 || haystack.as_bytes().get(i - 1).is_some_and(|b| *b == b' ')
    })
}

/// `03 SEP 1974` or `DD/MM/YYYY` (separators `/ . - space`)
pub fn parse_viz_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim().to_uppercase();
    if let Some(caps) = DAY_MONTH_NAME_YEAR_RE.captures(&value) {
        let day: u32 = caps[1].parse().ok()?;
        let month = MONTHS.iter().position(|m| *m == &caps[2])? as u32 + 1;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let caps = NUMERIC_DATE_RE.captures(&value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_labelled_layout() {
        let text = "PASSPORT\nSurname: SMITH\nGiven names: JOHN PAUL\nPassport No: X12345678\n\
                    Nationality: UNITED STATES OF AMERICA\nDate of birth: 15/03/1990\nSex: M\n\
                    Date of issue: 01.02.2020\nDate of expiry: 01-02-2030\n";
        let viz = parse_viz(text);
        assert_eq!(viz.last_name.as_deref(), Some("Smith"));
        assert_eq!(viz.first_name.as_deref(), Some("John"));
        assert_eq!(viz.middle_name.as_deref(), Some("Paul"));
        assert_eq!(viz.passport_number.as_deref(), Some("X12345678"));
        assert_eq!(viz.nationality_alpha3.as_deref(), Some("USA"));
        assert_eq!(viz.issuing_country_alpha3.as_deref(), Some("USA"));
        assert_eq!(viz.gender, Some(Gender::M));
        assert_eq!(viz.birthday, date(1990, 3, 15));
        assert_eq!(viz.passport_issue_date, date(2020, 2, 1));
        assert_eq!(viz.passport_expiry_date, date(2030, 2, 1));
        assert!(viz.has_name());
    }

    #[test]
    fn test_us_next_line_layout() {
        let text = "Surname/Nom/Apellidos\nDOE\nGiven Names/Prénoms/Nombres\nJANE MARIE\n\
                    Nationality/Nationalité/Nacionalidad\nUNITED STATES OF AMERICA\n\
                    Date of birth/Date de naissance/Fecha de nacimiento\n03 SEP 1974\n\
                    Sex/Sexe/Sexo\nF\nPassport No./No. du Passeport/No. del Pasaporte\nA12345678\n\
                    Date of issue/Date de délivrance/Fecha de expedición\n15 JAN 2015\n\
                    Date of expiration/Date d'expiration/Fecha de caducidad\n14 JAN 2025\n";
        let viz = parse_viz(text);
        assert_eq!(viz.last_name.as_deref(), Some("Doe"));
        assert_eq!(viz.first_name.as_deref(), Some("Jane"));
        assert_eq!(viz.middle_name.as_deref(), Some("Marie"));
        assert_eq!(viz.gender, Some(Gender::F));
        assert_eq!(viz.passport_number.as_deref(), Some("A12345678"));
        assert_eq!(viz.birthday, date(1974, 9, 3));
        assert_eq!(viz.passport_issue_date, date(2015, 1, 15));
        assert_eq!(viz.passport_expiry_date, date(2025, 1, 14));
    }

    #[test]
    fn test_dutch_labels() {
        let text = "NAAM: DE VRIES\nVOORNAMEN: ANNA\nGESLACHT: V\nNATIONALITEIT: NEDERLANDSE\n\
                    GEBOORTEDATUM: 01 02 1980\n";
        let viz = parse_viz(text);
        assert_eq!(viz.last_name.as_deref(), Some("De Vries"));
        assert_eq!(viz.first_name.as_deref(), Some("Anna"));
        assert_eq!(viz.middle_name, None);
        assert_eq!(viz.gender, Some(Gender::F));
        assert_eq!(viz.nationality_alpha3.as_deref(), Some("NLD"));
        assert_eq!(viz.birthday, date(1980, 2, 1));
    }

    #[test]
    fn test_sex_marker() {
        assert_eq!(parse_viz("SEX: X\n").gender, Some(Gender::X));
        assert_eq!(parse_viz("SEXE: F\n").gender, Some(Gender::F));
        assert_eq!(parse_viz("GESLACHT: M\n").gender, Some(Gender::M));
        assert_eq!(parse_viz("SEX: Q\n").gender, None);
    }

    #[test]
    fn test_nothing_found() {
        let viz = parse_viz("blurry photo of a beach");
        assert_eq!(viz, VizFields::default());
        assert!(!viz.has_name());
    }

    #[test]
    fn test_nationality_alpha3() {
        assert_eq!(nationality_alpha3("United Kingdom of Great Britain").as_deref(), Some("GBR"));
        assert_eq!(nationality_alpha3("CAN").as_deref(), Some("CAN"));
        assert_eq!(nationality_alpha3("BUSAN KOREA").as_deref(), None);
        assert_eq!(nationality_alpha3("---"), None);
    }

    #[test]
    fn test_parse_viz_date() {
        assert_eq!(parse_viz_date("03 sep 1974"), date(1974, 9, 3));
        assert_eq!(parse_viz_date("31/12/1999"), date(1999, 12, 31));
        assert_eq!(parse_viz_date("31/02/1999"), None);
        assert_eq!(parse_viz_date("03 XYZ 1974"), None);
        assert_eq!(parse_viz_date("1999-12-31"), None);
    }
}
