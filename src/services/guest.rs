//! Guest-profile rows from parsed passport data
//!
//! A `GuestRowBuilder` binds one `StayIntake` (stay label, checkout,
//! phone) to a resolved stay id and then turns each MRZ record or VIZ
//! extraction of that stay into a `GuestProfile` row.

use crate::domain::{Gender, GuestProfile, MrzRecord, StayIntake};
use crate::services::stay_resolver::StayIdResolver;
use crate::services::text::{collapse_whitespace, title_case_words};
use crate::services::viz_parser::VizFields;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Checkout layouts that carry their own year
const CHECKOUT_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d %B %Y", "%B %d %Y", "%B %d, %Y", "%d/%m/%Y"];

/// Layouts tried after appending the reference year (`Sept 11` -> `Sep 11 2025`)
const YEARLESS_FORMATS: [&str; 2] = ["%d %B %Y", "%B %d %Y"];

static SEPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuestFieldError {
    #[error("unrecognised gender '{0}'")]
    Gender(String),

    #[error("nationality must be 3 letters, got '{0}'")]
    Nationality(String),

    #[error("MRZ record is not usable: {0}")]
    UnusableMrz(String),
}

/// Lenient gender parsing; blank input is `Ok(None)`
///
/// Dutch documents print `V` (vrouw) for female.
pub fn parse_gender(value: &str) -> Result<Option<Gender>, GuestFieldError> {
    match value.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "m" | "male" | "man" => Ok(Some(Gender::M)),
        "f" | "female" | "woman" | "v" => Ok(Some(Gender::F)),
        "x" => Ok(Some(Gender::X)),
        _ => Err(GuestFieldError::Gender(value.trim().to_string())),
    }
}

/// Upper-cased alpha-3 code; blank input is `Ok(None)`
pub fn parse_nationality(value: &str) -> Result<Option<String>, GuestFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() == 3 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(Some(trimmed.to_ascii_uppercase()))
    } else {
        Err(GuestFieldError::Nationality(trimmed.to_string()))
    }
}

/// Parse a checkout date the way staff type it
///
/// Accepts ISO, `11 September 2025`, `September 11, 2025`, `DD/MM/YYYY`,
/// and year-less `Sept 11` / `11 Sept` when a reference year is given.
pub fn parse_checkout(value: &str, reference_year: Option<i32>) -> Option<NaiveDate> {
    let cleaned = collapse_whitespace(&SEPT_RE.replace_all(value, "Sep"));
    if cleaned.is_empty() {
        return None;
    }
    if let Some(date) =
        CHECKOUT_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(&cleaned, f).ok())
    {
        return Some(date);
    }
    let with_year = format!("{cleaned} {}", reference_year?);
    YEARLESS_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(&with_year, f).ok())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// MRZ issuing states with a one-letter code (`D<<` is Germany)
fn mrz_country_alpha3(code: &str) -> &str {
    match code {
        "D" => "DEU",
        other => other,
    }
}

fn iso_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()
}

/// Builds guest rows for one stay
#[derive(Debug, Clone)]
pub struct GuestRowBuilder {
    stay_id: String,
    check_out_date: Option<NaiveDate>,
    phone_e164: Option<String>,
    notes: Option<String>,
    source: String,
}

impl GuestRowBuilder {
    /// Resolve the intake's stay label and apply its defaults
    ///
    /// `default_source` is used when the intake names no source.
    pub fn new(intake: &StayIntake, resolver: &StayIdResolver, default_source: &str) -> Self {
        let check_out_date = intake
            .default_checkout
            .as_deref()
            .and_then(|c| parse_checkout(c, intake.reference_year));
        Self {
            stay_id: resolver.resolve(&intake.stay_label).stay_id,
            check_out_date,
            phone_e164: non_blank(intake.phone.as_deref()),
            notes: non_blank(intake.notes.as_deref()),
            source: non_blank(intake.source.as_deref()).unwrap_or_else(|| default_source.to_string()),
        }
    }

    pub fn stay_id(&self) -> &str {
        &self.stay_id
    }

    pub fn check_out_date(&self) -> Option<NaiveDate> {
        self.check_out_date
    }

    fn row(&self) -> GuestProfile {
        GuestProfile {
            stay_id: self.stay_id.clone(),
            first_name: String::new(),
            middle_name: None,
            last_name: String::new(),
            gender: None,
            passport_number: String::new(),
            nationality_alpha3: None,
            issuing_country_alpha3: None,
            birthday: None,
            passport_issue_date: None,
            passport_expiry_date: None,
            check_out_date: self.check_out_date,
            phone_e164: self.phone_e164.clone(),
            notes: self.notes.clone(),
            source: self.source.clone(),
        }
    }

    /// Row from a parsed MRZ; invalid records and malformed country codes are rejected
    pub fn from_mrz(&self, record: &MrzRecord) -> Result<GuestProfile, GuestFieldError> {
        if !record.valid {
            let reason = record.error.clone().unwrap_or_else(|| "invalid".to_string());
            return Err(GuestFieldError::UnusableMrz(reason));
        }

        let issuing = parse_nationality(mrz_country_alpha3(&record.issuing_country))?;
        let nationality = match record.nationality.as_deref() {
            Some(code) => parse_nationality(mrz_country_alpha3(code))?,
            None => None,
        };
        let (first, middle) = record.given_names();

        Ok(GuestProfile {
            first_name: title_case_words(first),
            middle_name: non_blank(middle.as_deref()).map(|m| title_case_words(&m)),
            last_name: title_case_words(&record.last_name),
            gender: record.gender,
            passport_number: record.passport_number.clone(),
            nationality_alpha3: nationality.or_else(|| issuing.clone()),
            issuing_country_alpha3: issuing,
            birthday: iso_date(record.birthdate.as_deref()),
            passport_expiry_date: iso_date(record.expiry_date.as_deref()),
            ..self.row()
        })
    }

    /// Row from printed-page fields
    pub fn from_viz(&self, viz: &VizFields) -> GuestProfile {
        GuestProfile {
            first_name: viz.first_name.clone().unwrap_or_default(),
            middle_name: non_blank(viz.middle_name.as_deref()),
            last_name: viz.last_name.clone().unwrap_or_default(),
            gender: viz.gender,
            passport_number: viz.passport_number.clone().unwrap_or_default(),
            nationality_alpha3: viz.nationality_alpha3.clone(),
            issuing_country_alpha3: viz.issuing_country_alpha3.clone(),
            birthday: viz.birthday,
            passport_issue_date: viz.passport_issue_date,
            passport_expiry_date: viz.passport_expiry_date,
            ..self.row()
        }
    }
}
