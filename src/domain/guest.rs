//! Guest profile rows and the intake request that produces them

use super::types::Gender;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-stay context supplied by the caller alongside raw passport data
///
/// Every optional field has a documented fallback:
/// - `default_checkout`: used for guests without their own check-out date
/// - `reference_year`: year for checkout dates written without one
///   (`"Sept 11"`); without it such dates are dropped
/// - `source`: defaults to the configured intake source
#[derive(Debug, Clone, Default)]
pub struct StayIntake {
    pub stay_label: String,
    pub default_checkout: Option<String>,
    pub reference_year: Option<i32>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
}

impl StayIntake {
    pub fn new(stay_label: impl Into<String>) -> Self {
        Self { stay_label: stay_label.into(), ..Self::default() }
    }

    pub fn with_default_checkout(mut self, checkout: impl Into<String>) -> Self {
        self.default_checkout = Some(checkout.into());
        self
    }

    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// One guest row, column names match the guest table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestProfile {
    pub stay_id: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub passport_number: String,
    #[serde(default)]
    pub nationality_alpha3: Option<String>,
    #[serde(default)]
    pub issuing_country_alpha3: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub passport_issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub passport_expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub check_out_date: Option<NaiveDate>,
    #[serde(default)]
    pub phone_e164: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: String,
}
