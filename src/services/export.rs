//! Tab-separated exports of guest rows
//!
//! - plain guest sheet (one row per guest of a stay)
//! - TM30 immigration sheet: ASCII-folded names, `DD/MM/YYYY` dates,
//!   guests without a passport number left out
//! - the short status line shown to staff while passports come in

use crate::domain::GuestProfile;
use crate::services::text::{collapse_whitespace, strip_diacritics};
use chrono::NaiveDate;

pub const GUEST_HEADER: [&str; 7] = [
    "First Name",
    "Middle Name",
    "Last Name",
    "Gender",
    "Passport Number",
    "Nationality",
    "Birthday",
];

pub const TM30_HEADER: [&str; 9] = [
    "First Name *",
    "Middle Name",
    "Last Name",
    "Gender *",
    "Passport No. *",
    "Nationality *",
    "Birth Date (DD/MM/YYYY)",
    "Check-out Date (DD/MM/YYYY)",
    "Phone No.",
];

/// Tabs and line breaks inside a cell would shift columns
fn cell(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

fn join_row<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells.into_iter().map(|c| cell(c.as_ref())).collect::<Vec<_>>().join("\t")
}

/// One guest-sheet row; birthday stays ISO
pub fn guest_row(guest: &GuestProfile) -> String {
    join_row([
        guest.first_name.clone(),
        guest.middle_name.clone().unwrap_or_default(),
        guest.last_name.clone(),
        guest.gender.map(|g| g.to_string()).unwrap_or_default(),
        guest.passport_number.clone(),
        guest.nationality_alpha3.clone().unwrap_or_default(),
        guest.birthday.map(|d| d.to_string()).unwrap_or_default(),
    ])
}

/// Header plus one row per guest, newline-terminated
pub fn export_guests(guests: &[GuestProfile]) -> String {
    let mut out = join_row(GUEST_HEADER);
    out.push('\n');
    for guest in guests {
        out.push_str(&guest_row(guest));
        out.push('\n');
    }
    out
}

/// Fold a name for the TM30 form: no diacritics, dashes to spaces
pub fn sanitize_tm30_name(name: &str) -> String {
    let folded = strip_diacritics(name).replace(['-', '\u{2013}', '\u{2014}'], " ");
    collapse_whitespace(&folded)
}

fn dmy(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// One TM30 row in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tm30Row {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub passport_number: String,
    pub nationality: String,
    pub birth_date: String,
    pub check_out_date: String,
    pub phone: String,
}

impl Tm30Row {
    pub fn from_guest(guest: &GuestProfile) -> Self {
        Self {
            first_name: sanitize_tm30_name(&guest.first_name),
            middle_name: sanitize_tm30_name(guest.middle_name.as_deref().unwrap_or_default()),
            last_name: sanitize_tm30_name(&guest.last_name),
            gender: guest.gender.map(|g| g.to_string()).unwrap_or_default(),
            passport_number: guest.passport_number.trim().to_string(),
            nationality: guest.nationality_alpha3.clone().unwrap_or_default(),
            birth_date: dmy(guest.birthday),
            check_out_date: dmy(guest.check_out_date),
            phone: guest.phone_e164.clone().unwrap_or_default(),
        }
    }

    pub fn to_tsv(&self) -> String {
        join_row([
            &self.first_name,
            &self.middle_name,
            &self.last_name,
            &self.gender,
            &self.passport_number,
            &self.nationality,
            &self.birth_date,
            &self.check_out_date,
            &self.phone,
        ])
    }
}

/// TM30 sheet; guests without a passport number are skipped
pub fn export_tm30(guests: &[GuestProfile]) -> String {
    let mut out = join_row(TM30_HEADER);
    out.push('\n');
    for guest in guests.iter().filter(|g| !g.passport_number.trim().is_empty()) {
        out.push_str(&Tm30Row::from_guest(guest).to_tsv());
        out.push('\n');
    }
    out
}

/// Progress line for a stay
///
/// An unknown or zero total prints as `?`.
pub fn status_line(received: u32, total: Option<u32>) -> String {
    match total.filter(|t| *t > 0) {
        Some(total) if received >= total => "✅ All received".to_string(),
        Some(total) => format!("{received} of {total} passports received 📸"),
        None => format!("{received} of ? passports received 📸"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;

    fn guest() -> GuestProfile {
        GuestProfile {
            stay_id: "A4_Muller".to_string(),
            first_name: "José".to_string(),
            middle_name: Some("Marie-Claire".to_string()),
            last_name: "Müller–Lüdenscheid".to_string(),
            gender: Some(Gender::M),
            passport_number: "X1234567".to_string(),
            nationality_alpha3: Some("DEU".to_string()),
            issuing_country_alpha3: Some("DEU".to_string()),
            birthday: NaiveDate::from_ymd_opt(1985, 6, 17),
            passport_issue_date: None,
            passport_expiry_date: None,
            check_out_date: NaiveDate::from_ymd_opt(2025, 9, 11),
            phone_e164: Some("+4915112345678".to_string()),
            notes: None,
            source: "mrz_batch".to_string(),
        }
    }

    #[test]
    fn test_export_guests() {
        let out = export_guests(&[guest()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "First Name\tMiddle Name\tLast Name\tGender\tPassport Number\tNationality\tBirthday"
        );
        assert_eq!(lines[1], "José\tMarie-Claire\tMüller–Lüdenscheid\tM\tX1234567\tDEU\t1985-06-17");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_export_guests_empty() {
        assert_eq!(export_guests(&[]).lines().count(), 1);
    }

    #[test]
    fn test_sanitize_tm30_name() {
        assert_eq!(sanitize_tm30_name("Müller–Lüdenscheid"), "Muller Ludenscheid");
        assert_eq!(sanitize_tm30_name("  Marie-Claire  "), "Marie Claire");
        assert_eq!(sanitize_tm30_name("Øberg"), "Oberg");
        assert_eq!(sanitize_tm30_name(""), "");
    }

    #[test]
    fn test_tm30_row() {
        let row = Tm30Row::from_guest(&guest());
        assert_eq!(row.first_name, "Jose");
        assert_eq!(row.middle_name, "Marie Claire");
        assert_eq!(row.last_name, "Muller Ludenscheid");
        assert_eq!(row.birth_date, "17/06/1985");
        assert_eq!(row.check_out_date, "11/09/2025");
        assert_eq!(
            row.to_tsv(),
            "Jose\tMarie Claire\tMuller Ludenscheid\tM\tX1234567\tDEU\t17/06/1985\t11/09/2025\t+4915112345678"
        );
    }

    #[test]
    fn test_tm30_skips_missing_passport() {
        let mut without = guest();
        without.passport_number = "  ".to_string();
        let out = export_tm30(&[guest(), without]);
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("First Name *\t"));
    }

    #[test]
    fn test_cells_never_split_columns() {
        let mut g = guest();
        g.first_name = "Jo\tse".to_string();
        assert_eq!(guest_row(&g).split('\t').count(), GUEST_HEADER.len());
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(0, None), "0 of ? passports received 📸");
        assert_eq!(status_line(2, Some(0)), "2 of ? passports received 📸");
        assert_eq!(status_line(1, Some(3)), "1 of 3 passports received 📸");
        assert_eq!(status_line(3, Some(3)), "✅ All received");
        assert_eq!(status_line(4, Some(3)), "✅ All received");
    }
}
