//! MRZ (Machine Readable Zone) parsing
//!
//! Decodes TD3 passports (2 x 44) and TD1 ID cards (3 x 30) into an
//! `MrzRecord`. OCR output is rarely perfect, so the parser is lenient:
//! - passport-shaped input (`P<...`) that fails the strict TD3 shape is
//!   still parsed as format `passport`
//! - a short TD3 line 2 shifts the columns after the document number left
//!   by the missing length (see `TD3_LINE2_COLUMNS`)
//! - unreadable fields become `None`/empty instead of failing the record
//!
//! Parsing never panics. Structural failures are returned as
//! `valid: false` with an error message.
//!
//! NOTE: the short-line shift is a compatibility shim for OCR-truncated
//! lines, not part of ICAO 9303. It assumes the characters went missing
//! before the birth date (typically the document-number check digit).

use crate::domain::{Gender, MrzFormat, MrzRecord};
use regex::Regex;
use std::sync::LazyLock;

/// Nominal TD3 line length
pub const TD3_LINE_LEN: usize = 44;

/// TD1 line length
pub const TD1_LINE_LEN: usize = 30;

/// Two-digit years up to and including this value are 20xx, the rest 19xx
pub const CENTURY_PIVOT: u32 = 30;

static TD1_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9<]{30}$").expect("valid regex"));

static TD3_LINE1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P<[A-Z<]{3}[A-Z<]{25,39}$").expect("valid regex"));

static TD3_LINE2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9<]{44}$").expect("valid regex"));

/// Internal structural failures, surfaced as `MRZ parsing failed: ...`
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MrzError {
    #[error("line {line} too short ({len} of {need} characters)")]
    LineTooShort { line: usize, len: usize, need: usize },
    #[error("line {line} missing")]
    MissingLine { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    DocumentNumber,
    Nationality,
    Birthdate,
    Gender,
    Expiry,
}

/// One fixed-width field on an MRZ line
#[derive(Debug, Clone, Copy)]
struct Column {
    field: Field,
    /// Nominal start on a full-length line
    start: usize,
    width: usize,
    /// Start moves left by the short-line offset
    shifts: bool,
    /// Value ends at the first filler; a partial read is accepted
    filler_terminated: bool,
}

impl Column {
    const fn new(field: Field, start: usize, width: usize) -> Self {
        Self { field, start, width, shifts: true, filler_terminated: false }
    }

    const fn anchored(mut self) -> Self {
        self.shifts = false;
        self
    }

    const fn filler_terminated(mut self) -> Self {
        self.filler_terminated = true;
        self
    }

    /// Read this column from `line`, `None` when the line is too short
    fn read<'a>(&self, line: &'a str, offset: usize) -> Option<&'a str> {
        let start = if self.shifts { self.start.checked_sub(offset)? } else { self.start };
        let mut end = start + self.width;
        if end > line.len() {
            if !self.filler_terminated || start >= line.len() {
                return None;
            }
            end = line.len();
        }
        let raw = line.get(start..end)?;
        if self.filler_terminated {
            let value = raw.split('<').next().unwrap_or("");
            return (!value.is_empty()).then_some(value);
        }
        Some(raw)
    }
}

/// TD3 line 2 layout (ICAO 9303 part 4), nominal 44-character positions
const TD3_LINE2_COLUMNS: [Column; 5] = [
    Column::new(Field::DocumentNumber, 0, 9).anchored().filler_terminated(),
    Column::new(Field::Nationality, 10, 3),
    Column::new(Field::Birthdate, 13, 6),
    Column::new(Field::Gender, 20, 1),
    Column::new(Field::Expiry, 21, 6),
];

/// TD1 line 1: document number (issuing country is read with the name)
const TD1_LINE1_COLUMNS: [Column; 1] =
    [Column::new(Field::DocumentNumber, 5, 9).anchored().filler_terminated()];

/// TD1 line 2 layout
const TD1_LINE2_COLUMNS: [Column; 4] = [
    Column::new(Field::Birthdate, 0, 6).anchored(),
    Column::new(Field::Gender, 7, 1).anchored(),
    Column::new(Field::Expiry, 8, 6).anchored(),
    Column::new(Field::Nationality, 15, 3).anchored(),
];

/// Parse a newline-separated MRZ string
pub fn parse(mrz: &str) -> MrzRecord {
    let lines = normalize(mrz);
    if lines.is_empty() {
        return MrzRecord::failure(MrzFormat::Unknown, "Invalid MRZ string");
    }

    let format = detect_format(&lines);
    let result = match format {
        MrzFormat::TD1 => parse_td1(&lines),
        MrzFormat::TD3 | MrzFormat::Passport => parse_td3(&lines, format),
        MrzFormat::Unknown => {
            return MrzRecord::failure(MrzFormat::Unknown, "Unrecognized MRZ format");
        }
    };

    result.unwrap_or_else(|e| MrzRecord::failure(format, format!("MRZ parsing failed: {e}")))
}

/// Parse MRZ lines supplied separately (e.g. a `[line1, line2]` pair)
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> MrzRecord {
    let joined: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    parse(&joined.join("\n"))
}

/// Expand a two-digit MRZ year with the fixed century pivot
pub fn expand_year(yy: u32) -> u32 {
    if yy <= CENTURY_PIVOT {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// Decode `YYMMDD` to ISO `YYYY-MM-DD`
///
/// Only the ranges month 1-12 and day 1-31 are checked.
pub fn decode_date(yymmdd: &str) -> Option<String> {
    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: u32 = yymmdd[0..2].parse().ok()?;
    let month: u32 = yymmdd[2..4].parse().ok()?;
    let day: u32 = yymmdd[4..6].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{:04}-{:02}-{:02}", expand_year(yy), month, day))
}

/// Trim, drop intra-line whitespace, upper-case, keep newlines as line breaks
///
/// Non-ASCII characters (OCR noise) become fillers so that every character
/// still occupies exactly one column. A single unbroken line of exactly two
/// TD3 or three TD1 lines is split back into its lines.
fn normalize(mrz: &str) -> Vec<String> {
    let mut lines: Vec<String> = mrz
        .trim()
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { '<' })
                .collect::<String>()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() == 1 {
        let single = &lines[0];
        let width = match single.len() {
            n if n == 2 * TD3_LINE_LEN && single.starts_with("P<") => Some(TD3_LINE_LEN),
            n if n == 3 * TD1_LINE_LEN && !single.starts_with("P<") => Some(TD1_LINE_LEN),
            _ => None,
        };
        if let Some(width) = width {
            lines = single.as_bytes().chunks(width).map(|c| String::from_utf8_lossy(c).into_owned()).collect();
        }
    }
    lines
}

fn detect_format(lines: &[String]) -> MrzFormat {
    if lines.len() == 3 && lines.iter().all(|l| TD1_LINE_RE.is_match(l)) {
        return MrzFormat::TD1;
    }
    if lines.len() >= 2 && TD3_LINE1_RE.is_match(&lines[0]) && TD3_LINE2_RE.is_match(&lines[1]) {
        return MrzFormat::TD3;
    }
    if lines[0].starts_with("P<") {
        return MrzFormat::Passport;
    }
    MrzFormat::Unknown
}

fn parse_td3(lines: &[String], format: MrzFormat) -> Result<MrzRecord, MrzError> {
    let line1 = &lines[0];
    if line1.len() < 5 {
        return Err(MrzError::LineTooShort { line: 1, len: line1.len(), need: 5 });
    }

    let mut record = MrzRecord::empty(format);
    record.issuing_country = strip_filler(&line1[2..5]);
    let (last, first) = split_name_field(&line1[5..]);
    record.last_name = last;
    record.first_name = first;

    if let Some(line2) = lines.get(1) {
        let offset = TD3_LINE_LEN.saturating_sub(line2.len());
        apply_columns(&mut record, &TD3_LINE2_COLUMNS, line2, offset);
    }
    Ok(record)
}

fn parse_td1(lines: &[String]) -> Result<MrzRecord, MrzError> {
    let line1 = lines.first().ok_or(MrzError::MissingLine { line: 1 })?;
    let line2 = lines.get(1).ok_or(MrzError::MissingLine { line: 2 })?;
    let line3 = lines.get(2).ok_or(MrzError::MissingLine { line: 3 })?;
    for (i, line) in [line1, line2, line3].into_iter().enumerate() {
        if line.len() < TD1_LINE_LEN {
            return Err(MrzError::LineTooShort { line: i + 1, len: line.len(), need: TD1_LINE_LEN });
        }
    }

    let mut record = MrzRecord::empty(MrzFormat::TD1);
    record.issuing_country = strip_filler(&line1[2..5]);
    apply_columns(&mut record, &TD1_LINE1_COLUMNS, line1, 0);
    apply_columns(&mut record, &TD1_LINE2_COLUMNS, line2, 0);
    let (last, first) = split_name_field(line3);
    record.last_name = last;
    record.first_name = first;
    Ok(record)
}

fn apply_columns(record: &mut MrzRecord, columns: &[Column], line: &str, offset: usize) {
    for column in columns {
        let value = column.read(line, offset);
        match column.field {
            Field::DocumentNumber => record.passport_number = value.unwrap_or("").to_string(),
            Field::Nationality => {
                record.nationality = value.map(strip_filler).filter(|n| !n.is_empty());
            }
            Field::Birthdate => record.birthdate = value.and_then(decode_date),
            Field::Gender => {
                record.gender = value.and_then(|v| v.chars().next()).and_then(Gender::from_mrz_char);
            }
            Field::Expiry => record.expiry_date = value.and_then(decode_date),
        }
    }
}

/// Split a name field on the first `<<` into (surname, given names)
///
/// Must run on the raw field: once fillers become spaces the boundary
/// between the two groups is gone.
fn split_name_field(field: &str) -> (String, String) {
    let mut groups = field.split("<<");
    let surname = groups.next().unwrap_or("");
    let given = groups.find(|g| !g.trim_matches('<').is_empty()).unwrap_or("");
    (fillers_to_spaces(surname), fillers_to_spaces(given))
}

fn fillers_to_spaces(group: &str) -> String {
    group.split('<').filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}

fn strip_filler(value: &str) -> String {
    value.chars().filter(|&c| c != '<').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARLOES: &str = "P<NLDVELEMA<<MARLOES<<<<<<<<<<<<<<<<<<<<<<<<<\nNX56DD9L50NLD7202010F3506189<<<<<<<<<<<<<<00";
    const SANNE: &str = "P<NLDVELEMA<<SANNE<LISA<<<<<<<<<<<<<<<<<<<<<<\nNMC7P6575NLD1406012F2908074<<<<<<<<<<<<<<06";

    #[test]
    fn test_passport_sample() {
        let record = parse(MARLOES);
        assert!(record.valid);
        assert_eq!(record.error, None);
        assert_eq!(record.issuing_country, "NLD");
        assert_eq!(record.last_name, "VELEMA");
        assert_eq!(record.first_name, "MARLOES");
        assert_eq!(record.passport_number, "NX56DD9L5");
        assert_eq!(record.nationality.as_deref(), Some("NLD"));
        assert_eq!(record.gender, Some(Gender::F));
        assert_eq!(record.birthdate.as_deref(), Some("1972-02-01"));
        assert_eq!(record.expiry_date.as_deref(), Some("1935-06-18"));
    }

    #[test]
    fn test_short_line_two_offset() {
        // 43 characters: the document-number check digit is missing
        let record = parse(SANNE);
        assert!(record.valid);
        assert_eq!(record.first_name, "SANNE LISA");
        assert_eq!(record.passport_number, "NMC7P6575");
        assert_eq!(record.nationality.as_deref(), Some("NLD"));
        assert_eq!(record.birthdate.as_deref(), Some("2014-06-01"));
        assert_eq!(record.gender, Some(Gender::F));
        assert_eq!(record.expiry_date.as_deref(), Some("2029-08-07"));
    }

    #[test]
    fn test_strict_td3_detection() {
        let line1 = format!("P<UTOERIKSSON<<ANNA<MARIA{}", "<".repeat(19));
        let line2 = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";
        assert_eq!(line1.len(), 44);
        let record = parse(&format!("{line1}\n{line2}"));
        assert_eq!(record.format, MrzFormat::TD3);
        assert_eq!(record.issuing_country, "UTO");
        assert_eq!(record.last_name, "ERIKSSON");
        assert_eq!(record.first_name, "ANNA MARIA");
        assert_eq!(record.passport_number, "L898902C3");
        assert_eq!(record.birthdate.as_deref(), Some("1974-08-12"));
        assert_eq!(record.expiry_date.as_deref(), Some("2012-04-15"));
    }

    #[test]
    fn test_td1_card() {
        let mrz = "I<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        let record = parse(mrz);
        assert_eq!(record.format, MrzFormat::TD1);
        assert!(record.valid);
        assert_eq!(record.issuing_country, "UTO");
        assert_eq!(record.passport_number, "D23145890");
        assert_eq!(record.birthdate.as_deref(), Some("1974-08-12"));
        assert_eq!(record.gender, Some(Gender::F));
        assert_eq!(record.expiry_date.as_deref(), Some("2012-04-15"));
        assert_eq!(record.nationality.as_deref(), Some("UTO"));
        assert_eq!(record.last_name, "ERIKSSON");
        assert_eq!(record.first_name, "ANNA MARIA");
    }

    #[test]
    fn test_empty_input() {
        let record = parse("");
        assert!(!record.valid);
        assert_eq!(record.error.as_deref(), Some("Invalid MRZ string"));

        let record = parse(" \n \t ");
        assert!(!record.valid);
        assert_eq!(record.error.as_deref(), Some("Invalid MRZ string"));
    }

    #[test]
    fn test_unknown_format() {
        let record = parse("not an mrz");
        assert!(!record.valid);
        assert_eq!(record.format, MrzFormat::Unknown);
        assert_eq!(record.error.as_deref(), Some("Unrecognized MRZ format"));
    }

    #[test]
    fn test_line_one_too_short_is_parse_failure() {
        let record = parse("P<NL");
        assert!(!record.valid);
        assert_eq!(record.format, MrzFormat::Passport);
        assert_eq!(
            record.error.as_deref(),
            Some("MRZ parsing failed: line 1 too short (4 of 5 characters)")
        );
    }

    #[test]
    fn test_missing_line_two_degrades() {
        let record = parse("P<NLDVELEMA<<MARLOES<<<<<<<<<<<<<<<<<<<<<<<<<");
        assert!(record.valid);
        assert_eq!(record.format, MrzFormat::Passport);
        assert_eq!(record.last_name, "VELEMA");
        assert_eq!(record.passport_number, "");
        assert_eq!(record.birthdate, None);
        assert_eq!(record.gender, None);
    }

    #[test]
    fn test_very_short_line_two_degrades() {
        let record = parse("P<NLDVELEMA<<MARLOES\nNX56");
        assert!(record.valid);
        assert_eq!(record.passport_number, "NX56");
        assert_eq!(record.nationality, None);
        assert_eq!(record.birthdate, None);
        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn test_invalid_gender_and_dates_are_none() {
        let record = parse("P<NLDVELEMA<<MARLOES\nNX56DD9L50NLD7213450<3599999<<<<<<<<<<<<<<<00");
        assert!(record.valid);
        assert_eq!(record.gender, None);
        assert_eq!(record.birthdate, None);
        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn test_whitespace_and_case_normalized() {
        let noisy = "  p<nld velema<<marloes<<<<<<<<<<<<<<<<<<<<<<<<<\r\n NX56DD9L50NLD7202010F3506189<<<<<<<<<<<<<<00  ";
        let record = parse(noisy);
        assert_eq!(record.last_name, "VELEMA");
        assert_eq!(record.birthdate.as_deref(), Some("1972-02-01"));
    }

    #[test]
    fn test_single_line_pair_is_split() {
        let line1 = format!("P<UTOERIKSSON<<ANNA<MARIA{}", "<".repeat(19));
        let joined = format!("{line1}L898902C36UTO7408122F1204159ZE184226B<<<<<10");
        let record = parse(&joined);
        assert_eq!(record.format, MrzFormat::TD3);
        assert_eq!(record.first_name, "ANNA MARIA");
        assert_eq!(record.gender, Some(Gender::F));
    }

    #[test]
    fn test_compound_surname_keeps_space() {
        let record = parse("P<ISRTADMOR<ELIYA<<JONATHAN<<<<<<<<<<<<<<<<<<<<<<\n37439136<4ISR7004144M33052340<2775226<8<<<38");
        assert_eq!(record.last_name, "TADMOR ELIYA");
        assert_eq!(record.first_name, "JONATHAN");
        assert_eq!(record.passport_number, "37439136");
        assert_eq!(record.gender, Some(Gender::M));
        assert_eq!(record.birthdate.as_deref(), Some("1970-04-14"));
        assert_eq!(record.expiry_date.as_deref(), Some("1933-05-23"));
    }

    #[test]
    fn test_parse_lines() {
        let record = parse_lines(&[
            "P<NLDVELEMA<<MARLOES<<<<<<<<<<<<<<<<<<<<<<<<<",
            "NX56DD9L50NLD7202010F3506189<<<<<<<<<<<<<<00",
        ]);
        assert_eq!(record, parse(MARLOES));
    }

    #[test]
    fn test_expand_year_pivot() {
        assert_eq!(expand_year(0), 2000);
        assert_eq!(expand_year(30), 2030);
        assert_eq!(expand_year(31), 1931);
        assert_eq!(expand_year(99), 1999);
    }

    #[test]
    fn test_decode_date() {
        assert_eq!(decode_date("720201").as_deref(), Some("1972-02-01"));
        assert_eq!(decode_date("301231").as_deref(), Some("2030-12-31"));
        assert_eq!(decode_date("721301"), None);
        assert_eq!(decode_date("720200"), None);
        assert_eq!(decode_date("72020"), None);
        assert_eq!(decode_date("72O201"), None);
    }

    #[test]
    fn test_split_name_field() {
        assert_eq!(
            split_name_field("VELEMA<<SANNE<LISA<<<<"),
            ("VELEMA".to_string(), "SANNE LISA".to_string())
        );
        assert_eq!(split_name_field("MADONNA<<<<<<"), ("MADONNA".to_string(), String::new()));
        assert_eq!(split_name_field("VELEMA"), ("VELEMA".to_string(), String::new()));
        // Only the first given-name group is kept
        assert_eq!(
            split_name_field("SMITH<<JOHN<<PAUL<<<"),
            ("SMITH".to_string(), "JOHN".to_string())
        );
    }

    #[test]
    fn test_non_ascii_noise_keeps_columns() {
        let record = parse("P<NLDVELEMA<<MARLOES\nNX56DD9L5ÖNLD7202010F3506189<<<<<<<<<<<<<<00");
        assert_eq!(record.birthdate.as_deref(), Some("1972-02-01"));
        assert_eq!(record.gender, Some(Gender::F));
    }
}
