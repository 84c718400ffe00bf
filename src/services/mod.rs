//! Services - parsing and mapping logic
//!
//! This module contains the pure cores and the helpers built on them:
//! - `stay_resolver` - Free-text stay label to canonical stay id
//! - `mrz_parser` - Passport/ID-card machine readable zone decoding
//! - `viz_parser` - Printed-page field extraction from OCR text
//! - `guest` - MRZ/VIZ results to guest-profile rows
//! - `export` - Guest sheet, TM30 sheet and status line
//! - `tour` - Tour video selection per stay
//! - `text` - Shared canonicalization helpers

pub mod export;
pub mod guest;
pub mod mrz_parser;
pub mod stay_resolver;
pub mod text;
pub mod tour;
pub mod viz_parser;

// Re-export commonly used types
pub use guest::{GuestFieldError, GuestRowBuilder};
pub use mrz_parser::MrzError;
pub use stay_resolver::{RoomCatalog, StayIdResolver};
pub use tour::{TourGuide, TourUrls, TourVideo};
pub use viz_parser::VizFields;
