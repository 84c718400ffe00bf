//! Domain models - value types shared by the parsers and the CLI
//!
//! - `RoomCode`, `StayResolution` - stay-id resolver output
//! - `MrzRecord`, `MrzFormat` - decoded machine readable zone
//! - `GuestProfile`, `StayIntake` - guest rows and the request that builds them
//! - `Gender` - holder sex as printed on the document

pub mod guest;
pub mod mrz;
pub mod types;

pub use guest::{GuestProfile, StayIntake};
pub use mrz::{MrzFormat, MrzRecord};
pub use types::{Gender, RoomCode, StayResolution};
