//! coco-passport library
//!
//! Exposes the parsers and mapping services for the CLI and for
//! integration testing.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
