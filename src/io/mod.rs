//! IO modules - CLI input and output
//!
//! - `input` - Reading stdin, splitting MRZ batches into documents
//! - `egress` - JSON-lines / text output to stdout or a file

pub mod egress;
pub mod input;

// Re-export commonly used types
pub use egress::{open_output, JsonLinesWriter};
pub use input::{read_all, read_lines, split_documents};
