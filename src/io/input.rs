//! Reading documents from stdin or any buffered reader

use anyhow::Context;
use std::io::{BufRead, Read};

/// Split text into blocks separated by one or more blank lines
///
/// Used for batches of MRZ scans: each block is one document. Lines are
/// kept as-is apart from a trailing `\r`.
pub fn split_documents(text: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(|l| l.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                documents.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        documents.push(current.join("\n"));
    }
    documents
}

/// Read the whole input into a string
pub fn read_all<R: Read>(mut reader: R) -> anyhow::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text).context("Failed to read input")?;
    Ok(text)
}

/// Non-blank input lines, trimmed
pub fn read_lines<R: BufRead>(reader: R) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}", i + 1))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}
