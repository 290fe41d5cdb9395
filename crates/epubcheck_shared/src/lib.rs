//! Shared code for the EPUBCheck CSS crates
//!
//! Holds the decoded character stream the scanner reads from, text locations and the error type
//! that aborts a scan or parse.

pub mod byte_stream;
pub mod errors;
