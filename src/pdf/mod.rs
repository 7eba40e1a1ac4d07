//! Drawing surfaces.
//!
//! This module provides:
//! - A lopdf-backed surface that writes letter-size PDF documents
//! - WinAnsi text encoding shared by built-in and embedded fonts
//! - A recording surface for dry runs and tests

pub mod encoding;
mod recording;
mod writer;

pub use recording::*;
pub use writer::*;
