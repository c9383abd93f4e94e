//! Rectangle-based redaction for images and scanned PDFs
//!
//! Regions are drawn over a scaled on-screen rendering of a document,
//! persisted in display space together with the scale factor they were
//! authored under, and re-applied at native resolution when documents are
//! masked, singly or as a batch.

pub mod batch;
pub mod codec;
pub mod domain;
pub mod editor;
pub mod error;
pub mod mask;
pub mod store;

pub use editor::Editor;
pub use error::{Error, Result};
