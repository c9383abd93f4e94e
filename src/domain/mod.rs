//! Pure domain types with minimal dependencies
//!
//! Types here carry no I/O or rendering concerns so every other module can
//! use them without cycles.

pub mod geometry;
pub mod region;

pub use geometry::*;
pub use region::*;
