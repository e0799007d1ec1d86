//! Terminal preview of the classroom layout.
//!
//! Drawn at most once per turn, between extraction and feedback.

mod classroom;
mod theme;

pub use classroom::{ClassroomView, show};
