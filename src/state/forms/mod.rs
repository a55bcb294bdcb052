//! Form domain layer
//!
//! Sections of repeatable sub-entries and the declared layout that bounds them.

mod field;
mod form_state;

pub use field::SubEntry;
pub use form_state::{FormLayout, FormState, SectionSpec};
