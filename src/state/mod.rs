//! Form session state module

mod dirty;
mod forms;
mod normalize;
mod section_errors;

pub use dirty::DirtyTracker;
pub use forms::*;
pub use normalize::{is_blank, is_empty_entry, normalize, normalize_value, normalized_eq};
pub use section_errors::{FieldError, SectionErrorAggregator, SectionErrorMap};
