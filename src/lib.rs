//! Profile forms - multi-section form sessions for profile editing
//!
//! A session edits a bounded number of repeatable records (education,
//! experience) inside a tabbed wizard. It tracks unsaved changes under
//! normalized equality, flags tabs holding validation errors and drives the
//! save / save-and-next / save-and-finish flows for create and edit workflows.

pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

pub use error::{ServiceError, TransportError};
pub use session::{FormSessionCoordinator, SaveFlowResult, Services, SessionMode};
