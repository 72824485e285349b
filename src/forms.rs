//! Forms module.
//!
//! This module provides schema-driven validation orchestration for mounted
//! form fields.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reinhardt_formkit::forms::{Form, InputField, path};
//! use reinhardt_formkit::forms::schema::{ObjectSchema, SchemaNode};
//! ```

#[cfg(feature = "forms")]
pub use reinhardt_form_orchestrator::*;
