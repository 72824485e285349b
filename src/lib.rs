//! # Reinhardt Formkit
//!
//! Schema-driven form validation for Reinhardt front ends.
//!
//! A form built here owns the fields that are currently mounted, discovers
//! them by walking a declarative schema (expanding repeated array groups from
//! the live data), validates on a single debounced timer, and routes each
//! error to the closest field that can display it.
//!
//! ## Feature Flags
//!
//! - `forms` (default) - The form orchestrator
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```
//! use reinhardt_formkit::{Form, InputField, ObjectSchema, SchemaNode, SubmitOutcome};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let schema = ObjectSchema::new(vec![SchemaNode::string("message").required()]);
//! let form = Form::builder(schema)
//!     .on_submit(|_data| Ok(()))
//!     .on_submit_error(|_errors, _raw| Ok(()))
//!     .build()
//!     .unwrap();
//!
//! let message = Arc::new(InputField::new("message"));
//! form.register_field(message.clone());
//!
//! assert!(matches!(form.submit_form().unwrap(), SubmitOutcome::Rejected(_)));
//! assert_eq!(message.error().as_deref(), Some("message is a required field"));
//! ```

#[cfg(feature = "forms")]
pub mod forms;

// Re-export forms (forms feature)
#[cfg(feature = "forms")]
pub use reinhardt_form_orchestrator::{
	ErrorMap, FieldHandle, Form, FormBuilder, FormConfig, FormError, FormResult, FormSchema,
	InputField, ObjectSchema, Rule, SchemaNode, SubmitOutcome, ValidationOutcome,
};
