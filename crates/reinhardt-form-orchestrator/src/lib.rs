//! Schema-driven field validation for Reinhardt forms
//!
//! This crate coordinates validation between a declarative schema and the
//! fields a form has mounted:
//! - Dot/bracket paths (`items[2].price`) for reading and writing nested data
//! - Field discovery that expands array groups from the current data
//! - One shared, debounced validation pass per form instead of one per field
//! - Error attribution to the nearest live field and a progress score
//! - A submit flow that always ends in exactly one callback
//!
//! ## Quick Start
//!
//! ```
//! use reinhardt_form_orchestrator::{Form, InputField};
//! use reinhardt_form_orchestrator::schema::{ObjectSchema, SchemaNode};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let schema = ObjectSchema::new(vec![
//!     SchemaNode::object("user", vec![SchemaNode::string("email").required()]),
//! ]);
//! let form = Form::builder(schema)
//!     .data(json!({"user": {}}))
//!     .on_submit(|_data| Ok(()))
//!     .on_submit_error(|_errors, _raw| Ok(()))
//!     .build()
//!     .unwrap();
//!
//! let email = Arc::new(InputField::new("user.email"));
//! form.register_field(email.clone());
//! email.blur();
//!
//! assert_eq!(email.error().as_deref(), Some("user.email is a required field"));
//! ```

pub mod config;
pub mod data;
pub mod debounce;
pub mod error;
pub mod form;
pub mod input;
pub mod path;
pub mod reconcile;
pub mod registry;
pub mod schema;
pub mod walker;

pub use config::FormConfig;
pub use data::FormData;
pub use debounce::DebounceTimer;
pub use error::{
	AggregateValidationError, ConfigurationError, FormError, FormResult, PathError, PathResult,
	ValidationIssue,
};
pub use form::{Form, FormBuilder, SubmitOutcome, ValidationOutcome};
pub use input::InputField;
pub use path::{FieldPath, PathSegment};
pub use reconcile::ErrorMap;
pub use registry::{FieldHandle, FieldRegistry, FieldValidator};
pub use schema::{FormSchema, NodeKind, ObjectSchema, Rule, ScalarType, SchemaNode, ValidateOptions};
pub use walker::{SchemaWalker, WalkVisit};
