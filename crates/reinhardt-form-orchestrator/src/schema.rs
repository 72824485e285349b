//! Schema contract
//!
//! The orchestrator consumes any schema that can validate a whole data tree
//! in one collect-all run, cast values, and expose its field tree as
//! [`SchemaNode`]s. [`ObjectSchema`] is the built-in implementation.

pub mod node;
pub mod object;
pub mod rules;

pub use node::{MAX_SCHEMA_DEPTH, NodeKind, ScalarType, SchemaNode};
pub use object::{DEFAULT_REQUIRED_MESSAGE, ObjectSchema};
pub use rules::Rule;

use crate::config::FormConfig;
use crate::error::{AggregateValidationError, ConfigurationError};
use serde_json::Value;

/// Version of the [`FormSchema`] contract this crate understands.
pub const SCHEMA_INTERFACE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidateOptions {
	/// Stop at the first violation instead of collecting all of them.
	pub abort_early: bool,
}

impl ValidateOptions {
	pub fn collect_all() -> Self {
		Self { abort_early: false }
	}
}

/// A schema the form can orchestrate.
pub trait FormSchema: Send + Sync {
	/// Top of the field tree. Must be an object node.
	fn root(&self) -> &SchemaNode;

	fn interface_version(&self) -> u32 {
		SCHEMA_INTERFACE_VERSION
	}

	/// Validate `data`, returning the cast value or every violation found.
	fn validate_sync(
		&self,
		data: &Value,
		options: ValidateOptions,
	) -> Result<Value, AggregateValidationError>;

	fn cast(&self, data: &Value) -> Value;

	/// Adopt form-level settings before the form is built. No-op by default.
	fn apply_config(&mut self, _config: &FormConfig) {}

	/// Structural checks run once when a form is built.
	fn check(&self) -> Result<(), ConfigurationError> {
		let found = self.interface_version();
		if found != SCHEMA_INTERFACE_VERSION {
			return Err(ConfigurationError::UnsupportedVersion {
				found,
				expected: SCHEMA_INTERFACE_VERSION,
			});
		}
		self.root().check_root()
	}
}
