//! Error kinds raised by the orchestrator.
//!
//! Only [`ConfigurationError`] and [`FormError::SubmitCallback`] ever reach a
//! caller of [`Form`](crate::Form). Path errors are logged and turned into
//! no-ops at the form layer, and [`AggregateValidationError`] is normal
//! control flow that ends up in an [`ErrorMap`](crate::ErrorMap).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a path string cannot be used to read or write data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	#[error("Malformed path '{path}': {reason}")]
	Syntax { path: String, reason: String },
	#[error("Refusing to write through frozen node at '{0}'")]
	Frozen(String),
	#[error("Cannot address '{segment}' in '{path}': {reason}")]
	TypeMismatch {
		path: String,
		segment: String,
		reason: String,
	},
}

pub type PathResult<T> = Result<T, PathError>;

/// A malformed schema or incomplete form setup.
///
/// These are programmer errors and are reported by
/// [`FormBuilder::build`](crate::FormBuilder::build), never during validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
	#[error("Schema root must be an object node, found {0}")]
	RootNotObject(String),
	#[error("Schema node under '{parent}' has an empty name")]
	EmptyName { parent: String },
	#[error("Schema node name '{name}' contains path syntax characters")]
	InvalidName { name: String },
	#[error("Duplicate schema node '{name}' under '{parent}'")]
	DuplicateName { parent: String, name: String },
	#[error("Scalar schema node '{0}' cannot declare children")]
	ScalarWithChildren(String),
	#[error("Schema nesting exceeds {max} levels at '{path}'")]
	TooDeep { path: String, max: usize },
	#[error("Schema interface version {found} is not supported (expected {expected})")]
	UnsupportedVersion { found: u32, expected: u32 },
	#[error("Missing required callback: {0}")]
	MissingCallback(&'static str),
}

/// A single violated path reported by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
	pub path: String,
	pub message: String,
}

impl ValidationIssue {
	pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			message: message.into(),
		}
	}
}

/// Every violation found by a collect-all validation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregateValidationError {
	pub errors: Vec<ValidationIssue>,
}

impl AggregateValidationError {
	pub fn new(errors: Vec<ValidationIssue>) -> Self {
		Self { errors }
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}
}

impl fmt::Display for AggregateValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.errors.len() {
			1 => write!(f, "{}", self.errors[0].message),
			n => write!(f, "{} errors occurred", n),
		}
	}
}

impl std::error::Error for AggregateValidationError {}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Form configuration error: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Path error: {0}")]
	Path(#[from] PathError),
	#[error("Submit handler failed: {0}")]
	SubmitCallback(#[source] anyhow::Error),
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_aggregate_display_single_error() {
		// Arrange
		let error = AggregateValidationError::new(vec![ValidationIssue::new(
			"message",
			"message is a required field",
		)]);

		// Act & Assert
		assert_eq!(error.to_string(), "message is a required field");
	}

	#[rstest]
	fn test_aggregate_display_counts_errors() {
		let error = AggregateValidationError::new(vec![
			ValidationIssue::new("a", "a is a required field"),
			ValidationIssue::new("b", "b is a required field"),
		]);

		assert_eq!(error.to_string(), "2 errors occurred");
		assert_eq!(error.len(), 2);
	}

	#[rstest]
	fn test_configuration_error_converts_into_form_error() {
		let error: FormError = ConfigurationError::MissingCallback("on_submit").into();

		assert!(matches!(
			error,
			FormError::Configuration(ConfigurationError::MissingCallback("on_submit"))
		));
	}
}
