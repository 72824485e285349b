//! Error reconciliation
//!
//! Turns a collect-all validation failure into one message per live field and
//! a completion percentage. An error reported at `items[1].name` lands on the
//! longest prefix of that path with a live field, so a row component can
//! still show an error for a sub-field it does not render separately.

use crate::error::AggregateValidationError;
use crate::path;
use crate::registry::FieldRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Path → message, one message per path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert unless `path` already has a message. Returns whether it was kept.
	pub fn insert_first(&mut self, path: impl Into<String>, message: impl Into<String>) -> bool {
		match self.0.entry(path.into()) {
			btree_map::Entry::Vacant(entry) => {
				entry.insert(message.into());
				true
			}
			btree_map::Entry::Occupied(_) => false,
		}
	}

	pub fn get(&self, path: &str) -> Option<&str> {
		self.0.get(path).map(String::as_str)
	}

	pub fn contains(&self, path: &str) -> bool {
		self.0.contains_key(path)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(p, m)| (p.as_str(), m.as_str()))
	}

	pub fn paths(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn into_inner(self) -> BTreeMap<String, String> {
		self.0
	}
}

impl From<BTreeMap<String, String>> for ErrorMap {
	fn from(map: BTreeMap<String, String>) -> Self {
		Self(map)
	}
}

impl FromIterator<(String, String)> for ErrorMap {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		let mut map = Self::new();
		for (path, message) in iter {
			map.insert_first(path, message);
		}
		map
	}
}

/// Attribute each violation to the longest prefix of its path with a live
/// field.
///
/// Violations with no live prefix are dropped.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::{FieldHandle, FieldRegistry, InputField};
/// use reinhardt_form_orchestrator::error::{AggregateValidationError, ValidationIssue};
/// use reinhardt_form_orchestrator::reconcile::distribute;
/// use std::sync::Arc;
///
/// let mut registry = FieldRegistry::new();
/// let row: Arc<dyn FieldHandle> = Arc::new(InputField::new("items[1]"));
/// registry.register_field(&row);
///
/// let failure = AggregateValidationError::new(vec![
///     ValidationIssue::new("items[1].name", "items[1].name is a required field"),
///     ValidationIssue::new("title", "title is a required field"),
/// ]);
///
/// let errors = distribute(&failure, &registry);
/// assert_eq!(errors.get("items[1]"), Some("items[1].name is a required field"));
/// assert!(!errors.contains("title"));
/// ```
pub fn distribute(failure: &AggregateValidationError, registry: &FieldRegistry) -> ErrorMap {
	let mut errors = ErrorMap::new();
	for issue in &failure.errors {
		let target = path::prefixes(&issue.path)
			.into_iter()
			.find(|prefix| registry.is_live(prefix));
		match target {
			Some(target) => {
				errors.insert_first(target, issue.message.clone());
			}
			None => {
				tracing::debug!(
					"Dropping error for '{}' with no live field: {}",
					issue.path,
					issue.message
				);
			}
		}
	}
	errors
}

/// Percentage of live required fields without an error.
///
/// With no required fields the result is all or nothing: 100 when the pass
/// succeeded, 0 otherwise.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::reconcile::{progress, ErrorMap};
///
/// let required = vec!["name".to_string(), "email".to_string()];
/// let errors: ErrorMap = [("email".to_string(), "required".to_string())]
///     .into_iter()
///     .collect();
///
/// assert_eq!(progress(&required, &errors, false), 50.0);
/// assert_eq!(progress(&required, &ErrorMap::new(), true), 100.0);
/// ```
pub fn progress(required: &[String], errors: &ErrorMap, success: bool) -> f64 {
	if required.is_empty() {
		return if success { 100.0 } else { 0.0 };
	}
	let errored = required.iter().filter(|path| errors.contains(path)).count();
	100.0 * (1.0 - errored as f64 / required.len() as f64)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ValidationIssue;
	use crate::input::InputField;
	use crate::registry::FieldHandle;
	use rstest::rstest;
	use std::sync::Arc;

	fn registry_with(paths: &[&str]) -> (FieldRegistry, Vec<Arc<dyn FieldHandle>>) {
		let mut registry = FieldRegistry::new();
		let fields = paths
			.iter()
			.map(|path| {
				let field: Arc<dyn FieldHandle> = Arc::new(InputField::new(*path));
				registry.register_field(&field);
				field
			})
			.collect();
		(registry, fields)
	}

	#[rstest]
	fn test_first_message_per_path_wins() {
		// Arrange
		let (registry, _fields) = registry_with(&["password"]);
		let failure = AggregateValidationError::new(vec![
			ValidationIssue::new("password", "password must be at least 8 characters"),
			ValidationIssue::new("password", "password must match the following: \"\\d\""),
		]);

		// Act
		let errors = distribute(&failure, &registry);

		// Assert
		assert_eq!(errors.len(), 1);
		assert_eq!(
			errors.get("password"),
			Some("password must be at least 8 characters")
		);
	}

	#[rstest]
	fn test_longest_live_prefix_is_chosen() {
		let (registry, _fields) = registry_with(&["items", "items[0]", "items[0].name"]);
		let failure = AggregateValidationError::new(vec![
			ValidationIssue::new("items[0].name", "name missing"),
			ValidationIssue::new("items[0].price", "price missing"),
			ValidationIssue::new("items[3].name", "other row"),
		]);

		let errors = distribute(&failure, &registry);

		assert_eq!(errors.get("items[0].name"), Some("name missing"));
		assert_eq!(errors.get("items[0]"), Some("price missing"));
		assert_eq!(errors.get("items"), Some("other row"));
	}

	#[rstest]
	#[case(&[], false, 0.0)]
	#[case(&[], true, 100.0)]
	#[case(&["a"], false, 75.0)]
	#[case(&["a", "b", "c", "d"], false, 0.0)]
	fn test_progress(#[case] errored: &[&str], #[case] success: bool, #[case] expected: f64) {
		let required: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
		let errors: ErrorMap = errored
			.iter()
			.map(|p| (p.to_string(), "required".to_string()))
			.collect();

		assert_eq!(progress(&required, &errors, success), expected);
	}

	#[rstest]
	#[case(true, 100.0)]
	#[case(false, 0.0)]
	fn test_progress_without_required_fields(#[case] success: bool, #[case] expected: f64) {
		assert_eq!(progress(&[], &ErrorMap::new(), success), expected);
	}

	#[rstest]
	fn test_error_map_serializes_as_object() {
		let errors: ErrorMap = [("name".to_string(), "name is a required field".to_string())]
			.into_iter()
			.collect();

		assert_eq!(
			serde_json::to_value(&errors).unwrap(),
			serde_json::json!({"name": "name is a required field"})
		);
	}
}
