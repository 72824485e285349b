//! Form data snapshots
//!
//! [`FormData`] wraps the JSON tree a form is editing together with the set of
//! frozen paths: subtrees handed in by the caller that path writes must not
//! go through. Snapshots are plain clones, so a validation pass never touches
//! the caller's value.

use crate::error::{PathError, PathResult};
use crate::path::FieldPath;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormData {
	value: Value,
	frozen: Vec<FieldPath>,
}

impl FormData {
	/// Wrap an existing value.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::FormData;
	/// use serde_json::json;
	///
	/// let data = FormData::new(json!({"user": {"email": "a@example.com"}}));
	/// assert_eq!(data.get("user.email"), Some(&json!("a@example.com")));
	/// ```
	pub fn new(value: Value) -> Self {
		Self {
			value,
			frozen: Vec::new(),
		}
	}

	/// An empty object.
	pub fn empty() -> Self {
		Self::new(Value::Object(serde_json::Map::new()))
	}

	pub fn value(&self) -> &Value {
		&self.value
	}

	pub fn into_value(self) -> Value {
		self.value
	}

	pub fn is_object(&self) -> bool {
		self.value.is_object()
	}

	pub fn get(&self, path: &str) -> Option<&Value> {
		crate::path::get(path, &self.value)
	}

	/// Write `value` at `path`.
	///
	/// Writes at, below or above a frozen path are refused unless `force` is
	/// set.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::FormData;
	/// use serde_json::json;
	///
	/// let mut data = FormData::new(json!({"user": {"name": "Ann"}}));
	/// data.freeze("user").unwrap();
	///
	/// assert!(data.set("user.name", json!("Bob"), false).is_err());
	/// assert!(data.set("user.name", json!("Bob"), true).is_ok());
	/// assert_eq!(data.get("user.name"), Some(&json!("Bob")));
	/// ```
	pub fn set(&mut self, path: &str, value: Value, force: bool) -> PathResult<()> {
		let parsed = FieldPath::parse(path)?;
		if !force && self.is_frozen_path(&parsed) {
			return Err(PathError::Frozen(path.to_string()));
		}
		parsed.set(value, &mut self.value)
	}

	/// Mark the subtree at `path` as caller-owned.
	pub fn freeze(&mut self, path: &str) -> PathResult<()> {
		let parsed = FieldPath::parse(path)?;
		if !self.frozen.contains(&parsed) {
			self.frozen.push(parsed);
		}
		Ok(())
	}

	pub fn unfreeze(&mut self, path: &str) -> PathResult<()> {
		let parsed = FieldPath::parse(path)?;
		self.frozen.retain(|p| p != &parsed);
		Ok(())
	}

	/// Whether a write at `path` would touch a frozen subtree.
	///
	/// Malformed paths report as not frozen; writing them fails anyway.
	pub fn is_frozen(&self, path: &str) -> bool {
		FieldPath::parse(path)
			.map(|parsed| self.is_frozen_path(&parsed))
			.unwrap_or(false)
	}

	fn is_frozen_path(&self, path: &FieldPath) -> bool {
		self.frozen
			.iter()
			.any(|frozen| path.starts_with(frozen) || frozen.starts_with(path))
	}

	/// Replace the tree, keeping the frozen set.
	pub fn replace(&mut self, value: Value) {
		self.value = value;
	}
}

impl From<Value> for FormData {
	fn from(value: Value) -> Self {
		Self::new(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_snapshot_is_independent_of_original() {
		// Arrange
		let original = FormData::new(json!({"message": "hi"}));
		let mut snapshot = original.clone();

		// Act
		snapshot.set("message", json!("changed"), false).unwrap();

		// Assert
		assert_eq!(original.get("message"), Some(&json!("hi")));
		assert_eq!(snapshot.get("message"), Some(&json!("changed")));
	}

	#[rstest]
	#[case("user", true)]
	#[case("user.address.city", true)]
	#[case("", false)]
	#[case("profile.bio", false)]
	fn test_is_frozen(#[case] path: &str, #[case] expected: bool) {
		let mut data = FormData::empty();
		data.freeze("user.address").unwrap();

		assert_eq!(data.is_frozen(path), expected);
	}

	#[rstest]
	fn test_unfreeze_allows_writes_again() {
		let mut data = FormData::empty();
		data.freeze("user").unwrap();
		assert!(matches!(
			data.set("user.name", json!("x"), false),
			Err(PathError::Frozen(_))
		));

		data.unfreeze("user").unwrap();

		assert!(data.set("user.name", json!("x"), false).is_ok());
	}
}
