//! Field contract and per-form registry
//!
//! A [`FieldHandle`] is anything that renders or edits one value of the form:
//! a text input, a chip list, a row of an array group. The form only ever
//! talks to fields through this trait, and the [`FieldRegistry`] holds them
//! weakly so a field that goes away between scheduling and running a
//! debounced pass is simply skipped.

use crate::path;
use crate::reconcile::ErrorMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

type ValidateFn = Arc<dyn Fn(Option<Value>, bool) + Send + Sync>;

/// The `validate(raw, ignore_debounce)` routine a form installs on a field.
#[derive(Clone)]
pub struct FieldValidator(ValidateFn);

impl FieldValidator {
	pub fn new<F>(validate: F) -> Self
	where
		F: Fn(Option<Value>, bool) + Send + Sync + 'static,
	{
		Self(Arc::new(validate))
	}

	/// Run validation with the field's latest value.
	///
	/// `ignore_debounce` runs the pass right away instead of scheduling it.
	pub fn call(&self, raw: Option<Value>, ignore_debounce: bool) {
		(self.0)(raw, ignore_debounce)
	}
}

impl fmt::Debug for FieldValidator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("FieldValidator(..)")
	}
}

/// One addressable field of a form.
///
/// Methods take `&self`; implementations keep their own state behind a lock
/// since the same handle is shared with the form.
pub trait FieldHandle: Send + Sync {
	/// Dot/bracket path of the value this field edits.
	fn path(&self) -> String;

	/// Current value, `None` when the field holds nothing.
	fn get_value(&self) -> Option<Value>;

	/// Value as entered, before any formatting the field applies.
	fn get_raw_value(&self) -> Option<Value> {
		self.get_value()
	}

	fn set_value(&self, value: Value);

	fn clear(&self);

	fn set_error(&self, message: Option<String>);

	fn set_dirty(&self, dirty: bool);

	fn install_validator(&self, validator: FieldValidator);
}

/// Weak path → field map owned by one form.
///
/// Cloning is cheap and gives an independent snapshot of the registrations,
/// which is how the form calls into fields without holding its own locks.
#[derive(Clone, Default)]
pub struct FieldRegistry {
	fields: BTreeMap<String, Weak<dyn FieldHandle>>,
}

impl FieldRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `handle` under its own path, replacing any earlier field.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::{FieldHandle, FieldRegistry, InputField};
	/// use std::sync::Arc;
	///
	/// let mut registry = FieldRegistry::new();
	/// let email: Arc<dyn FieldHandle> = Arc::new(InputField::new("user.email"));
	/// registry.register_field(&email);
	///
	/// assert!(registry.is_live("user.email"));
	/// drop(email);
	/// assert!(!registry.is_live("user.email"));
	/// ```
	pub fn register_field(&mut self, handle: &Arc<dyn FieldHandle>) {
		let path = handle.path();
		if self
			.fields
			.insert(path.clone(), Arc::downgrade(handle))
			.is_some_and(|previous| previous.strong_count() > 0)
		{
			tracing::debug!("Replacing field registered at '{}'", path);
		}
	}

	/// Returns `true` if a field was registered at `path`.
	pub fn unregister_field(&mut self, path: &str) -> bool {
		self.fields.remove(path).is_some()
	}

	pub fn get_field_ref(&self, path: &str) -> Option<Arc<dyn FieldHandle>> {
		self.fields.get(path).and_then(Weak::upgrade)
	}

	pub fn is_live(&self, path: &str) -> bool {
		self.fields
			.get(path)
			.is_some_and(|field| field.strong_count() > 0)
	}

	/// Paths of fields that are still alive, in path order.
	pub fn live_paths(&self) -> Vec<String> {
		self.fields
			.iter()
			.filter(|(_, field)| field.strong_count() > 0)
			.map(|(path, _)| path.clone())
			.collect()
	}

	pub fn live_fields(&self) -> Vec<Arc<dyn FieldHandle>> {
		self.fields.values().filter_map(Weak::upgrade).collect()
	}

	/// Drop registrations whose field is gone. Returns how many were removed.
	pub fn prune(&mut self) -> usize {
		let before = self.fields.len();
		self.fields.retain(|_, field| field.strong_count() > 0);
		before - self.fields.len()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Push `value` into the field at `path`. Returns `false` if none is live.
	pub fn set_field_value(&self, path: &str, value: Value) -> bool {
		match self.get_field_ref(path) {
			Some(field) => {
				field.set_value(value);
				true
			}
			None => false,
		}
	}

	/// Show `errors` on their fields and clear every other live field.
	pub fn set_errors(&self, errors: &ErrorMap) {
		for (path, field) in self.live_entries() {
			field.set_error(errors.get(&path).map(str::to_string));
		}
	}

	pub fn clear_errors(&self) {
		for field in self.live_fields() {
			field.set_error(None);
		}
	}

	/// Push every value of `data` into the field registered at its path.
	///
	/// Fields whose path is absent from `data` are cleared.
	pub fn set_data(&self, data: &Value) {
		for (path, field) in self.live_entries() {
			match path::get(&path, data) {
				Some(value) => field.set_value(value.clone()),
				None => field.clear(),
			}
		}
	}

	pub fn mark_all_dirty(&self) {
		for field in self.live_fields() {
			field.set_dirty(true);
		}
	}

	/// Live fields paired with their registered path.
	pub fn live_entries(&self) -> Vec<(String, Arc<dyn FieldHandle>)> {
		self.fields
			.iter()
			.filter_map(|(path, field)| field.upgrade().map(|f| (path.clone(), f)))
			.collect()
	}
}

impl fmt::Debug for FieldRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldRegistry")
			.field("live_paths", &self.live_paths())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::input::InputField;
	use rstest::rstest;
	use serde_json::json;

	fn field(path: &str) -> Arc<dyn FieldHandle> {
		Arc::new(InputField::new(path))
	}

	#[rstest]
	fn test_dropped_field_is_not_live() {
		// Arrange
		let mut registry = FieldRegistry::new();
		let kept = field("name");
		let dropped = field("email");
		registry.register_field(&kept);
		registry.register_field(&dropped);

		// Act
		drop(dropped);

		// Assert
		assert_eq!(registry.live_paths(), vec!["name"]);
		assert!(registry.get_field_ref("email").is_none());
		assert_eq!(registry.prune(), 1);
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn test_set_data_pushes_values_and_clears_missing() {
		let mut registry = FieldRegistry::new();
		let city = Arc::new(InputField::with_value("address.city", json!("Old")));
		let zip = Arc::new(InputField::with_value("address.zip", json!("000")));
		let city_handle: Arc<dyn FieldHandle> = city.clone();
		let zip_handle: Arc<dyn FieldHandle> = zip.clone();
		registry.register_field(&city_handle);
		registry.register_field(&zip_handle);

		registry.set_data(&json!({"address": {"city": "Kyoto"}}));

		assert_eq!(city.get_value(), Some(json!("Kyoto")));
		assert_eq!(zip.get_value(), None);
	}

	#[rstest]
	fn test_set_errors_replaces_previous_errors() {
		let mut registry = FieldRegistry::new();
		let name = Arc::new(InputField::new("name"));
		let email = Arc::new(InputField::new("email"));
		let name_handle: Arc<dyn FieldHandle> = name.clone();
		let email_handle: Arc<dyn FieldHandle> = email.clone();
		registry.register_field(&name_handle);
		registry.register_field(&email_handle);
		email.set_error(Some("stale".to_string()));

		let errors: ErrorMap = [("name".to_string(), "name is a required field".to_string())]
			.into_iter()
			.collect();
		registry.set_errors(&errors);

		assert_eq!(name.error().as_deref(), Some("name is a required field"));
		assert_eq!(email.error(), None);
	}

	#[rstest]
	fn test_unregister_field() {
		let mut registry = FieldRegistry::new();
		let name = field("name");
		registry.register_field(&name);

		assert!(registry.unregister_field("name"));
		assert!(!registry.unregister_field("name"));
		assert!(registry.is_empty());
	}
}
