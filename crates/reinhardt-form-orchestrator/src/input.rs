//! Headless input field
//!
//! [`InputField`] keeps a field's value, error and interaction state in
//! memory. It is the [`FieldHandle`] tests and non-graphical front ends
//! register with a [`Form`](crate::Form).

use crate::registry::{FieldHandle, FieldValidator};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Default)]
struct InputState {
	value: Option<Value>,
	error: Option<String>,
	dirty: bool,
	touched: bool,
	validator: Option<FieldValidator>,
}

/// In-memory field handle.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::{FieldHandle, InputField};
/// use serde_json::json;
///
/// let field = InputField::new("message");
/// field.change(json!("hello"));
///
/// assert_eq!(field.get_value(), Some(json!("hello")));
/// assert!(field.is_dirty());
/// ```
#[derive(Debug)]
pub struct InputField {
	path: String,
	state: Mutex<InputState>,
}

impl InputField {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			state: Mutex::new(InputState::default()),
		}
	}

	pub fn with_value(path: impl Into<String>, value: Value) -> Self {
		let field = Self::new(path);
		field.state.lock().value = Some(value);
		field
	}

	/// Record user input and request a debounced validation.
	pub fn change(&self, value: Value) {
		let validator = {
			let mut state = self.state.lock();
			state.value = Some(value.clone());
			state.dirty = true;
			state.validator.clone()
		};
		// The validator may write back into this field.
		if let Some(validator) = validator {
			validator.call(Some(value), false);
		}
	}

	/// Mark the field touched and validate right away.
	pub fn blur(&self) {
		let (value, validator) = {
			let mut state = self.state.lock();
			state.touched = true;
			(state.value.clone(), state.validator.clone())
		};
		if let Some(validator) = validator {
			validator.call(value, true);
		}
	}

	pub fn error(&self) -> Option<String> {
		self.state.lock().error.clone()
	}

	pub fn is_dirty(&self) -> bool {
		self.state.lock().dirty
	}

	pub fn is_touched(&self) -> bool {
		self.state.lock().touched
	}

	pub fn has_validator(&self) -> bool {
		self.state.lock().validator.is_some()
	}
}

impl FieldHandle for InputField {
	fn path(&self) -> String {
		self.path.clone()
	}

	fn get_value(&self) -> Option<Value> {
		self.state.lock().value.clone()
	}

	fn set_value(&self, value: Value) {
		self.state.lock().value = Some(value);
	}

	fn clear(&self) {
		let mut state = self.state.lock();
		state.value = None;
		state.error = None;
		state.dirty = false;
		state.touched = false;
	}

	fn set_error(&self, message: Option<String>) {
		self.state.lock().error = message;
	}

	fn set_dirty(&self, dirty: bool) {
		self.state.lock().dirty = dirty;
	}

	fn install_validator(&self, validator: FieldValidator) {
		self.state.lock().validator = Some(validator);
	}
}
