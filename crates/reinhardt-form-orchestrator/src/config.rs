//! Form configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a [`Form`](crate::Form).
///
/// Missing keys fall back to the defaults when deserializing, so a partial
/// settings object is enough.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::FormConfig;
/// use std::time::Duration;
///
/// let config: FormConfig = serde_json::from_str(r#"{"debounce_ms": 100}"#).unwrap();
/// assert_eq!(config.debounce(), Duration::from_millis(100));
/// assert_eq!(config.settle_delay(), Duration::ZERO);
///
/// let config = FormConfig::new()
///     .with_debounce(Duration::from_millis(50))
///     .with_trim_strings(true);
/// assert!(config.trim_strings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
	/// Quiet period before a debounced validation pass runs.
	pub debounce_ms: u64,
	/// Wait before initial data is pushed into fields by [`Form::settle`](crate::Form::settle).
	pub settle_delay_ms: u64,
	/// Trim strings while casting with the built-in schema.
	pub trim_strings: bool,
	/// Message for missing required values; `{path}` and `{label}` are substituted.
	pub required_message: String,
}

impl FormConfig {
	/// Defaults:
	/// - `debounce_ms`: 350
	/// - `settle_delay_ms`: 0
	/// - `trim_strings`: false
	/// - `required_message`: `"{path} is a required field"`
	pub fn new() -> Self {
		Self {
			debounce_ms: 350,
			settle_delay_ms: 0,
			trim_strings: false,
			required_message: crate::schema::DEFAULT_REQUIRED_MESSAGE.to_string(),
		}
	}

	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce_ms = debounce.as_millis() as u64;
		self
	}

	pub fn with_settle_delay(mut self, delay: Duration) -> Self {
		self.settle_delay_ms = delay.as_millis() as u64;
		self
	}

	pub fn with_trim_strings(mut self, trim: bool) -> Self {
		self.trim_strings = trim;
		self
	}

	pub fn with_required_message(mut self, template: impl Into<String>) -> Self {
		self.required_message = template.into();
		self
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_delay_ms)
	}
}

impl Default for FormConfig {
	fn default() -> Self {
		Self::new()
	}
}
