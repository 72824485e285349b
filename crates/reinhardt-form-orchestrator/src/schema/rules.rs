//! Value rules for the built-in schema adapter
//!
//! These are the checks [`ObjectSchema`](super::ObjectSchema) runs on a value
//! once it is present and of the right type. Length rules count characters,
//! not bytes, and apply to arrays as element counts.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

// HTTP/HTTPS URL: http or https scheme, domain labels without leading or
// trailing hyphens, optional port, path, query and fragment.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^https?://[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]*[a-zA-Z0-9])?)*(:[0-9]{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#[^\s]*)?$",
	)
	.expect("URL_REGEX: invalid regex pattern")
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

type CustomCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub enum Rule {
	MinLength {
		min: usize,
		message: Option<String>,
	},
	MaxLength {
		max: usize,
		message: Option<String>,
	},
	MinValue {
		min: f64,
		message: Option<String>,
	},
	MaxValue {
		max: f64,
		message: Option<String>,
	},
	Pattern {
		regex: Regex,
		message: Option<String>,
	},
	Email {
		message: Option<String>,
	},
	Url {
		message: Option<String>,
	},
	/// Arbitrary check; the returned message is used as-is.
	Custom(CustomCheck),
}

impl Rule {
	pub fn min_length(min: usize) -> Self {
		Self::MinLength { min, message: None }
	}

	pub fn max_length(max: usize) -> Self {
		Self::MaxLength { max, message: None }
	}

	pub fn min_value(min: f64) -> Self {
		Self::MinValue { min, message: None }
	}

	pub fn max_value(max: f64) -> Self {
		Self::MaxValue { max, message: None }
	}

	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::schema::Rule;
	/// use serde_json::json;
	///
	/// let rule = Rule::pattern("^[A-Z]{3}$").unwrap();
	/// assert!(rule.check("code", &json!("ABC")).is_ok());
	/// assert!(rule.check("code", &json!("abc")).is_err());
	/// ```
	pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
		Ok(Self::Pattern {
			regex: Regex::new(pattern)?,
			message: None,
		})
	}

	pub fn email() -> Self {
		Self::Email { message: None }
	}

	pub fn url() -> Self {
		Self::Url { message: None }
	}

	pub fn custom<F>(check: F) -> Self
	where
		F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(check))
	}

	/// Replace the default message. `{path}` is substituted.
	///
	/// Has no effect on [`Rule::Custom`].
	pub fn with_message(mut self, text: impl Into<String>) -> Self {
		let text = Some(text.into());
		match &mut self {
			Self::MinLength { message, .. }
			| Self::MaxLength { message, .. }
			| Self::MinValue { message, .. }
			| Self::MaxValue { message, .. }
			| Self::Pattern { message, .. }
			| Self::Email { message }
			| Self::Url { message } => *message = text,
			Self::Custom(_) => {}
		}
		self
	}

	/// Check `value`, reporting against `path` on failure.
	///
	/// Values a rule does not apply to (a length rule on a boolean, say)
	/// pass.
	pub fn check(&self, path: &str, value: &Value) -> Result<(), String> {
		let fail = |message: &Option<String>, default: String| -> Result<(), String> {
			Err(message
				.as_deref()
				.map(|m| m.replace("{path}", path))
				.unwrap_or(default))
		};

		match self {
			Self::MinLength { min, message } => match length_of(value) {
				Some(len) if len < *min => fail(
					message,
					format!("{} must be at least {} characters", path, min),
				),
				_ => Ok(()),
			},
			Self::MaxLength { max, message } => match length_of(value) {
				Some(len) if len > *max => fail(
					message,
					format!("{} must be at most {} characters", path, max),
				),
				_ => Ok(()),
			},
			Self::MinValue { min, message } => match value.as_f64() {
				Some(n) if n < *min => fail(
					message,
					format!("{} must be greater than or equal to {}", path, min),
				),
				_ => Ok(()),
			},
			Self::MaxValue { max, message } => match value.as_f64() {
				Some(n) if n > *max => fail(
					message,
					format!("{} must be less than or equal to {}", path, max),
				),
				_ => Ok(()),
			},
			Self::Pattern { regex, message } => match value.as_str() {
				Some(s) if !regex.is_match(s) => fail(
					message,
					format!("{} must match the following: \"{}\"", path, regex.as_str()),
				),
				_ => Ok(()),
			},
			Self::Email { message } => match value.as_str() {
				Some(s) if !EMAIL_REGEX.is_match(s) => {
					fail(message, format!("{} must be a valid email", path))
				}
				_ => Ok(()),
			},
			Self::Url { message } => match value.as_str() {
				Some(s) if !URL_REGEX.is_match(s) => {
					fail(message, format!("{} must be a valid URL", path))
				}
				_ => Ok(()),
			},
			Self::Custom(check) => check(value),
		}
	}
}

fn length_of(value: &Value) -> Option<usize> {
	match value {
		Value::String(s) => Some(s.chars().count()),
		Value::Array(items) => Some(items.len()),
		_ => None,
	}
}

impl fmt::Debug for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MinLength { min, .. } => write!(f, "MinLength({})", min),
			Self::MaxLength { max, .. } => write!(f, "MaxLength({})", max),
			Self::MinValue { min, .. } => write!(f, "MinValue({})", min),
			Self::MaxValue { max, .. } => write!(f, "MaxValue({})", max),
			Self::Pattern { regex, .. } => write!(f, "Pattern({:?})", regex.as_str()),
			Self::Email { .. } => f.write_str("Email"),
			Self::Url { .. } => f.write_str("Url"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}
