//! Built-in schema adapter
//!
//! [`ObjectSchema`] implements [`FormSchema`] directly over a [`SchemaNode`]
//! tree. Validation is collect-all unless `abort_early` is requested, and it
//! always runs against the cast value.

use super::node::{NodeKind, ScalarType, SchemaNode};
use super::{FormSchema, ValidateOptions};
use crate::config::FormConfig;
use crate::error::{AggregateValidationError, ValidationIssue};
use crate::path::{join_index, join_key};
use serde_json::{Number, Value};

pub const DEFAULT_REQUIRED_MESSAGE: &str = "{path} is a required field";

#[derive(Debug, Clone)]
pub struct ObjectSchema {
	root: SchemaNode,
	trim_strings: bool,
	required_message: String,
}

impl ObjectSchema {
	/// Build a schema from the top-level fields.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::schema::{FormSchema, ObjectSchema, SchemaNode, ValidateOptions};
	/// use serde_json::json;
	///
	/// let schema = ObjectSchema::new(vec![SchemaNode::string("message").required()]);
	///
	/// let error = schema
	///     .validate_sync(&json!({}), ValidateOptions::collect_all())
	///     .unwrap_err();
	/// assert_eq!(error.errors[0].path, "message");
	/// assert_eq!(error.errors[0].message, "message is a required field");
	///
	/// let data = schema
	///     .validate_sync(&json!({"message": "hi"}), ValidateOptions::collect_all())
	///     .unwrap();
	/// assert_eq!(data, json!({"message": "hi"}));
	/// ```
	pub fn new(fields: Vec<SchemaNode>) -> Self {
		Self::from_root(SchemaNode::root(fields))
	}

	pub fn from_root(root: SchemaNode) -> Self {
		Self {
			root,
			trim_strings: false,
			required_message: DEFAULT_REQUIRED_MESSAGE.to_string(),
		}
	}

	/// Trim string values while casting.
	pub fn with_trimmed_strings(mut self, trim: bool) -> Self {
		self.trim_strings = trim;
		self
	}

	/// Default message for required nodes without their own message.
	pub fn with_required_message(mut self, template: impl Into<String>) -> Self {
		self.required_message = template.into();
		self
	}

	fn cast_node(&self, node: &SchemaNode, value: &Value) -> Value {
		match node.kind() {
			NodeKind::Scalar(scalar) => self.cast_scalar(scalar, value),
			NodeKind::Object => self.cast_fields(node, value),
			NodeKind::Array => match value {
				Value::Array(items) if !node.children().is_empty() => Value::Array(
					items
						.iter()
						.map(|item| self.cast_fields(node, item))
						.collect(),
				),
				other => other.clone(),
			},
		}
	}

	fn cast_fields(&self, node: &SchemaNode, value: &Value) -> Value {
		let Value::Object(map) = value else {
			return value.clone();
		};
		let mut cast = map.clone();
		for child in node.children() {
			if let Some(existing) = map.get(child.name()) {
				cast.insert(child.name().to_string(), self.cast_node(child, existing));
			}
		}
		Value::Object(cast)
	}

	fn cast_scalar(&self, scalar: ScalarType, value: &Value) -> Value {
		match (scalar, value) {
			(ScalarType::String, Value::String(s)) if self.trim_strings => {
				Value::String(s.trim().to_string())
			}
			(ScalarType::String, Value::Number(n)) => Value::String(n.to_string()),
			(ScalarType::String, Value::Bool(b)) => Value::String(b.to_string()),
			(ScalarType::Number, Value::String(s)) => parse_number(s.trim())
				.map(Value::Number)
				.unwrap_or_else(|| value.clone()),
			(ScalarType::Boolean, Value::String(s)) => match s.trim() {
				"true" | "1" => Value::Bool(true),
				"false" | "0" => Value::Bool(false),
				_ => value.clone(),
			},
			(ScalarType::Boolean, Value::Number(n)) => match n.as_i64() {
				Some(1) => Value::Bool(true),
				Some(0) => Value::Bool(false),
				_ => value.clone(),
			},
			_ => value.clone(),
		}
	}

	fn required_issue(&self, node: &SchemaNode, path: &str) -> ValidationIssue {
		let template = node
			.required_message()
			.unwrap_or(self.required_message.as_str());
		let message = template
			.replace("{path}", path)
			.replace("{label}", node.label().unwrap_or(path));
		ValidationIssue::new(path, message)
	}

	fn check_fields(
		&self,
		node: &SchemaNode,
		path: &str,
		value: Option<&Value>,
		issues: &mut Vec<ValidationIssue>,
		abort_early: bool,
	) {
		let map = value.and_then(Value::as_object);
		for child in node.children() {
			if abort_early && !issues.is_empty() {
				return;
			}
			let child_path = join_key(path, child.name());
			self.check_node(
				child,
				&child_path,
				map.and_then(|m| m.get(child.name())),
				issues,
				abort_early,
			);
		}
	}

	fn check_node(
		&self,
		node: &SchemaNode,
		path: &str,
		value: Option<&Value>,
		issues: &mut Vec<ValidationIssue>,
		abort_early: bool,
	) {
		let Some(value) = value.filter(|v| !is_blank(v)) else {
			if node.is_required() {
				issues.push(self.required_issue(node, path));
			}
			return;
		};

		let type_ok = match node.kind() {
			NodeKind::Scalar(scalar) => scalar.accepts(value),
			NodeKind::Object => value.is_object(),
			NodeKind::Array => value.is_array(),
		};
		if !type_ok {
			issues.push(ValidationIssue::new(
				path,
				format!("{} must be a `{}` type", path, node.kind()),
			));
			return;
		}

		for rule in node.rules() {
			if let Err(message) = rule.check(path, value) {
				issues.push(ValidationIssue::new(path, message));
				if abort_early {
					return;
				}
			}
		}

		match (node.kind(), value) {
			(NodeKind::Object, _) => self.check_fields(node, path, Some(value), issues, abort_early),
			(NodeKind::Array, Value::Array(items)) if !node.children().is_empty() => {
				for (index, item) in items.iter().enumerate() {
					if abort_early && !issues.is_empty() {
						return;
					}
					let item_path = join_index(path, index);
					if !(item.is_object() || item.is_null()) {
						issues.push(ValidationIssue::new(
							&item_path,
							format!("{} must be a `object` type", item_path),
						));
						continue;
					}
					self.check_fields(node, &item_path, Some(item), issues, abort_early);
				}
			}
			_ => {}
		}
	}
}

impl FormSchema for ObjectSchema {
	fn root(&self) -> &SchemaNode {
		&self.root
	}

	fn validate_sync(
		&self,
		data: &Value,
		options: ValidateOptions,
	) -> Result<Value, AggregateValidationError> {
		let cast = self.cast(data);
		let mut issues = Vec::new();
		self.check_fields(&self.root, "", Some(&cast), &mut issues, options.abort_early);

		if issues.is_empty() {
			Ok(cast)
		} else {
			Err(AggregateValidationError::new(issues))
		}
	}

	fn cast(&self, data: &Value) -> Value {
		self.cast_fields(&self.root, data)
	}

	/// Settings left at their defaults do not override the schema's own.
	fn apply_config(&mut self, config: &FormConfig) {
		if config.trim_strings {
			self.trim_strings = true;
		}
		if config.required_message != DEFAULT_REQUIRED_MESSAGE {
			self.required_message = config.required_message.clone();
		}
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.trim().is_empty(),
		_ => false,
	}
}

fn parse_number(raw: &str) -> Option<Number> {
	if let Ok(integer) = raw.parse::<i64>() {
		return Some(Number::from(integer));
	}
	raw.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Rule;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn order_schema() -> ObjectSchema {
		ObjectSchema::new(vec![
			SchemaNode::string("customer").required(),
			SchemaNode::object(
				"shipping",
				vec![
					SchemaNode::string("city").required(),
					SchemaNode::string("zip").with_rule(Rule::pattern(r"^\d{3}-\d{4}$").unwrap()),
				],
			),
			SchemaNode::array(
				"items",
				vec![
					SchemaNode::string("name").required(),
					SchemaNode::number("quantity").with_rule(Rule::min_value(1.0)),
				],
			)
			.required(),
		])
	}

	fn issue_paths(error: &AggregateValidationError) -> Vec<&str> {
		error.errors.iter().map(|e| e.path.as_str()).collect()
	}

	#[rstest]
	fn test_collects_every_violation(order_schema: ObjectSchema) {
		// Arrange
		let data = json!({
			"shipping": {"zip": "12345"},
			"items": [{"name": "pen", "quantity": 0}, {}]
		});

		// Act
		let error = order_schema
			.validate_sync(&data, ValidateOptions::collect_all())
			.unwrap_err();

		// Assert
		assert_eq!(
			issue_paths(&error),
			vec![
				"customer",
				"shipping.city",
				"shipping.zip",
				"items[0].quantity",
				"items[1].name"
			]
		);
	}

	#[rstest]
	fn test_abort_early_stops_at_first(order_schema: ObjectSchema) {
		let error = order_schema
			.validate_sync(&json!({}), ValidateOptions { abort_early: true })
			.unwrap_err();

		assert_eq!(error.len(), 1);
		assert_eq!(error.errors[0].path, "customer");
	}

	#[rstest]
	fn test_cast_coerces_scalars(order_schema: ObjectSchema) {
		let data = json!({
			"customer": "Ann",
			"shipping": {"city": "Osaka"},
			"items": [{"name": "pen", "quantity": "3"}],
			"note": "kept"
		});

		let cast = order_schema
			.validate_sync(&data, ValidateOptions::collect_all())
			.unwrap();

		assert_eq!(cast["items"][0]["quantity"], json!(3));
		assert_eq!(cast["note"], json!("kept"));
	}

	#[rstest]
	fn test_type_mismatch_reported_after_cast() {
		let schema = ObjectSchema::new(vec![SchemaNode::number("age")]);

		let error = schema
			.validate_sync(&json!({"age": "forty"}), ValidateOptions::collect_all())
			.unwrap_err();

		assert_eq!(error.errors[0].message, "age must be a `number` type");
	}

	#[rstest]
	#[case(json!(null))]
	#[case(json!(""))]
	#[case(json!("   "))]
	fn test_blank_values_are_missing(#[case] value: Value) {
		let schema = ObjectSchema::new(vec![SchemaNode::string("message").required()]);

		let error = schema
			.validate_sync(&json!({ "message": value }), ValidateOptions::collect_all())
			.unwrap_err();

		assert_eq!(error.errors[0].message, "message is a required field");
	}

	#[rstest]
	fn test_required_message_uses_label() {
		let schema = ObjectSchema::new(vec![
			SchemaNode::string("email")
				.with_label("E-mail")
				.required_with("{label} is required"),
		]);

		let error = schema
			.validate_sync(&json!({}), ValidateOptions::collect_all())
			.unwrap_err();

		assert_eq!(error.errors[0].message, "E-mail is required");
	}

	#[rstest]
	fn test_apply_config_overrides_defaults_only() {
		let mut schema = ObjectSchema::new(vec![SchemaNode::string("name").required()]);
		schema.apply_config(&FormConfig::new().with_required_message("Please fill in {path}"));

		let error = schema
			.validate_sync(&json!({}), ValidateOptions::collect_all())
			.unwrap_err();

		assert_eq!(error.errors[0].message, "Please fill in name");
	}

	#[rstest]
	fn test_trimmed_strings_and_boolean_cast() {
		let schema = ObjectSchema::new(vec![
			SchemaNode::string("name"),
			SchemaNode::boolean("subscribed"),
		])
		.with_trimmed_strings(true);

		let cast = schema.cast(&json!({"name": "  Ann ", "subscribed": "true"}));

		assert_eq!(cast, json!({"name": "Ann", "subscribed": true}));
	}
}
