//! Schema node tree
//!
//! [`SchemaNode`] is the introspection interface a schema adapter exposes to
//! the orchestrator: names, nesting, required flags and whether a group is an
//! object or an array. The orchestrator never probes adapter internals beyond
//! this tree.

use super::rules::Rule;
use crate::error::ConfigurationError;
use crate::path::join_key;
use std::collections::HashSet;
use std::fmt;

/// Deepest nesting accepted by [`SchemaNode::check_root`].
pub const MAX_SCHEMA_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
	String,
	Number,
	Boolean,
	Any,
}

impl ScalarType {
	pub fn accepts(&self, value: &serde_json::Value) -> bool {
		match self {
			Self::String => value.is_string(),
			Self::Number => value.is_number(),
			Self::Boolean => value.is_boolean(),
			Self::Any => true,
		}
	}
}

impl fmt::Display for ScalarType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::String => "string",
			Self::Number => "number",
			Self::Boolean => "boolean",
			Self::Any => "mixed",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Scalar(ScalarType),
	Object,
	/// Children describe one element; the element count comes from data.
	/// An array without children holds scalars.
	Array,
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Scalar(scalar) => write!(f, "{}", scalar),
			Self::Object => f.write_str("object"),
			Self::Array => f.write_str("array"),
		}
	}
}

/// One node of a form schema.
///
/// # Examples
///
/// ```
/// use reinhardt_form_orchestrator::schema::{NodeKind, SchemaNode};
///
/// let items = SchemaNode::array(
///     "items",
///     vec![SchemaNode::string("name").required()],
/// );
///
/// assert_eq!(items.kind(), NodeKind::Array);
/// assert!(items.child("name").unwrap().is_required());
/// ```
#[derive(Debug, Clone)]
pub struct SchemaNode {
	name: String,
	kind: NodeKind,
	required: bool,
	required_message: Option<String>,
	label: Option<String>,
	children: Vec<SchemaNode>,
	rules: Vec<Rule>,
}

impl SchemaNode {
	pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			required: false,
			required_message: None,
			label: None,
			children: Vec::new(),
			rules: Vec::new(),
		}
	}

	pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
		Self::new(name, NodeKind::Scalar(scalar))
	}

	pub fn string(name: impl Into<String>) -> Self {
		Self::scalar(name, ScalarType::String)
	}

	pub fn number(name: impl Into<String>) -> Self {
		Self::scalar(name, ScalarType::Number)
	}

	pub fn boolean(name: impl Into<String>) -> Self {
		Self::scalar(name, ScalarType::Boolean)
	}

	pub fn any(name: impl Into<String>) -> Self {
		Self::scalar(name, ScalarType::Any)
	}

	pub fn object(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
		Self {
			children,
			..Self::new(name, NodeKind::Object)
		}
	}

	pub fn array(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
		Self {
			children,
			..Self::new(name, NodeKind::Array)
		}
	}

	/// The unnamed object node at the top of a schema.
	pub fn root(children: Vec<SchemaNode>) -> Self {
		Self::object("", children)
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Mark required with a custom message.
	///
	/// `{path}` and `{label}` in the message are substituted.
	pub fn required_with(mut self, message: impl Into<String>) -> Self {
		self.required = true;
		self.required_message = Some(message.into());
		self
	}

	pub fn optional(mut self) -> Self {
		self.required = false;
		self.required_message = None;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	pub fn with_child(mut self, child: SchemaNode) -> Self {
		self.children.push(child);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	pub fn required_message(&self) -> Option<&str> {
		self.required_message.as_deref()
	}

	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	pub fn children(&self) -> &[SchemaNode] {
		&self.children
	}

	pub fn child(&self, name: &str) -> Option<&SchemaNode> {
		self.children.iter().find(|c| c.name == name)
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn is_group(&self) -> bool {
		matches!(self.kind, NodeKind::Object | NodeKind::Array)
	}

	/// Reject trees the walker and reconciler cannot address.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::schema::SchemaNode;
	///
	/// let ok = SchemaNode::root(vec![SchemaNode::string("message")]);
	/// assert!(ok.check_root().is_ok());
	///
	/// let duplicated = SchemaNode::root(vec![
	///     SchemaNode::string("message"),
	///     SchemaNode::string("message"),
	/// ]);
	/// assert!(duplicated.check_root().is_err());
	/// ```
	pub fn check_root(&self) -> Result<(), ConfigurationError> {
		if self.kind != NodeKind::Object {
			return Err(ConfigurationError::RootNotObject(self.kind.to_string()));
		}
		self.check_children("", 0)
	}

	fn check_children(&self, path: &str, depth: usize) -> Result<(), ConfigurationError> {
		if depth >= MAX_SCHEMA_DEPTH {
			return Err(ConfigurationError::TooDeep {
				path: path.to_string(),
				max: MAX_SCHEMA_DEPTH,
			});
		}

		let mut seen = HashSet::new();
		for child in &self.children {
			if child.name.is_empty() {
				return Err(ConfigurationError::EmptyName {
					parent: path.to_string(),
				});
			}
			if child.name.contains(['.', '[', ']']) {
				return Err(ConfigurationError::InvalidName {
					name: child.name.clone(),
				});
			}
			if !seen.insert(child.name.as_str()) {
				return Err(ConfigurationError::DuplicateName {
					parent: path.to_string(),
					name: child.name.clone(),
				});
			}

			let child_path = join_key(path, &child.name);
			match child.kind {
				NodeKind::Scalar(_) if !child.children.is_empty() => {
					return Err(ConfigurationError::ScalarWithChildren(child_path));
				}
				NodeKind::Scalar(_) => {}
				NodeKind::Object | NodeKind::Array => {
					child.check_children(&child_path, depth + 1)?;
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_check_rejects_non_object_root() {
		let root = SchemaNode::string("message");

		assert!(matches!(
			root.check_root(),
			Err(ConfigurationError::RootNotObject(_))
		));
	}

	#[rstest]
	#[case(SchemaNode::string(""), "EmptyName")]
	#[case(SchemaNode::string("a.b"), "InvalidName")]
	#[case(SchemaNode::string("items[0]"), "InvalidName")]
	#[case(SchemaNode::string("x").with_child(SchemaNode::string("y")), "ScalarWithChildren")]
	fn test_check_rejects_bad_nodes(#[case] node: SchemaNode, #[case] variant: &str) {
		let root = SchemaNode::root(vec![node]);

		let error = root.check_root().unwrap_err();

		assert!(format!("{:?}", error).starts_with(variant), "{error:?}");
	}

	#[rstest]
	fn test_check_reports_duplicate_in_nested_group() {
		let root = SchemaNode::root(vec![SchemaNode::array(
			"items",
			vec![SchemaNode::string("name"), SchemaNode::number("name")],
		)]);

		assert_eq!(
			root.check_root(),
			Err(ConfigurationError::DuplicateName {
				parent: "items".to_string(),
				name: "name".to_string(),
			})
		);
	}

	#[rstest]
	fn test_check_rejects_runaway_depth() {
		let mut node = SchemaNode::string("leaf");
		for i in 0..MAX_SCHEMA_DEPTH + 1 {
			node = SchemaNode::object(format!("level{}", i), vec![node]);
		}
		let root = SchemaNode::root(vec![node]);

		assert!(matches!(
			root.check_root(),
			Err(ConfigurationError::TooDeep { .. })
		));
	}

	#[rstest]
	fn test_array_without_children_is_still_array() {
		let tags = SchemaNode::array("tags", vec![]);

		assert_eq!(tags.kind(), NodeKind::Array);
		assert!(tags.children().is_empty());
		assert!(tags.is_group());
	}
}
