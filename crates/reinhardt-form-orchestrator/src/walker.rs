//! Schema walker
//!
//! Visits every schema path that currently has a live field. Array groups are
//! expanded from the data, not the schema: `items` with three elements in the
//! data yields `items[0]`, `items[1]` and `items[2]` even though the schema
//! only describes one element.

use crate::path::{self, join_index, join_key};
use crate::registry::{FieldHandle, FieldRegistry};
use crate::schema::{NodeKind, SchemaNode};
use serde_json::Value;
use std::sync::Arc;

/// A live field found at a schema path.
pub struct WalkVisit<'a> {
	pub path: String,
	/// Schema node describing the field. For an element of an array, this is
	/// the array node itself.
	pub node: &'a SchemaNode,
	pub handle: Arc<dyn FieldHandle>,
	/// Whether the visit is one element (`path[i]`) of an array.
	pub is_element: bool,
}

pub struct SchemaWalker<'a> {
	registry: &'a FieldRegistry,
	data: &'a Value,
}

impl<'a> SchemaWalker<'a> {
	pub fn new(registry: &'a FieldRegistry, data: &'a Value) -> Self {
		Self { registry, data }
	}

	/// Call `action` for each live field under `root`, in schema order.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::{FieldHandle, FieldRegistry, InputField, SchemaWalker};
	/// use reinhardt_form_orchestrator::schema::SchemaNode;
	/// use serde_json::json;
	/// use std::sync::Arc;
	///
	/// let root = SchemaNode::root(vec![SchemaNode::array(
	///     "items",
	///     vec![SchemaNode::string("name")],
	/// )]);
	/// let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
	///
	/// let mut registry = FieldRegistry::new();
	/// let fields: Vec<Arc<dyn FieldHandle>> = vec![
	///     Arc::new(InputField::new("items[0].name")),
	///     Arc::new(InputField::new("items[1].name")),
	/// ];
	/// for field in &fields {
	///     registry.register_field(field);
	/// }
	///
	/// let mut paths = Vec::new();
	/// SchemaWalker::new(&registry, &data).walk(&root, |visit| paths.push(visit.path));
	/// assert_eq!(paths, vec!["items[0].name", "items[1].name"]);
	/// ```
	pub fn walk<F>(&self, root: &'a SchemaNode, mut action: F)
	where
		F: FnMut(WalkVisit<'a>),
	{
		for child in root.children() {
			self.visit_node(child, join_key("", child.name()), &mut action);
		}
	}

	fn visit_node<F>(&self, node: &'a SchemaNode, path: String, action: &mut F)
	where
		F: FnMut(WalkVisit<'a>),
	{
		if let Some(handle) = self.registry.get_field_ref(&path) {
			action(WalkVisit {
				path: path.clone(),
				node,
				handle,
				is_element: false,
			});
		}

		match node.kind() {
			NodeKind::Scalar(_) => {}
			NodeKind::Object => {
				for child in node.children() {
					self.visit_node(child, join_key(&path, child.name()), action);
				}
			}
			NodeKind::Array => {
				for index in 0..self.element_count(&path) {
					let item_path = join_index(&path, index);
					if let Some(handle) = self.registry.get_field_ref(&item_path) {
						action(WalkVisit {
							path: item_path.clone(),
							node,
							handle,
							is_element: true,
						});
					}
					for child in node.children() {
						self.visit_node(child, join_key(&item_path, child.name()), action);
					}
				}
			}
		}
	}

	fn element_count(&self, path: &str) -> usize {
		path::get(path, self.data)
			.and_then(Value::as_array)
			.map_or(0, Vec::len)
	}

	/// Paths of live fields whose schema node is required.
	pub fn required_paths(&self, root: &'a SchemaNode) -> Vec<String> {
		let mut paths = Vec::new();
		self.walk(root, |visit| {
			if !visit.is_element && visit.node.is_required() {
				paths.push(visit.path);
			}
		});
		paths
	}

	/// `path[i]` prefixes of every array group element present in the data.
	pub fn array_groups(&self, root: &SchemaNode) -> Vec<String> {
		let mut groups = Vec::new();
		self.collect_groups(root, "", &mut groups);
		groups
	}

	fn collect_groups(&self, node: &SchemaNode, path: &str, groups: &mut Vec<String>) {
		for child in node.children() {
			let child_path = join_key(path, child.name());
			match child.kind() {
				NodeKind::Scalar(_) => {}
				NodeKind::Object => self.collect_groups(child, &child_path, groups),
				NodeKind::Array if child.children().is_empty() => {}
				NodeKind::Array => {
					for index in 0..self.element_count(&child_path) {
						let item_path = join_index(&child_path, index);
						groups.push(item_path.clone());
						self.collect_groups(child, &item_path, groups);
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::input::InputField;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn schema() -> SchemaNode {
		SchemaNode::root(vec![
			SchemaNode::string("title").required(),
			SchemaNode::object(
				"author",
				vec![
					SchemaNode::string("name").required(),
					SchemaNode::string("email"),
				],
			),
			SchemaNode::array("tags", vec![]),
			SchemaNode::array(
				"items",
				vec![
					SchemaNode::string("name").required(),
					SchemaNode::array("notes", vec![SchemaNode::string("text")]),
				],
			),
		])
	}

	fn register(registry: &mut FieldRegistry, paths: &[&str]) -> Vec<Arc<dyn FieldHandle>> {
		paths
			.iter()
			.map(|path| {
				let field: Arc<dyn FieldHandle> = Arc::new(InputField::new(*path));
				registry.register_field(&field);
				field
			})
			.collect()
	}

	fn visited(registry: &FieldRegistry, data: &Value, root: &SchemaNode) -> Vec<String> {
		let mut paths = Vec::new();
		SchemaWalker::new(registry, data).walk(root, |visit| paths.push(visit.path));
		paths
	}

	#[rstest]
	fn test_walk_visits_live_fields_in_schema_order(schema: SchemaNode) {
		// Arrange
		let mut registry = FieldRegistry::new();
		let _fields = register(
			&mut registry,
			&["items[1].name", "author.name", "title", "items[0].name", "tags"],
		);
		let data = json!({"items": [{"name": "a"}, {}]});

		// Act
		let paths = visited(&registry, &data, &schema);

		// Assert
		assert_eq!(
			paths,
			vec!["title", "author.name", "tags", "items[0].name", "items[1].name"]
		);
	}

	#[rstest]
	fn test_walk_skips_fields_beyond_data_length(schema: SchemaNode) {
		let mut registry = FieldRegistry::new();
		let _fields = register(&mut registry, &["items[0].name", "items[5].name"]);
		let data = json!({"items": [{}]});

		assert_eq!(visited(&registry, &data, &schema), vec!["items[0].name"]);
	}

	#[rstest]
	fn test_walk_scalar_array_elements(schema: SchemaNode) {
		let mut registry = FieldRegistry::new();
		let _fields = register(&mut registry, &["tags[0]", "tags[1]"]);
		let data = json!({"tags": ["rust", "forms"]});

		let mut visits = Vec::new();
		SchemaWalker::new(&registry, &data).walk(&schema, |visit| {
			visits.push((visit.path, visit.is_element))
		});

		assert_eq!(
			visits,
			vec![("tags[0]".to_string(), true), ("tags[1]".to_string(), true)]
		);
	}

	#[rstest]
	fn test_walk_ignores_dropped_fields(schema: SchemaNode) {
		let mut registry = FieldRegistry::new();
		let fields = register(&mut registry, &["title", "author.name"]);
		drop(fields);

		assert!(visited(&registry, &json!({}), &schema).is_empty());
	}

	#[rstest]
	fn test_required_paths_only_counts_live_required(schema: SchemaNode) {
		let mut registry = FieldRegistry::new();
		let _fields = register(&mut registry, &["title", "author.email", "items[0].name"]);
		let data = json!({"items": [{}]});

		let required = SchemaWalker::new(&registry, &data).required_paths(&schema);

		assert_eq!(required, vec!["title", "items[0].name"]);
	}

	#[rstest]
	fn test_array_groups_follow_nested_data(schema: SchemaNode) {
		let registry = FieldRegistry::new();
		let data = json!({
			"tags": ["x"],
			"items": [{"notes": [{}, {}]}, {}]
		});

		let groups = SchemaWalker::new(&registry, &data).array_groups(&schema);

		assert_eq!(
			groups,
			vec!["items[0]", "items[0].notes[0]", "items[0].notes[1]", "items[1]"]
		);
	}
}
