//! Dot/bracket path addressing into nested form data
//!
//! A path such as `addresses[1].city` is parsed into a list of
//! [`PathSegment`]s which can then be used to read from or write into a
//! `serde_json::Value` tree.
//!
//! ## Grammar
//!
//! ```text
//! path    := segment ( "." key | "[" index "]" )*
//! segment := key | "[" index "]"
//! key     := any characters except ".", "[" and "]" (non-empty)
//! index   := decimal digits
//! ```
//!
//! ## Example
//!
//! ```
//! use reinhardt_form_orchestrator::path;
//! use serde_json::json;
//!
//! let mut data = json!({});
//! path::set("items[1].price", json!(9.5), &mut data).unwrap();
//!
//! assert_eq!(data, json!({"items": [null, {"price": 9.5}]}));
//! assert_eq!(path::get("items[1].price", &data), Some(&json!(9.5)));
//! ```

use crate::error::{PathError, PathResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Maximum number of `null` slots a single write may append to an array.
const MAX_ARRAY_PADDING: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
	Key(String),
	Index(usize),
}

/// A parsed, non-empty field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
	segments: Vec<PathSegment>,
}

impl FieldPath {
	/// Parse a dot/bracket path string.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_form_orchestrator::path::{FieldPath, PathSegment};
	///
	/// let path = FieldPath::parse("items[2].price").unwrap();
	/// assert_eq!(
	///     path.segments(),
	///     &[
	///         PathSegment::Key("items".to_string()),
	///         PathSegment::Index(2),
	///         PathSegment::Key("price".to_string()),
	///     ]
	/// );
	///
	/// assert!(FieldPath::parse("items[2.price").is_err());
	/// assert!(FieldPath::parse("user..email").is_err());
	/// ```
	pub fn parse(raw: &str) -> PathResult<Self> {
		let syntax = |reason: String| PathError::Syntax {
			path: raw.to_string(),
			reason,
		};

		let mut segments = Vec::new();
		let mut key = String::new();
		let mut after_index = false;
		let mut chars = raw.char_indices().peekable();

		while let Some((pos, ch)) = chars.next() {
			match ch {
				'.' => {
					if key.is_empty() && !after_index {
						return Err(syntax(format!("empty segment before '.' at {}", pos)));
					}
					if !key.is_empty() {
						segments.push(PathSegment::Key(std::mem::take(&mut key)));
					}
					after_index = false;
					match chars.peek() {
						None => return Err(syntax("trailing '.'".to_string())),
						Some((next, '.' | '[')) => {
							return Err(syntax(format!("empty segment at {}", next)));
						}
						Some(_) => {}
					}
				}
				'[' => {
					if !key.is_empty() {
						segments.push(PathSegment::Key(std::mem::take(&mut key)));
					}
					let mut digits = String::new();
					let mut closed = false;
					for (inner_pos, c) in chars.by_ref() {
						match c {
							']' => {
								closed = true;
								break;
							}
							'[' => {
								return Err(syntax(format!("nested '[' at {}", inner_pos)));
							}
							_ => digits.push(c),
						}
					}
					if !closed {
						return Err(syntax(format!("unclosed '[' at {}", pos)));
					}
					let index = digits.parse::<usize>().map_err(|_| {
						syntax(format!("index '{}' is not a non-negative integer", digits))
					})?;
					segments.push(PathSegment::Index(index));
					after_index = true;
				}
				']' => return Err(syntax(format!("unexpected ']' at {}", pos))),
				c => {
					if after_index {
						return Err(syntax(format!("expected '.' or '[' after ']' at {}", pos)));
					}
					key.push(c);
				}
			}
		}

		if !key.is_empty() {
			segments.push(PathSegment::Key(key));
		}
		if segments.is_empty() {
			return Err(syntax("path is empty".to_string()));
		}

		Ok(Self { segments })
	}

	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// The enclosing path, or `None` for a single-segment path.
	pub fn parent(&self) -> Option<FieldPath> {
		if self.segments.len() <= 1 {
			return None;
		}
		Some(Self {
			segments: self.segments[..self.segments.len() - 1].to_vec(),
		})
	}

	/// Whether `self` equals `other` or lies below it.
	pub fn starts_with(&self, other: &FieldPath) -> bool {
		self.segments.starts_with(&other.segments)
	}

	/// This path followed by every ancestor, longest first.
	pub fn prefixes(&self) -> Vec<FieldPath> {
		(1..=self.segments.len())
			.rev()
			.map(|n| Self {
				segments: self.segments[..n].to_vec(),
			})
			.collect()
	}

	pub fn get<'a>(&self, data: &'a Value) -> Option<&'a Value> {
		let mut current = data;
		for segment in &self.segments {
			current = match (segment, current) {
				(PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
				(PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
				(PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
				(PathSegment::Key(key), Value::Array(items)) => {
					items.get(key.parse::<usize>().ok()?)?
				}
				_ => return None,
			};
		}
		Some(current)
	}

	/// Write `value` at this path, creating missing objects and arrays.
	pub fn set(&self, value: Value, data: &mut Value) -> PathResult<()> {
		self.set_at(0, data, value)
	}

	fn set_at(&self, depth: usize, node: &mut Value, value: Value) -> PathResult<()> {
		let segment = &self.segments[depth];
		let is_last = depth + 1 == self.segments.len();

		if node.is_null() {
			*node = match segment {
				PathSegment::Key(_) => Value::Object(serde_json::Map::new()),
				PathSegment::Index(_) => Value::Array(Vec::new()),
			};
		}

		let slot = match (segment, node) {
			(PathSegment::Key(key), Value::Object(map)) => {
				map.entry(key.clone()).or_insert(Value::Null)
			}
			(PathSegment::Index(index), Value::Object(map)) => {
				map.entry(index.to_string()).or_insert(Value::Null)
			}
			(PathSegment::Index(index), Value::Array(items)) => {
				if *index >= items.len() {
					if *index - items.len() > MAX_ARRAY_PADDING {
						return Err(self.mismatch(depth, "index is too far beyond the array end"));
					}
					items.resize(*index + 1, Value::Null);
				}
				&mut items[*index]
			}
			(PathSegment::Key(_), Value::Array(_)) => {
				return Err(self.mismatch(depth, "arrays are addressed by index"));
			}
			(_, other) => {
				let reason = format!("cannot write through {}", kind_name(other));
				return Err(self.mismatch(depth, &reason));
			}
		};

		if is_last {
			*slot = value;
			Ok(())
		} else {
			self.set_at(depth + 1, slot, value)
		}
	}

	fn mismatch(&self, depth: usize, reason: &str) -> PathError {
		let segment = Self {
			segments: vec![self.segments[depth].clone()],
		};
		PathError::TypeMismatch {
			path: self.to_string(),
			segment: segment.to_string(),
			reason: reason.to_string(),
		}
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, segment) in self.segments.iter().enumerate() {
			match segment {
				PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
				PathSegment::Key(key) => write!(f, ".{}", key)?,
				PathSegment::Index(index) => write!(f, "[{}]", index)?,
			}
		}
		Ok(())
	}
}

impl FromStr for FieldPath {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

/// Read the value at `path`.
///
/// Malformed paths read as absent and are logged.
pub fn get<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
	match FieldPath::parse(path) {
		Ok(parsed) => parsed.get(data),
		Err(e) => {
			tracing::warn!("Ignoring read of malformed path: {}", e);
			None
		}
	}
}

/// Write `value` at `path`, creating intermediate containers.
pub fn set(path: &str, value: Value, data: &mut Value) -> PathResult<()> {
	FieldPath::parse(path)?.set(value, data)
}

/// `path` and each of its ancestors, longest first.
///
/// A malformed path yields only itself.
pub fn prefixes(path: &str) -> Vec<String> {
	match FieldPath::parse(path) {
		Ok(parsed) => parsed.prefixes().iter().map(ToString::to_string).collect(),
		Err(_) => vec![path.to_string()],
	}
}

pub fn join_key(parent: &str, name: &str) -> String {
	if parent.is_empty() {
		name.to_string()
	} else {
		format!("{}.{}", parent, name)
	}
}

pub fn join_index(parent: &str, index: usize) -> String {
	format!("{}[{}]", parent, index)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("name", vec![PathSegment::Key("name".into())])]
	#[case("user.email", vec![PathSegment::Key("user".into()), PathSegment::Key("email".into())])]
	#[case("items[0]", vec![PathSegment::Key("items".into()), PathSegment::Index(0)])]
	#[case("[3].name", vec![PathSegment::Index(3), PathSegment::Key("name".into())])]
	#[case("grid[1][2]", vec![PathSegment::Key("grid".into()), PathSegment::Index(1), PathSegment::Index(2)])]
	fn test_parse_valid(#[case] raw: &str, #[case] expected: Vec<PathSegment>) {
		// Act
		let path = FieldPath::parse(raw).unwrap();

		// Assert
		assert_eq!(path.segments(), expected.as_slice());
		assert_eq!(path.to_string(), raw);
	}

	#[rstest]
	#[case("")]
	#[case(".name")]
	#[case("name.")]
	#[case("user..email")]
	#[case("items[0")]
	#[case("items0]")]
	#[case("items[a]")]
	#[case("items[-1]")]
	#[case("items[[0]]")]
	#[case("items[0]name")]
	#[case("user.[0]")]
	fn test_parse_malformed(#[case] raw: &str) {
		let result = FieldPath::parse(raw);

		assert!(matches!(result, Err(PathError::Syntax { .. })), "{raw}");
	}

	#[rstest]
	fn test_set_creates_intermediate_containers() {
		// Arrange
		let mut data = json!({});

		// Act
		set("addresses[1].city", json!("Kyoto"), &mut data).unwrap();

		// Assert
		assert_eq!(data, json!({"addresses": [null, {"city": "Kyoto"}]}));
	}

	#[rstest]
	fn test_set_preserves_siblings() {
		let mut data = json!({"user": {"name": "Ann", "email": "old@example.com"}});

		set("user.email", json!("new@example.com"), &mut data).unwrap();

		assert_eq!(
			data,
			json!({"user": {"name": "Ann", "email": "new@example.com"}})
		);
	}

	#[rstest]
	fn test_set_through_scalar_is_rejected() {
		let mut data = json!({"user": "Ann"});

		let result = set("user.email", json!("a@example.com"), &mut data);

		assert!(matches!(result, Err(PathError::TypeMismatch { .. })));
		assert_eq!(data, json!({"user": "Ann"}));
	}

	#[rstest]
	fn test_set_key_on_array_is_rejected() {
		let mut data = json!({"items": []});

		let result = set("items.name", json!("x"), &mut data);

		assert!(matches!(result, Err(PathError::TypeMismatch { .. })));
	}

	#[rstest]
	fn test_set_refuses_huge_padding() {
		let mut data = json!({"items": []});

		let result = set("items[99999999]", json!(1), &mut data);

		assert!(result.is_err());
		assert_eq!(data, json!({"items": []}));
	}

	#[rstest]
	fn test_get_missing_and_malformed() {
		let data = json!({"items": [{"name": "a"}]});

		assert_eq!(get("items[0].name", &data), Some(&json!("a")));
		assert_eq!(get("items[1].name", &data), None);
		assert_eq!(get("items[0", &data), None);
		assert_eq!(get("items.0.name", &data), Some(&json!("a")));
	}

	#[rstest]
	fn test_prefixes_longest_first() {
		assert_eq!(
			prefixes("items[1].name"),
			vec!["items[1].name", "items[1]", "items"]
		);
		assert_eq!(prefixes("bad[path"), vec!["bad[path"]);
	}

	#[rstest]
	fn test_starts_with_and_parent() {
		let child = FieldPath::parse("user.address.city").unwrap();
		let parent = FieldPath::parse("user.address").unwrap();

		assert!(child.starts_with(&parent));
		assert!(!parent.starts_with(&child));
		assert_eq!(child.parent(), Some(parent));
		assert_eq!(FieldPath::parse("user").unwrap().parent(), None);
	}

	#[rstest]
	fn test_join_helpers() {
		assert_eq!(join_key("", "user"), "user");
		assert_eq!(join_key("user", "email"), "user.email");
		assert_eq!(join_index("items", 2), "items[2]");
	}
}
