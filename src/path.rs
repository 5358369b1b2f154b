//! Dotted-path access into a node tree, e.g. `"items.2.name"`.
//!
//! The original source resolved these dynamically (Python attribute/`[]`
//! access); here a path compiles to an explicit [`Segment`] list that is
//! walked against the [`Node`] API.

use crate::error::{RuError, Result};
use crate::schema::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	Name(String),
	Index(usize),
}

impl Segment {
	/// Splits a dotted path into segments; purely-numeric components become
	/// [`Segment::Index`].
	pub fn parse_dotted(path: &str) -> Vec<Segment> {
		path.split('.')
			.map(|part| match part.parse::<usize>() {
				Ok(i) if !part.is_empty() => Segment::Index(i),
				_ => Segment::Name(part.to_owned()),
			})
			.collect()
	}
}

pub fn get<'a>(root: &'a Node, segments: &[Segment]) -> Result<&'a Node> {
	let mut current = root;
	for seg in segments {
		current = match seg {
			Segment::Name(name) => current.member(name)?,
			Segment::Index(i) => current.index(*i)?,
		};
	}
	Ok(current)
}

pub fn get_mut<'a>(root: &'a mut Node, segments: &[Segment]) -> Result<&'a mut Node> {
	let mut current = root;
	for seg in segments {
		current = match seg {
			Segment::Name(name) => current.member_mut(name)?,
			Segment::Index(i) => current.index_mut(*i)?,
		};
	}
	Ok(current)
}

/// Convenience wrapper over [`get`] taking a raw dotted-path string.
pub fn get_path<'a>(root: &'a Node, path: &str) -> Result<&'a Node> {
	get(root, &Segment::parse_dotted(path))
}

pub fn get_path_mut<'a>(root: &'a mut Node, path: &str) -> Result<&'a mut Node> {
	get_mut(root, &Segment::parse_dotted(path))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::{Node, ScalarKind};

	fn sample() -> Node {
		Node::new_struct(
			crate::schema::ROOT_NAME,
			vec![
				Node::new_scalar("count", ScalarKind::Uint8),
				Node::new_array("items", crate::schema::ArraySize::Literal(2), Node::new_scalar("", ScalarKind::Uint16)),
			],
		)
		.unwrap()
	}

	#[test]
	fn parses_mixed_name_and_index_segments() {
		assert_eq!(
			Segment::parse_dotted("items.2.name"),
			vec![
				Segment::Name("items".into()),
				Segment::Index(2),
				Segment::Name("name".into())
			]
		);
	}

	#[test]
	fn navigates_into_array_elements() {
		let mut root = sample();
		root.member_mut("items").unwrap().resize(2).unwrap();
		root.member_mut("items").unwrap().index_mut(1).unwrap().set_int(7).unwrap();
		let node = get_path(&root, "items.1").unwrap();
		assert_eq!(node.as_int().unwrap(), 7);
	}

	#[test]
	fn missing_segment_errors() {
		let root = sample();
		let err = get_path(&root, "missing").unwrap_err();
		assert!(matches!(err, RuError::IndexOutOfRange(_)));
	}
}
