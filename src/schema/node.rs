//! The polymorphic type-node tree that a parsed `format` schema string
//! compiles into, plus its `read`/`write` traversal of the container body.
//!
//! One enum, matched exhaustively in `read`/`write`/`name_type_string`,
//! rather than a class hierarchy: each node kind is a leaf of the same sum
//! type, which keeps traversal a single `match` instead of dynamic dispatch.

use crate::cursor::ByteReader;
use crate::encoding::{self, EncodingTable};
use crate::error::{RuError, Result};
use crate::resolver::SizeResolver;

/// Reserved name of the top-level struct, matching the original source's `"/"`.
pub const ROOT_NAME: &str = "/";

/// The eight RU scalar kinds. Multi-byte kinds are big-endian on the wire;
/// `INT8` is a single signed byte with no endianness concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
	Int8,
	Int16,
	Int32,
	Uint8,
	Uint16,
	Uint32,
	Float32,
	Float64,
}

impl ScalarKind {
	pub fn parse(name: &str) -> Option<Self> {
		Some(match name {
			"INT8" => ScalarKind::Int8,
			"INT16" => ScalarKind::Int16,
			"INT32" => ScalarKind::Int32,
			"UINT8" => ScalarKind::Uint8,
			"UINT16" => ScalarKind::Uint16,
			"UINT32" => ScalarKind::Uint32,
			"FLOAT32" => ScalarKind::Float32,
			"FLOAT64" => ScalarKind::Float64,
			_ => return None,
		})
	}

	pub fn type_name(self) -> &'static str {
		match self {
			ScalarKind::Int8 => "INT8",
			ScalarKind::Int16 => "INT16",
			ScalarKind::Int32 => "INT32",
			ScalarKind::Uint8 => "UINT8",
			ScalarKind::Uint16 => "UINT16",
			ScalarKind::Uint32 => "UINT32",
			ScalarKind::Float32 => "FLOAT32",
			ScalarKind::Float64 => "FLOAT64",
		}
	}

	pub fn size(self) -> usize {
		match self {
			ScalarKind::Int8 | ScalarKind::Uint8 => 1,
			ScalarKind::Int16 | ScalarKind::Uint16 => 2,
			ScalarKind::Int32 | ScalarKind::Uint32 | ScalarKind::Float32 => 4,
			ScalarKind::Float64 => 8,
		}
	}

	pub fn is_integer(self) -> bool {
		!matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
	}
}

/// The value held by a [`NodeKind::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
	Int8(i8),
	Int16(i16),
	Int32(i32),
	Uint8(u8),
	Uint16(u16),
	Uint32(u32),
	Float32(f32),
	Float64(f64),
}

impl ScalarValue {
	fn zero(kind: ScalarKind) -> Self {
		match kind {
			ScalarKind::Int8 => ScalarValue::Int8(0),
			ScalarKind::Int16 => ScalarValue::Int16(0),
			ScalarKind::Int32 => ScalarValue::Int32(0),
			ScalarKind::Uint8 => ScalarValue::Uint8(0),
			ScalarKind::Uint16 => ScalarValue::Uint16(0),
			ScalarKind::Uint32 => ScalarValue::Uint32(0),
			ScalarKind::Float32 => ScalarValue::Float32(0.0),
			ScalarKind::Float64 => ScalarValue::Float64(0.0),
		}
	}

	/// The integer value, for any integer kind; `None` for floats.
	pub fn as_i64(self) -> Option<i64> {
		Some(match self {
			ScalarValue::Int8(v) => v as i64,
			ScalarValue::Int16(v) => v as i64,
			ScalarValue::Int32(v) => v as i64,
			ScalarValue::Uint8(v) => v as i64,
			ScalarValue::Uint16(v) => v as i64,
			ScalarValue::Uint32(v) => v as i64,
			ScalarValue::Float32(_) | ScalarValue::Float64(_) => return None,
		})
	}

	pub fn as_f64(self) -> Option<f64> {
		Some(match self {
			ScalarValue::Float32(v) => v as f64,
			ScalarValue::Float64(v) => v,
			_ => return None,
		})
	}

	fn from_i64(kind: ScalarKind, v: i64) -> Self {
		match kind {
			ScalarKind::Int8 => ScalarValue::Int8(v as i8),
			ScalarKind::Int16 => ScalarValue::Int16(v as i16),
			ScalarKind::Int32 => ScalarValue::Int32(v as i32),
			ScalarKind::Uint8 => ScalarValue::Uint8(v as u8),
			ScalarKind::Uint16 => ScalarValue::Uint16(v as u16),
			ScalarKind::Uint32 => ScalarValue::Uint32(v as u32),
			ScalarKind::Float32 | ScalarKind::Float64 => {
				unreachable!("integer setter used on float scalar")
			}
		}
	}

	fn from_f64(kind: ScalarKind, v: f64) -> Self {
		match kind {
			ScalarKind::Float32 => ScalarValue::Float32(v as f32),
			ScalarKind::Float64 => ScalarValue::Float64(v),
			_ => unreachable!("float setter used on integer scalar"),
		}
	}

	fn read(kind: ScalarKind, r: &mut ByteReader<'_>) -> Result<Self> {
		let bytes = r.read_exact(kind.size(), "scalar field")?;
		Ok(match kind {
			ScalarKind::Int8 => ScalarValue::Int8(bytes[0] as i8),
			ScalarKind::Int16 => ScalarValue::Int16(i16::from_be_bytes(bytes.try_into().unwrap())),
			ScalarKind::Int32 => ScalarValue::Int32(i32::from_be_bytes(bytes.try_into().unwrap())),
			ScalarKind::Uint8 => ScalarValue::Uint8(bytes[0]),
			ScalarKind::Uint16 => ScalarValue::Uint16(u16::from_be_bytes(bytes.try_into().unwrap())),
			ScalarKind::Uint32 => ScalarValue::Uint32(u32::from_be_bytes(bytes.try_into().unwrap())),
			ScalarKind::Float32 => ScalarValue::Float32(f32::from_be_bytes(bytes.try_into().unwrap())),
			ScalarKind::Float64 => ScalarValue::Float64(f64::from_be_bytes(bytes.try_into().unwrap())),
		})
	}

	fn write(self, out: &mut Vec<u8>) {
		match self {
			ScalarValue::Int8(v) => out.push(v as u8),
			ScalarValue::Int16(v) => out.extend_from_slice(&v.to_be_bytes()),
			ScalarValue::Int32(v) => out.extend_from_slice(&v.to_be_bytes()),
			ScalarValue::Uint8(v) => out.push(v),
			ScalarValue::Uint16(v) => out.extend_from_slice(&v.to_be_bytes()),
			ScalarValue::Uint32(v) => out.extend_from_slice(&v.to_be_bytes()),
			ScalarValue::Float32(v) => out.extend_from_slice(&v.to_be_bytes()),
			ScalarValue::Float64(v) => out.extend_from_slice(&v.to_be_bytes()),
		}
	}
}

/// The NUL-terminated vs. fixed-size string families and their compiled-in
/// default encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFamily {
	Str,
	Estr,
	Jstr,
	Sstr,
	Ustr,
}

impl StringFamily {
	pub fn parse_var(name: &str) -> Option<Self> {
		Some(match name {
			"STR" => StringFamily::Str,
			"ESTR" => StringFamily::Estr,
			"JSTR" => StringFamily::Jstr,
			"SSTR" => StringFamily::Sstr,
			"USTR" => StringFamily::Ustr,
			_ => return None,
		})
	}

	pub fn parse_fixed(name: &str) -> Option<Self> {
		Some(match name {
			"NSTR" => StringFamily::Str,
			"NESTR" => StringFamily::Estr,
			"NJSTR" => StringFamily::Jstr,
			"NSSTR" => StringFamily::Sstr,
			"NUSTR" => StringFamily::Ustr,
			_ => return None,
		})
	}

	pub fn var_type_code(self) -> &'static str {
		match self {
			StringFamily::Str => "STR",
			StringFamily::Estr => "ESTR",
			StringFamily::Jstr => "JSTR",
			StringFamily::Sstr => "SSTR",
			StringFamily::Ustr => "USTR",
		}
	}

	pub fn fixed_type_code(self) -> &'static str {
		match self {
			StringFamily::Str => "NSTR",
			StringFamily::Estr => "NESTR",
			StringFamily::Jstr => "NJSTR",
			StringFamily::Sstr => "NSSTR",
			StringFamily::Ustr => "NUSTR",
		}
	}

	/// The compiled-in default encoding name, or `None` for `STR`/`NSTR`,
	/// whose default is the container-level `STR` override (see
	/// [`EncodingTable::default`]).
	pub fn default_encoding(self) -> Option<&'static str> {
		match self {
			StringFamily::Str => None,
			StringFamily::Estr => Some("euc_jp"),
			StringFamily::Jstr => Some("iso2022_jp"),
			StringFamily::Sstr => Some("shift_jis"),
			StringFamily::Ustr => Some("utf_8"),
		}
	}
}

/// How an array's element count is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySize {
	Literal(usize),
	/// Name of a sibling-or-ancestor integer field, resolved at read/write time.
	Symbolic(String),
	/// `+T`: read to end of the enclosing stream.
	Unbounded,
}

/// One node of the compiled schema tree.
///
/// `name` is empty for array-element types and nested structs appearing
/// directly inside an array; it is [`ROOT_NAME`] for the top-level struct.
#[derive(Debug, Clone)]
pub struct Node {
	pub name: String,
	pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
	Scalar {
		kind: ScalarKind,
		value: ScalarValue,
	},
	StringVar {
		family: StringFamily,
		value: String,
	},
	StringFixed {
		family: StringFamily,
		size: usize,
		value: String,
	},
	Array {
		size: ArraySize,
		element: Box<Node>,
		elements: Vec<Node>,
	},
	Struct {
		members: Vec<Node>,
	},
}

fn type_mismatch(field: &str, expected: &'static str, found: &'static str) -> RuError {
	RuError::TypeMismatch {
		field: field.to_owned(),
		expected,
		found,
	}
}

impl Node {
	pub fn new_scalar(name: impl Into<String>, kind: ScalarKind) -> Node {
		Node {
			name: name.into(),
			kind: NodeKind::Scalar {
				kind,
				value: ScalarValue::zero(kind),
			},
		}
	}

	pub fn new_string_var(name: impl Into<String>, family: StringFamily) -> Node {
		Node {
			name: name.into(),
			kind: NodeKind::StringVar {
				family,
				value: String::new(),
			},
		}
	}

	pub fn new_string_fixed(name: impl Into<String>, family: StringFamily, size: usize) -> Node {
		Node {
			name: name.into(),
			kind: NodeKind::StringFixed {
				family,
				size,
				value: String::new(),
			},
		}
	}

	pub fn new_array(name: impl Into<String>, size: ArraySize, element: Node) -> Node {
		Node {
			name: name.into(),
			kind: NodeKind::Array {
				size,
				element: Box::new(element),
				elements: Vec::new(),
			},
		}
	}

	/// Builds a struct node, checking member-name uniqueness (unnamed members,
	/// i.e. array/struct elements, are exempt since they carry no name to
	/// collide on).
	pub fn new_struct(name: impl Into<String>, members: Vec<Node>) -> Result<Node> {
		let name = name.into();
		let mut seen = std::collections::HashSet::new();
		for m in &members {
			if !m.name.is_empty() && !seen.insert(m.name.as_str()) {
				return Err(RuError::SchemaSyntax {
					position: 0,
					reason: format!("duplicate member name `{}`", m.name).into(),
					consumed: name.clone(),
				});
			}
		}
		Ok(Node {
			name,
			kind: NodeKind::Struct { members },
		})
	}

	pub fn is_array(&self) -> bool {
		matches!(self.kind, NodeKind::Array { .. })
	}

	pub fn is_struct(&self) -> bool {
		matches!(self.kind, NodeKind::Struct { .. })
	}

	pub fn is_scalar(&self) -> bool {
		matches!(self.kind, NodeKind::Scalar { .. })
	}

	pub fn is_string(&self) -> bool {
		matches!(self.kind, NodeKind::StringVar { .. } | NodeKind::StringFixed { .. })
	}

	/// Reads this node's value (and, recursively, its children) from `r`.
	pub fn read(
		&mut self,
		r: &mut ByteReader<'_>,
		resolver: &mut SizeResolver,
		encodings: &EncodingTable,
	) -> Result<()> {
		match &mut self.kind {
			NodeKind::Scalar { kind, value } => {
				*value = ScalarValue::read(*kind, r)?;
				if kind.is_integer() {
					resolver.publish(&self.name, value.as_i64().unwrap());
				}
			}
			NodeKind::StringVar { family, value } => {
				let bytes = r.read_until_nul("variable-length string field")?;
				let type_code = family.var_type_code();
				let (resolved, policy) = encoding::resolve(encodings, type_code, family.default_encoding())?;
				*value = encoding::decode(resolved, policy, bytes, &self.name)?;
			}
			NodeKind::StringFixed { family, size, value } => {
				let bytes = r.read_exact(*size, "fixed-size string field")?;
				let type_code = family.fixed_type_code();
				let (resolved, policy) = encoding::resolve(encodings, type_code, family.default_encoding())?;
				*value = encoding::decode(resolved, policy, bytes, &self.name)?;
			}
			NodeKind::Array { size, element, elements } => {
				elements.clear();
				match size {
					ArraySize::Unbounded => {
						let remainder = r.take_remainder();
						let mut sub = ByteReader::new(remainder);
						while !sub.is_at_end() {
							let mut e = (**element).clone();
							e.read(&mut sub, resolver, encodings)?;
							elements.push(e);
						}
					}
					ArraySize::Literal(n) => {
						for _ in 0..*n {
							let mut e = (**element).clone();
							e.read(r, resolver, encodings)?;
							elements.push(e);
						}
					}
					ArraySize::Symbolic(name) => {
						let n = resolver.get(name)?;
						let n = usize::try_from(n).map_err(|_| {
							type_mismatch(&self.name, "non-negative array size", "negative integer")
						})?;
						for _ in 0..n {
							let mut e = (**element).clone();
							e.read(r, resolver, encodings)?;
							elements.push(e);
						}
					}
				}
			}
			NodeKind::Struct { members } => {
				let is_root = self.name == ROOT_NAME;
				if !is_root {
					resolver.enter_struct();
				}
				for m in members.iter_mut() {
					m.read(r, resolver, encodings)?;
				}
				if !is_root {
					resolver.leave_struct();
				}
			}
		}
		Ok(())
	}

	/// Writes this node's value (and, recursively, its children) to `out`.
	pub fn write(
		&self,
		out: &mut Vec<u8>,
		resolver: &mut SizeResolver,
		encodings: &EncodingTable,
	) -> Result<()> {
		match &self.kind {
			NodeKind::Scalar { kind, value } => {
				value.write(out);
				if kind.is_integer() {
					resolver.publish(&self.name, value.as_i64().unwrap());
				}
			}
			NodeKind::StringVar { family, value } => {
				let type_code = family.var_type_code();
				let (resolved, policy) = encoding::resolve(encodings, type_code, family.default_encoding())?;
				let bytes = encoding::encode(resolved, policy, value, &self.name)?;
				out.extend_from_slice(&bytes);
				out.push(0);
			}
			NodeKind::StringFixed { family, size, value } => {
				let type_code = family.fixed_type_code();
				let (resolved, policy) = encoding::resolve(encodings, type_code, family.default_encoding())?;
				let mut bytes = encoding::encode(resolved, policy, value, &self.name)?;
				bytes.resize(*size, 0);
				out.extend_from_slice(&bytes);
			}
			NodeKind::Array { size, elements, .. } => {
				match size {
					ArraySize::Unbounded => {}
					ArraySize::Literal(n) => {
						if elements.len() != *n {
							return Err(RuError::ArraySizeMismatch {
								name: self.name.clone(),
								expected: *n,
								actual: elements.len(),
							});
						}
					}
					ArraySize::Symbolic(name) => {
						let expected = resolver.get(name)?;
						if expected < 0 || expected as usize != elements.len() {
							return Err(RuError::ArraySizeMismatch {
								name: self.name.clone(),
								expected: expected.max(0) as usize,
								actual: elements.len(),
							});
						}
					}
				}
				for e in elements {
					e.write(out, resolver, encodings)?;
				}
			}
			NodeKind::Struct { members } => {
				let is_root = self.name == ROOT_NAME;
				if !is_root {
					resolver.enter_struct();
				}
				for m in members {
					m.write(out, resolver, encodings)?;
				}
				if !is_root {
					resolver.leave_struct();
				}
			}
		}
		Ok(())
	}

	/// The inverse of the schema parser: re-parsing this string reproduces a
	/// structurally equivalent tree (the `get_name_type` formatter).
	pub fn name_type_string(&self) -> String {
		match &self.kind {
			NodeKind::Scalar { kind, .. } => self.prefixed(kind.type_name()),
			NodeKind::StringVar { family, .. } => self.prefixed(family.var_type_code()),
			NodeKind::StringFixed { family, size, .. } => {
				self.prefixed(&format!("<{}>{}", size, family.fixed_type_code()))
			}
			NodeKind::Array { size, element, .. } => {
				let size_part = match size {
					ArraySize::Literal(n) => format!("{{{n}}}"),
					ArraySize::Symbolic(name) => format!("{{{name}}}"),
					ArraySize::Unbounded => "+".to_owned(),
				};
				if self.name.is_empty() {
					format!("{size_part}{}", element.name_type_string())
				} else {
					format!("{}:{size_part}{}", self.name, element.name_type_string())
				}
			}
			NodeKind::Struct { members } => {
				let inner = members
					.iter()
					.map(Node::name_type_string)
					.collect::<Vec<_>>()
					.join(",");
				if self.name == ROOT_NAME {
					inner
				} else if self.name.is_empty() {
					format!("[{inner}]")
				} else {
					format!("{}:[{inner}]", self.name)
				}
			}
		}
	}

	fn prefixed(&self, type_str: &str) -> String {
		if self.name.is_empty() {
			type_str.to_owned()
		} else {
			format!("{}:{type_str}", self.name)
		}
	}

	// --- value access, used by the dotted-path accessor and the time helper ---

	pub fn as_int(&self) -> Result<i64> {
		match &self.kind {
			NodeKind::Scalar { value, .. } => {
				value.as_i64().ok_or_else(|| type_mismatch(&self.name, "integer scalar", "float scalar"))
			}
			_ => Err(type_mismatch(&self.name, "scalar", "non-scalar node")),
		}
	}

	pub fn set_int(&mut self, v: i64) -> Result<()> {
		match &mut self.kind {
			NodeKind::Scalar { kind, value } if kind.is_integer() => {
				*value = ScalarValue::from_i64(*kind, v);
				Ok(())
			}
			NodeKind::Scalar { .. } => Err(type_mismatch(&self.name, "integer scalar", "float scalar")),
			_ => Err(type_mismatch(&self.name, "scalar", "non-scalar node")),
		}
	}

	pub fn as_float(&self) -> Result<f64> {
		match &self.kind {
			NodeKind::Scalar { value, .. } => {
				value.as_f64().ok_or_else(|| type_mismatch(&self.name, "float scalar", "integer scalar"))
			}
			_ => Err(type_mismatch(&self.name, "scalar", "non-scalar node")),
		}
	}

	pub fn set_float(&mut self, v: f64) -> Result<()> {
		match &mut self.kind {
			NodeKind::Scalar { kind, value } if !kind.is_integer() => {
				*value = ScalarValue::from_f64(*kind, v);
				Ok(())
			}
			NodeKind::Scalar { .. } => Err(type_mismatch(&self.name, "float scalar", "integer scalar")),
			_ => Err(type_mismatch(&self.name, "scalar", "non-scalar node")),
		}
	}

	pub fn as_str(&self) -> Result<&str> {
		match &self.kind {
			NodeKind::StringVar { value, .. } | NodeKind::StringFixed { value, .. } => Ok(value),
			_ => Err(type_mismatch(&self.name, "string", "non-string node")),
		}
	}

	pub fn set_str(&mut self, v: impl Into<String>) -> Result<()> {
		match &mut self.kind {
			NodeKind::StringVar { value, .. } | NodeKind::StringFixed { value, .. } => {
				*value = v.into();
				Ok(())
			}
			_ => Err(type_mismatch(&self.name, "string", "non-string node")),
		}
	}

	pub fn member(&self, name: &str) -> Result<&Node> {
		match &self.kind {
			NodeKind::Struct { members } => members
				.iter()
				.find(|m| m.name == name)
				.ok_or_else(|| RuError::IndexOutOfRange(name.to_owned())),
			_ => Err(type_mismatch(&self.name, "struct", "non-struct node")),
		}
	}

	pub fn member_mut(&mut self, name: &str) -> Result<&mut Node> {
		match &mut self.kind {
			NodeKind::Struct { members } => members
				.iter_mut()
				.find(|m| m.name == name)
				.ok_or_else(|| RuError::IndexOutOfRange(name.to_owned())),
			_ => Err(type_mismatch(&self.name, "struct", "non-struct node")),
		}
	}

	pub fn members(&self) -> Result<&[Node]> {
		match &self.kind {
			NodeKind::Struct { members } => Ok(members),
			_ => Err(type_mismatch(&self.name, "struct", "non-struct node")),
		}
	}

	pub fn len(&self) -> Result<usize> {
		match &self.kind {
			NodeKind::Array { elements, .. } => Ok(elements.len()),
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.len()? == 0)
	}

	pub fn index(&self, i: usize) -> Result<&Node> {
		match &self.kind {
			NodeKind::Array { elements, .. } => {
				elements.get(i).ok_or_else(|| RuError::IndexOutOfRange(i.to_string()))
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	pub fn index_mut(&mut self, i: usize) -> Result<&mut Node> {
		match &mut self.kind {
			NodeKind::Array { elements, .. } => {
				elements.get_mut(i).ok_or_else(|| RuError::IndexOutOfRange(i.to_string()))
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	/// Resizes an array, cloning the zero-valued element template to grow,
	/// truncating to shrink.
	pub fn resize(&mut self, size: usize) -> Result<()> {
		match &mut self.kind {
			NodeKind::Array { element, elements, .. } => {
				if size < elements.len() {
					elements.truncate(size);
				} else {
					while elements.len() < size {
						elements.push((**element).clone());
					}
				}
				Ok(())
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	/// Appends an integer-valued scalar element; fails for array/struct
	/// elements, matching the original source's "Array or Struct type append
	/// not supported".
	pub fn push_int(&mut self, v: i64) -> Result<()> {
		match &mut self.kind {
			NodeKind::Array { element, elements, .. } if element.is_scalar() => {
				let mut e = (**element).clone();
				e.set_int(v)?;
				elements.push(e);
				Ok(())
			}
			NodeKind::Array { .. } => {
				Err(type_mismatch(&self.name, "scalar-element array", "array/struct-element array"))
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	pub fn push_float(&mut self, v: f64) -> Result<()> {
		match &mut self.kind {
			NodeKind::Array { element, elements, .. } if element.is_scalar() => {
				let mut e = (**element).clone();
				e.set_float(v)?;
				elements.push(e);
				Ok(())
			}
			NodeKind::Array { .. } => {
				Err(type_mismatch(&self.name, "scalar-element array", "array/struct-element array"))
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}

	pub fn push_str(&mut self, v: impl Into<String>) -> Result<()> {
		match &mut self.kind {
			NodeKind::Array { element, elements, .. } if element.is_string() => {
				let mut e = (**element).clone();
				e.set_str(v)?;
				elements.push(e);
				Ok(())
			}
			NodeKind::Array { .. } => {
				Err(type_mismatch(&self.name, "string-element array", "array/struct-element array"))
			}
			_ => Err(type_mismatch(&self.name, "array", "non-array node")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::encoding::EncodingTable;

	fn roundtrip(node: &mut Node) -> Result<Vec<u8>> {
		let mut resolver = SizeResolver::new([]);
		let encodings = EncodingTable::default();
		let mut out = Vec::new();
		node.write(&mut out, &mut resolver, &encodings)?;
		let mut r = ByteReader::new(&out);
		let mut resolver = SizeResolver::new([]);
		node.read(&mut r, &mut resolver, &encodings)?;
		Ok(out)
	}

	#[test]
	fn scalar_int32_round_trips() {
		let mut node = Node::new_scalar("v", ScalarKind::Int32);
		node.set_int(42).unwrap();
		let bytes = roundtrip(&mut node).unwrap();
		assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x2A]);
		assert_eq!(node.as_int().unwrap(), 42);
	}

	#[test]
	fn fixed_size_array_via_size_field() {
		let mut root = Node::new_struct(
			ROOT_NAME,
			vec![
				Node::new_scalar("n", ScalarKind::Uint8),
				Node::new_array("xs", ArraySize::Symbolic("n".into()), Node::new_scalar("", ScalarKind::Uint16)),
			],
		)
		.unwrap();
		let mut resolver = SizeResolver::new(["n".to_owned()]);
		let encodings = EncodingTable::default();
		let body = [0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
		let mut r = ByteReader::new(&body);
		root.read(&mut r, &mut resolver, &encodings).unwrap();
		assert_eq!(root.member("n").unwrap().as_int().unwrap(), 3);
		let xs = root.member("xs").unwrap();
		assert_eq!(xs.len().unwrap(), 3);
		assert_eq!(xs.index(0).unwrap().as_int().unwrap(), 1);
		assert_eq!(xs.index(2).unwrap().as_int().unwrap(), 3);
	}

	#[test]
	fn unbounded_tail_consumes_remainder() {
		let mut root = Node::new_struct(
			ROOT_NAME,
			vec![
				Node::new_scalar("h", ScalarKind::Uint16),
				Node::new_array("rest", ArraySize::Unbounded, Node::new_scalar("", ScalarKind::Uint8)),
			],
		)
		.unwrap();
		let mut resolver = SizeResolver::new([]);
		let encodings = EncodingTable::default();
		let body = [0x00, 0x05, 0xAA, 0xBB, 0xCC];
		let mut r = ByteReader::new(&body);
		root.read(&mut r, &mut resolver, &encodings).unwrap();
		let rest = root.member("rest").unwrap();
		assert_eq!(rest.len().unwrap(), 3);
		assert_eq!(rest.index(0).unwrap().as_int().unwrap(), 0xAA);
	}

	#[test]
	fn symbolic_array_write_rejects_length_mismatch() {
		let mut root = Node::new_struct(
			ROOT_NAME,
			vec![
				Node::new_scalar("n", ScalarKind::Uint8),
				Node::new_array("xs", ArraySize::Symbolic("n".into()), Node::new_scalar("", ScalarKind::Uint8)),
			],
		)
		.unwrap();
		root.member_mut("n").unwrap().set_int(2).unwrap();
		let xs = root.member_mut("xs").unwrap();
		xs.push_int(1).unwrap();
		let mut resolver = SizeResolver::new(["n".to_owned()]);
		let encodings = EncodingTable::default();
		let mut out = Vec::new();
		let err = root.write(&mut out, &mut resolver, &encodings).unwrap_err();
		assert!(matches!(err, RuError::ArraySizeMismatch { .. }));
	}

	#[test]
	fn literal_array_size_mismatch_on_write() {
		let mut array = Node::new_array("xs", ArraySize::Literal(2), Node::new_scalar("", ScalarKind::Uint8));
		array.push_int(1).unwrap();
		let mut resolver = SizeResolver::new([]);
		let encodings = EncodingTable::default();
		let mut out = Vec::new();
		let err = array.write(&mut out, &mut resolver, &encodings).unwrap_err();
		assert!(matches!(err, RuError::ArraySizeMismatch { .. }));
	}

	#[test]
	fn fixed_size_string_truncates_and_pads() {
		let mut node = Node::new_string_fixed("s", StringFamily::Ustr, 4);
		node.set_str("ab").unwrap();
		let mut resolver = SizeResolver::new([]);
		let encodings = EncodingTable::default();
		let mut out = Vec::new();
		node.write(&mut out, &mut resolver, &encodings).unwrap();
		assert_eq!(out, vec![b'a', b'b', 0, 0]);

		let mut node = Node::new_string_fixed("s", StringFamily::Ustr, 2);
		node.set_str("abcdef").unwrap();
		let mut out = Vec::new();
		let mut resolver = SizeResolver::new([]);
		node.write(&mut out, &mut resolver, &encodings).unwrap();
		assert_eq!(out, vec![b'a', b'b']);
	}

	#[test]
	fn nul_terminated_string_round_trips() {
		let mut node = Node::new_string_var("s", StringFamily::Ustr);
		node.set_str("hello").unwrap();
		let bytes = roundtrip(&mut node).unwrap();
		assert_eq!(bytes, b"hello\0");
		assert_eq!(node.as_str().unwrap(), "hello");
	}

	#[test]
	fn name_type_string_round_trips_through_parser() {
		let root = Node::new_struct(
			ROOT_NAME,
			vec![
				Node::new_scalar("v", ScalarKind::Int32),
				Node::new_array("xs", ArraySize::Symbolic("n".into()), Node::new_scalar("", ScalarKind::Uint16)),
				Node::new_string_fixed("s", StringFamily::Ustr, 16),
			],
		)
		.unwrap();
		assert_eq!(root.name_type_string(), "v:INT32,xs:{n}UINT16,s:<16>NUSTR");
	}

	#[test]
	fn duplicate_member_names_rejected() {
		let err = Node::new_struct(
			ROOT_NAME,
			vec![
				Node::new_scalar("v", ScalarKind::Int32),
				Node::new_scalar("v", ScalarKind::Int32),
			],
		)
		.unwrap_err();
		assert!(matches!(err, RuError::SchemaSyntax { .. }));
	}
}
