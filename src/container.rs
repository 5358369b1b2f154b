//! The facade binding a [`Header`], a parsed [`Node`] tree, a
//! [`SizeResolver`] and an [`EncodingTable`] into one load/save API.
//!
//! Mirrors the original source's `RU` class: build one with [`Container::create`]
//! to start writing, or [`Container::load`] to read an existing stream.

use std::io::{Read, Write};

use crate::compression::CompressionCodec;
use crate::cursor::ByteReader;
use crate::encoding::EncodingTable;
use crate::error::{RuError, Result};
use crate::header::Header;
use crate::resolver::SizeResolver;
use crate::schema::{self, Node};

pub struct Container {
	header: Header,
	root: Node,
	size_ref_names: Vec<String>,
	encodings: EncodingTable,
}

impl Container {
	/// Compiles `header.format` into a fresh, zero-valued node tree. The header is kept
	/// as given; `data_size` will be overwritten by [`Container::save`].
	pub fn create(header: Header) -> Result<Self> {
		let format = header.format.as_deref().unwrap_or_default();
		let parsed = schema::parse(format)?;
		Ok(Container {
			header,
			root: parsed.root,
			size_ref_names: parsed.size_refs.into_iter().collect(),
			encodings: EncodingTable::default(),
		})
	}

	/// Reads a full container: header, then the (possibly compressed) body, decoded
	/// against the schema named in `header.format`.
	///
	/// This is [`Header::load`] + [`Container::create`] + [`Container::read_body`]
	/// combined; call those directly instead when a container-level encoding override
	/// (via [`Container::set_encoding`]) must take effect before the body is decoded.
	pub fn load(io: &mut impl Read, strict: bool) -> Result<Self> {
		let header = Header::load(io, strict)?;
		let mut container = Container::create(header)?;
		container.read_body(io)?;
		Ok(container)
	}

	/// Reads exactly `header.data_size` bytes from `io`, decompresses them per
	/// `header.compress_type`, and decodes them against the already-compiled tree,
	/// using whatever encoding overrides are set at the time of the call.
	pub fn read_body(&mut self, io: &mut impl Read) -> Result<()> {
		let data_size = self.header.data_size.ok_or(RuError::MissingKey("data_size".into()))? as usize;
		let mut data_part = vec![0u8; data_size];
		read_exact_or_eof(io, &mut data_part)?;

		let body = match CompressionCodec::from_header_value(self.header.compress_type.as_deref())? {
			Some(codec) => codec.decompress(&data_part)?,
			None => data_part,
		};

		let mut resolver = SizeResolver::new(self.size_ref_names.iter().cloned());
		let mut reader = ByteReader::new(&body);
		self.root.read(&mut reader, &mut resolver, &self.encodings)?;
		Ok(())
	}

	/// Writes the body (compressing it first if `compress_type` is set), fixes up
	/// `data_size`, then writes the header followed by the body.
	pub fn save(&mut self, io: &mut impl Write) -> Result<()> {
		let mut resolver = SizeResolver::new(self.size_ref_names.iter().cloned());
		let mut body = Vec::new();
		self.root.write(&mut body, &mut resolver, &self.encodings)?;

		let write_data = match CompressionCodec::from_header_value(self.header.compress_type.as_deref())? {
			Some(codec) => codec.compress(&body)?,
			None => body,
		};

		self.header.data_size = Some(write_data.len() as u64);
		self.header.save(io)?;
		io.write_all(&write_data)?;
		Ok(())
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn header_mut(&mut self) -> &mut Header {
		&mut self.header
	}

	pub fn root(&self) -> &Node {
		&self.root
	}

	pub fn root_mut(&mut self) -> &mut Node {
		&mut self.root
	}

	/// Sets (or, with `encoding: None`, clears) the container-level encoding override
	/// for a string type code (e.g. `"NESTR"`).
	pub fn set_encoding(&mut self, type_code: &str, encoding: Option<&str>, errors: Option<&str>) {
		self.encodings.set(type_code, encoding, errors);
	}

	/// Prints the header followed by one line per leaf field, in the style of the
	/// original implementation's `dump`: arrays expand as `name[i]`, time structs
	/// collapse to their formatted timestamp, everything else as `path=value`.
	pub fn dump(&self) -> Vec<String> {
		let mut lines = self.header.dump_lines().unwrap_or_default();
		lines.push(String::new());
		dump_node(&self.root, "", &mut lines);
		lines
	}
}

fn join_path(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_owned()
	} else if name.is_empty() {
		prefix.to_owned()
	} else {
		format!("{prefix}.{name}")
	}
}

fn dump_node(node: &Node, path: &str, lines: &mut Vec<String>) {
	match &node.kind {
		crate::schema::NodeKind::Array { elements, .. } => {
			let base = join_path(path, &node.name);
			for (i, element) in elements.iter().enumerate() {
				let p = format!("{base}[{i}]");
				lines.push(p.clone());
				dump_node(element, &p, lines);
			}
		}
		crate::schema::NodeKind::Struct { members } => {
			let base = if node.name == schema::ROOT_NAME || node.name.is_empty() {
				path.to_owned()
			} else {
				join_path(path, &node.name)
			};
			if crate::time::is_time_struct(node) {
				if let Ok((y, mo, d, h, mi, s)) = crate::time::get_time_tuple(node) {
					lines.push(format!("{base}={}", crate::time::format_time_tuple(y, mo, d, h, mi, s)));
				}
				return;
			}
			for member in members {
				dump_node(member, &base, lines);
			}
		}
		crate::schema::NodeKind::Scalar { value, .. } => {
			let base = join_path(path, &node.name);
			let text = match value.as_i64() {
				Some(i) => i.to_string(),
				None => value.as_f64().unwrap().to_string(),
			};
			lines.push(format!("{base}={text}"));
		}
		crate::schema::NodeKind::StringVar { .. } | crate::schema::NodeKind::StringFixed { .. } => {
			let base = join_path(path, &node.name);
			lines.push(format!("{base}={}", node.as_str().unwrap_or_default()));
		}
	}
}

fn read_exact_or_eof(io: &mut impl Read, buf: &mut [u8]) -> Result<()> {
	let mut filled = 0;
	while filled < buf.len() {
		let n = io.read(&mut buf[filled..])?;
		if n == 0 {
			return Err(RuError::eof("container body"));
		}
		filled += n;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::header::Header;

	fn sample_header(format: &str) -> Header {
		let mut h = Header::new();
		h.global_id = Some("WNIJ".into());
		h.category = Some("TEST".into());
		h.data_id = Some("ABCDEFGH".into());
		h.data_name = Some("sample".into());
		h.format = Some(format.to_owned());
		h.header_version = Some("1".into());
		h.revision = Some("1".into());
		h.created = Header::parse_time("2024/01/01 00:00:00 GMT");
		h.announced = h.created;
		h
	}

	#[test]
	fn round_trips_a_minimal_scalar_container() {
		let header = sample_header("v:INT32");
		let mut container = Container::create(header).unwrap();
		container.root_mut().member_mut("v").unwrap().set_int(99).unwrap();

		let mut buf = Vec::new();
		container.save(&mut buf).unwrap();

		let loaded = Container::load(&mut &buf[..], true).unwrap();
		assert_eq!(loaded.root().member("v").unwrap().as_int().unwrap(), 99);
		assert_eq!(loaded.header().data_size, Some(4));
	}

	#[test]
	fn round_trips_with_gzip_compression() {
		let mut header = sample_header("v:INT32");
		header.compress_type = Some("gzip".into());
		let mut container = Container::create(header).unwrap();
		container.root_mut().member_mut("v").unwrap().set_int(12345).unwrap();

		let mut buf = Vec::new();
		container.save(&mut buf).unwrap();
		let loaded = Container::load(&mut &buf[..], true).unwrap();
		assert_eq!(loaded.root().member("v").unwrap().as_int().unwrap(), 12345);
	}

	#[test]
	fn round_trips_array_sized_by_preceding_field() {
		let header = sample_header("n:UINT8,xs:{n}UINT16");
		let mut container = Container::create(header).unwrap();
		let root = container.root_mut();
		root.member_mut("n").unwrap().set_int(3).unwrap();
		let xs = root.member_mut("xs").unwrap();
		for v in [1, 2, 3] {
			xs.push_int(v).unwrap();
		}

		let mut buf = Vec::new();
		container.save(&mut buf).unwrap();
		let loaded = Container::load(&mut &buf[..], true).unwrap();
		let xs = loaded.root().member("xs").unwrap();
		assert_eq!(xs.len().unwrap(), 3);
		assert_eq!(xs.index(1).unwrap().as_int().unwrap(), 2);
	}

	#[test]
	fn dump_formats_scalars_and_arrays() {
		let header = sample_header("n:UINT8,xs:{n}UINT16");
		let mut container = Container::create(header).unwrap();
		let root = container.root_mut();
		root.member_mut("n").unwrap().set_int(2).unwrap();
		let xs = root.member_mut("xs").unwrap();
		xs.push_int(10).unwrap();
		xs.push_int(20).unwrap();

		let lines = container.dump();
		assert!(lines.iter().any(|l| l == "n=2"));
		assert!(lines.iter().any(|l| l == "xs[0]=10"));
	}

	#[test]
	fn create_rejects_malformed_format_string() {
		let header = sample_header("v:NOTATYPE");
		let err = Container::create(header).unwrap_err();
		assert!(matches!(err, RuError::SchemaSyntax { .. }));
	}

	#[test]
	fn load_reports_truncated_body() {
		let header = sample_header("v:INT32");
		let mut container = Container::create(header).unwrap();
		let mut buf = Vec::new();
		container.save(&mut buf).unwrap();
		buf.truncate(buf.len() - 2);
		let err = Container::load(&mut &buf[..], true).unwrap_err();
		assert!(matches!(err, RuError::UnexpectedEof { .. }));
	}
}
