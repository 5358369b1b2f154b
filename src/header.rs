//! The ASCII key=value preamble that precedes every RU container body.

use std::io::{Read, Write};

use chrono::NaiveDateTime;

use crate::error::{RuError, Result};

/// Bytes that open every RU container.
pub const HEADER_SIGNATURE: &[u8; 3] = b"WN\n";
/// Bytes that close the header, immediately before the body.
pub const HEADER_END_SIGNATURE: &[u8; 2] = b"\x04\x1a";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// The fixed set of RU header keys, in the order they are written.
///
/// `compress_type` is the only key that may legitimately be absent from a
/// strictly-loaded header.
const HEADER_KEYS: &[&str] = &[
	"announced",
	"created",
	"compress_type",
	"global_id",
	"category",
	"data_id",
	"data_name",
	"data_size",
	"format",
	"header_comment",
	"header_version",
	"revision",
];

fn is_optional_key(key: &str) -> bool {
	key == "compress_type"
}

/// The textual header of an RU container.
///
/// Every field is `Option` so that a strictly-loaded header can distinguish a key
/// that was present but empty from one that was never set.
#[derive(Debug, Clone, Default)]
pub struct Header {
	pub announced: Option<NaiveDateTime>,
	pub created: Option<NaiveDateTime>,
	pub compress_type: Option<String>,
	pub global_id: Option<String>,
	pub category: Option<String>,
	pub data_id: Option<String>,
	pub data_name: Option<String>,
	pub data_size: Option<u64>,
	pub format: Option<String>,
	pub header_comment: Option<String>,
	pub header_version: Option<String>,
	pub revision: Option<String>,
}

impl Header {
	/// A fresh header with the same defaults as a newly-constructed one in the
	/// original implementation: string keys empty, `data_size` zero, everything
	/// else unset.
	pub fn new() -> Self {
		Header {
			announced: None,
			created: None,
			compress_type: None,
			global_id: Some(String::new()),
			category: Some(String::new()),
			data_id: Some(String::new()),
			data_name: Some(String::new()),
			data_size: Some(0),
			format: Some(String::new()),
			header_comment: Some(String::new()),
			header_version: Some(String::new()),
			revision: Some(String::new()),
		}
	}

	/// Reads the header from `io`, consuming exactly up to and including the
	/// header end signature.
	///
	/// When `strict`, every non-optional key must have been present; otherwise
	/// missing keys are left unset.
	pub fn load(io: &mut impl Read, strict: bool) -> Result<Self> {
		let mut signature = [0u8; 3];
		read_exact_or_eof(io, &mut signature, "header signature")?;
		if &signature != HEADER_SIGNATURE {
			return Err(RuError::NoHeader);
		}

		let mut lines = Vec::new();
		loop {
			let mut byte = [0u8; 1];
			let n = io.read(&mut byte)?;
			if n == 0 {
				return Err(RuError::eof("RU header (before end signature)"));
			}
			lines.push(byte[0]);
			if lines.len() >= HEADER_END_SIGNATURE.len()
				&& &lines[lines.len() - HEADER_END_SIGNATURE.len()..] == HEADER_END_SIGNATURE
			{
				lines.truncate(lines.len() - HEADER_END_SIGNATURE.len());
				break;
			}
		}

		let mut header = Header {
			announced: None,
			created: None,
			compress_type: None,
			global_id: None,
			category: None,
			data_id: None,
			data_name: None,
			data_size: None,
			format: None,
			header_comment: None,
			header_version: None,
			revision: None,
		};

		let text = std::str::from_utf8(&lines)
			.map_err(|_| RuError::invalid_header("header", "not valid ASCII/UTF-8"))?;
		let mut raw_lines = text.split('\n');
		while let Some(first) = raw_lines.next() {
			let mut line = first.to_owned();
			while line.ends_with('\\') {
				let continuation = raw_lines
					.next()
					.ok_or_else(|| RuError::eof("header continuation line"))?;
				line.pop();
				line.push_str(continuation);
			}
			let (key, value) = match line.find('=') {
				Some(pos) => (line[..pos].trim(), line[pos + 1..].trim()),
				None => (line.trim(), ""),
			};
			if key.is_empty() {
				continue;
			}
			if !HEADER_KEYS.contains(&key) {
				return Err(RuError::UnknownKey(key.to_owned()));
			}
			header.set_raw(key, value)?;
		}

		if strict {
			for &key in HEADER_KEYS {
				if !is_optional_key(key) && header.get_raw_is_unset(key) {
					return Err(RuError::MissingKey(key.into()));
				}
			}
		}

		Ok(header)
	}

	/// Writes the header to `io`, in the canonical key order, followed by the
	/// header end signature.
	pub fn save(&self, io: &mut impl Write) -> Result<()> {
		io.write_all(HEADER_SIGNATURE)?;
		for &key in HEADER_KEYS {
			let value = match self.raw_value(key)? {
				Some(v) => v,
				None if is_optional_key(key) => continue,
				None => return Err(RuError::MissingValue(key.into())),
			};
			if key == "global_id" || key == "category" {
				check_len(key, &value, 4)?;
			} else if key == "data_id" {
				check_len(key, &value, 8)?;
			}
			io.write_all(key.as_bytes())?;
			io.write_all(b"=")?;
			io.write_all(value.as_bytes())?;
			io.write_all(b"\n")?;
		}
		io.write_all(HEADER_END_SIGNATURE)?;
		Ok(())
	}

	/// Parses a timestamp in the `YYYY/MM/DD HH:MM:SS` form used by `announced`
	/// and `created` (a trailing ` GMT` suffix, if present, is ignored, since RU
	/// timestamps are always implicitly GMT).
	pub fn parse_time(s: &str) -> Option<NaiveDateTime> {
		let trimmed = s.trim_end_matches("GMT").trim_end();
		NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).ok()
	}

	fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
		match key {
			"announced" | "created" => {
				let time = Self::parse_time(value).ok_or_else(|| {
					RuError::invalid_header(key.to_owned(), "not a parseable timestamp")
				})?;
				if key == "announced" {
					self.announced = Some(time);
				} else {
					self.created = Some(time);
				}
			}
			"data_size" => {
				let n: u64 = value
					.parse()
					.map_err(|_| RuError::invalid_header(key.to_owned(), "not an integer"))?;
				self.data_size = Some(n);
			}
			"compress_type" => self.compress_type = Some(value.to_owned()),
			"global_id" => {
				check_len(key, value, 4)?;
				self.global_id = Some(value.to_owned());
			}
			"category" => {
				check_len(key, value, 4)?;
				self.category = Some(value.to_owned());
			}
			"data_id" => {
				check_len(key, value, 8)?;
				self.data_id = Some(value.to_owned());
			}
			"data_name" => self.data_name = Some(value.to_owned()),
			"format" => self.format = Some(value.to_owned()),
			"header_comment" => self.header_comment = Some(value.to_owned()),
			"header_version" => self.header_version = Some(value.to_owned()),
			"revision" => self.revision = Some(value.to_owned()),
			_ => unreachable!("key already validated against HEADER_KEYS"),
		}
		Ok(())
	}

	fn get_raw_is_unset(&self, key: &str) -> bool {
		match key {
			"announced" => self.announced.is_none(),
			"created" => self.created.is_none(),
			"compress_type" => self.compress_type.is_none(),
			"global_id" => self.global_id.is_none(),
			"category" => self.category.is_none(),
			"data_id" => self.data_id.is_none(),
			"data_name" => self.data_name.is_none(),
			"data_size" => self.data_size.is_none(),
			"format" => self.format.is_none(),
			"header_comment" => self.header_comment.is_none(),
			"header_version" => self.header_version.is_none(),
			"revision" => self.revision.is_none(),
			_ => unreachable!(),
		}
	}

	fn raw_value(&self, key: &str) -> Result<Option<String>> {
		Ok(match key {
			"announced" => self.announced.map(|t| format!("{} GMT", t.format(TIMESTAMP_FORMAT))),
			"created" => self.created.map(|t| format!("{} GMT", t.format(TIMESTAMP_FORMAT))),
			"compress_type" => self.compress_type.clone(),
			"global_id" => self.global_id.clone(),
			"category" => self.category.clone(),
			"data_id" => self.data_id.clone(),
			"data_name" => self.data_name.clone(),
			"data_size" => self.data_size.map(|n| n.to_string()),
			"format" => self.format.clone(),
			"header_comment" => self.header_comment.clone(),
			"header_version" => self.header_version.clone(),
			"revision" => self.revision.clone(),
			_ => unreachable!(),
		})
	}

	/// Formats the header the way [`Container::dump`](crate::container::Container::dump)
	/// does, one `key=value` line per set key.
	pub fn dump_lines(&self) -> Result<Vec<String>> {
		let mut out = Vec::with_capacity(HEADER_KEYS.len());
		for &key in HEADER_KEYS {
			if let Some(value) = self.raw_value(key)? {
				out.push(format!("{key}={value}"));
			}
		}
		Ok(out)
	}
}

fn check_len(key: &str, value: &str, expected: usize) -> Result<()> {
	if value.len() != expected {
		return Err(RuError::BadLength {
			key: key.to_owned().into(),
			expected,
			actual: value.len(),
		});
	}
	Ok(())
}

fn read_exact_or_eof(io: &mut impl Read, buf: &mut [u8], what: &'static str) -> Result<()> {
	let mut filled = 0;
	while filled < buf.len() {
		let n = io.read(&mut buf[filled..])?;
		if n == 0 {
			return Err(RuError::eof(what));
		}
		filled += n;
	}
	Ok(())
}
