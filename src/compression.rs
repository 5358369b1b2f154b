//! Whole-body gzip/bzip2 compression, applied once over the entire in-memory body
//! buffer rather than streamed block-by-block.

use std::io::Read;

use crate::error::{RuError, Result};

/// The set of compression codecs RU recognizes for `compress_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionCodec {
	Gzip,
	Bzip2,
}

impl CompressionCodec {
	/// Resolves a `compress_type` header value. `None`/empty means "store verbatim",
	/// represented by returning `Ok(None)`; any other string is
	/// [`RuError::UnsupportedCompression`].
	pub fn from_header_value(value: Option<&str>) -> Result<Option<Self>> {
		match value {
			None | Some("") => Ok(None),
			Some("gzip") => Ok(Some(CompressionCodec::Gzip)),
			Some("bzip2") => Ok(Some(CompressionCodec::Bzip2)),
			Some(other) => Err(RuError::UnsupportedCompression(other.to_owned())),
		}
	}

	pub fn header_value(self) -> &'static str {
		match self {
			CompressionCodec::Gzip => "gzip",
			CompressionCodec::Bzip2 => "bzip2",
		}
	}

	/// Decompresses the whole `body` buffer.
	pub fn decompress(self, body: &[u8]) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		let result = match self {
			CompressionCodec::Gzip => {
				flate2::read::GzDecoder::new(body).read_to_end(&mut out)
			}
			CompressionCodec::Bzip2 => bzip2::read::BzDecoder::new(body).read_to_end(&mut out),
		};
		result.map_err(|source| RuError::Compression {
			codec: self.header_value(),
			direction: "decompression",
			source,
		})?;
		Ok(out)
	}

	/// Compresses the whole `body` buffer.
	pub fn compress(self, body: &[u8]) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		let result = match self {
			CompressionCodec::Gzip => flate2::read::GzEncoder::new(body, flate2::Compression::default())
				.read_to_end(&mut out),
			CompressionCodec::Bzip2 => {
				bzip2::read::BzEncoder::new(body, bzip2::Compression::default()).read_to_end(&mut out)
			}
		};
		result.map_err(|source| RuError::Compression {
			codec: self.header_value(),
			direction: "compression",
			source,
		})?;
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gzip_round_trips() {
		let body = b"the quick brown fox jumps over the lazy dog".repeat(4);
		let compressed = CompressionCodec::Gzip.compress(&body).unwrap();
		let decompressed = CompressionCodec::Gzip.decompress(&compressed).unwrap();
		assert_eq!(decompressed, body);
	}

	#[test]
	fn bzip2_round_trips() {
		let body = b"the quick brown fox jumps over the lazy dog".repeat(4);
		let compressed = CompressionCodec::Bzip2.compress(&body).unwrap();
		let decompressed = CompressionCodec::Bzip2.decompress(&compressed).unwrap();
		assert_eq!(decompressed, body);
	}

	#[test]
	fn unknown_codec_is_rejected() {
		assert!(matches!(
			CompressionCodec::from_header_value(Some("zstd")),
			Err(RuError::UnsupportedCompression(_))
		));
	}

	#[test]
	fn absent_and_empty_mean_no_compression() {
		assert_eq!(CompressionCodec::from_header_value(None).unwrap(), None);
		assert_eq!(CompressionCodec::from_header_value(Some("")).unwrap(), None);
	}
}
