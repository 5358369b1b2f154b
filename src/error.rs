use std::borrow::Cow;

/// Any error that may happen while reading, writing, or building an RU container.
#[derive(Debug, thiserror::Error)]
pub enum RuError {
	/// The input does not begin with the `WN\n` signature
	#[error("input does not begin with the RU header signature")]
	NoHeader,

	/// End of input reached before the header sentinel, or before a length-delimited
	/// value was fully read
	#[error("unexpected end of input{}", context_suffix(.context))]
	UnexpectedEof { context: Option<Cow<'static, str>> },

	/// A header line could not be parsed (malformed timestamp, non-integer `data_size`, ...)
	#[error("invalid header field `{key}`: {reason}")]
	InvalidHeader {
		key: Cow<'static, str>,
		reason: Cow<'static, str>,
	},

	/// A non-optional header key was absent during a strict load
	#[error("missing required header key `{0}`")]
	MissingKey(Cow<'static, str>),

	/// A non-optional header key has no value set when saving
	#[error("header key `{0}` must be set before saving")]
	MissingValue(Cow<'static, str>),

	/// A header line's key is not one of the recognized RU header keys
	#[error("unknown header key `{0}`")]
	UnknownKey(String),

	/// A fixed-length header tag (`global_id`, `category`, `data_id`) has the wrong length
	#[error("header key `{key}` must be exactly {expected} bytes, got {actual}")]
	BadLength {
		key: Cow<'static, str>,
		expected: usize,
		actual: usize,
	},

	/// The schema string could not be parsed
	#[error("schema syntax error at byte {position}: {reason} (consumed so far: {consumed:?})")]
	SchemaSyntax {
		position: usize,
		reason: Cow<'static, str>,
		consumed: String,
	},

	/// An array's size spec refers to a name that was never declared in the schema
	#[error("array size reference `{0}` is not a known field name")]
	UnknownSizeRef(String),

	/// An array's size spec refers to a name whose value has not yet been read/set
	#[error("array size reference `{0}` has not been set yet")]
	UnsetSizeRef(String),

	/// Number of elements written to an array does not match its resolved size
	#[error("array `{name}` expected {expected} elements, got {actual}")]
	ArraySizeMismatch {
		name: String,
		expected: usize,
		actual: usize,
	},

	/// `compress_type` names a codec this crate does not implement
	#[error("unsupported compression type `{0}`")]
	UnsupportedCompression(String),

	/// The (de)compression codec itself reported a failure
	#[error("{codec} {direction} failed: {source}")]
	Compression {
		codec: &'static str,
		direction: &'static str,
		#[source]
		source: std::io::Error,
	},

	/// A string's bytes could not be decoded/encoded under the selected encoding policy
	#[error("{operation} of string field `{field}` under encoding `{encoding}` failed")]
	EncodingFailed {
		field: String,
		encoding: Cow<'static, str>,
		operation: &'static str,
	},

	/// An access or assignment was attempted against the wrong node kind
	#[error("type mismatch on field `{field}`: expected {expected}, found {found}")]
	TypeMismatch {
		field: String,
		expected: &'static str,
		found: &'static str,
	},

	/// A dotted-path segment or array index did not resolve to an existing node
	#[error("path segment `{0}` not found")]
	IndexOutOfRange(String),

	/// A time-struct's member values do not form a valid calendar date/time
	#[error("invalid date/time in struct `{struct_name}`: {reason}")]
	InvalidDateTime {
		struct_name: String,
		reason: Cow<'static, str>,
	},

	/// Propagated I/O failure from the underlying stream
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

fn context_suffix(context: &Option<Cow<'static, str>>) -> String {
	match context {
		Some(c) => format!(" while reading {c}"),
		None => String::new(),
	}
}

impl RuError {
	pub(crate) fn eof(context: impl Into<Cow<'static, str>>) -> Self {
		RuError::UnexpectedEof {
			context: Some(context.into()),
		}
	}

	pub(crate) fn invalid_header(
		key: impl Into<Cow<'static, str>>,
		reason: impl Into<Cow<'static, str>>,
	) -> Self {
		RuError::InvalidHeader {
			key: key.into(),
			reason: reason.into(),
		}
	}
}

/// Convenience alias used throughout this crate
pub type Result<T> = std::result::Result<T, RuError>;
