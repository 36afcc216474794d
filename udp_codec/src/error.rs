use std::fmt::{self, Display, Formatter};

pub use udptools::RangeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
  Format(FormatError),
  Encoding(EncodingError),
  Range(RangeError),
}

/// The buffer does not follow the container layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
  /// Byte offset in the buffer.
  pub location: usize,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
  /// Index of the entry in the table.
  pub entry: usize,
  pub field: Field,
  pub kind: EncodingErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Code,
  Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingErrorKind {
  Empty,
  EmbeddedNul,
  UnpairedSurrogate,
}

impl From<FormatError> for CodecError {
  fn from(err: FormatError) -> Self {
    Self::Format(err)
  }
}

impl From<EncodingError> for CodecError {
  fn from(err: EncodingError) -> Self {
    Self::Encoding(err)
  }
}

impl From<RangeError> for CodecError {
  fn from(err: RangeError) -> Self {
    Self::Range(err)
  }
}

impl Display for FormatError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "at 0x{:x}: {}", self.location, self.message)
  }
}

impl Display for Field {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Self::Code => write!(f, "code"),
      Self::Word => write!(f, "word"),
    }
  }
}

impl Display for EncodingError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let what = match self.kind {
      EncodingErrorKind::Empty => "is empty",
      EncodingErrorKind::EmbeddedNul => "contains NUL",
      EncodingErrorKind::UnpairedSurrogate => "contains unpaired surrogate",
    };
    write!(f, "entry {}: {} {}", self.entry, self.field, what)
  }
}

impl Display for CodecError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      Self::Format(err) => write!(f, "format error {}", err),
      Self::Encoding(err) => write!(f, "encoding error, {}", err),
      Self::Range(err) => write!(f, "range error, {}", err),
    }
  }
}

impl std::error::Error for FormatError {}

impl std::error::Error for EncodingError {}

impl std::error::Error for CodecError {}
