use encoding::all::{GB18030, UTF_16BE, UTF_16LE, UTF_8};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
  Utf8,
  Utf16Le,
  Utf16Be,
  Gb18030,
}

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];
const UTF16LE_BOM: &[u8] = &[0xff, 0xfe];
const UTF16BE_BOM: &[u8] = &[0xfe, 0xff];

impl TextEncoding {
  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "utf-8" | "utf8" => Some(Self::Utf8),
      "utf-16le" | "utf16le" | "utf-16" => Some(Self::Utf16Le),
      "utf-16be" | "utf16be" => Some(Self::Utf16Be),
      "gb18030" | "gbk" | "gb2312" => Some(Self::Gb18030),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Utf8 => "utf-8",
      Self::Utf16Le => "utf-16le",
      Self::Utf16Be => "utf-16be",
      Self::Gb18030 => "gb18030",
    }
  }

  fn codec(self) -> EncodingRef {
    match self {
      Self::Utf8 => UTF_8,
      Self::Utf16Le => UTF_16LE,
      Self::Utf16Be => UTF_16BE,
      Self::Gb18030 => GB18030,
    }
  }
}

/// Guesses the encoding of a phrase file. Returns the encoding and the length
/// of its byte order mark, if any.
///
/// Phrase files never contain NUL, so NUL bytes mean UTF-16 even without a
/// BOM. Text that is not valid UTF-8 is taken as GB18030, which covers the
/// GBK files most Windows input methods export.
pub fn detect(bytes: &[u8]) -> (TextEncoding, usize) {
  if bytes.starts_with(UTF8_BOM) {
    return (TextEncoding::Utf8, UTF8_BOM.len());
  }
  if bytes.starts_with(UTF16LE_BOM) {
    return (TextEncoding::Utf16Le, UTF16LE_BOM.len());
  }
  if bytes.starts_with(UTF16BE_BOM) {
    return (TextEncoding::Utf16Be, UTF16BE_BOM.len());
  }

  if bytes.contains(&0) {
    let odd_zeros = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let even_zeros = bytes.iter().step_by(2).filter(|&&b| b == 0).count();
    return if odd_zeros >= even_zeros {
      (TextEncoding::Utf16Le, 0)
    } else {
      (TextEncoding::Utf16Be, 0)
    };
  }

  if std::str::from_utf8(bytes).is_ok() {
    (TextEncoding::Utf8, 0)
  } else {
    (TextEncoding::Gb18030, 0)
  }
}

/// Decodes a phrase file with the detected encoding, dropping the BOM.
/// Undecodable sequences become U+FFFD.
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
  let (enc, bom_len) = detect(bytes);
  let body = &bytes[bom_len..];
  let text = match enc.codec().decode(body, DecoderTrap::Strict) {
    Ok(text) => text,
    Err(err) => {
      warn!(encoding = enc.name(), "invalid text: {}, replacing", err);
      enc
        .codec()
        .decode(body, DecoderTrap::Replace)
        .unwrap_or_else(|s| s.into_owned())
    }
  };
  (text, enc)
}

/// Encodes text without a BOM.
pub fn encode_text(text: &str, enc: TextEncoding) -> Result<Vec<u8>, String> {
  enc
    .codec()
    .encode(text, EncoderTrap::Strict)
    .map_err(|err| format!("cannot encode as {}: {}", enc.name(), err))
}
