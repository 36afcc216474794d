use crate::cursor::{ByteReader, ByteWriter};
use crate::{
  CodecError, EncodingError, EncodingErrorKind, Field, FormatError, RangeError,
};
use std::ops::Range;
use udptools::Entry;
use widestring::Utf16String;

pub const RECORD_MAGIC: [u8; 4] = [0x10, 0x00, 0x10, 0x00];

pub const RECORD_PAD: u8 = 0x06;

/// Bytes counted by the code length field besides the code itself: magic,
/// the length field, order, pad, reserved, timestamp and the code terminator.
pub const CODE_FIELD_OVERHEAD: usize = 18;

const TERMINATOR: [u8; 2] = [0, 0];

/// Serializes the entry at `index` of its table.
pub fn encode_record(
  entry: &Entry,
  index: usize,
  timestamp: u32,
) -> Result<Vec<u8>, CodecError> {
  let code = to_utf16le(&entry.code, index, Field::Code)?;
  let word = to_utf16le(&entry.word, index, Field::Word)?;
  let code_field_len = u16::try_from(code.len() + CODE_FIELD_OVERHEAD)
    .map_err(|_| RangeError {
      message: format!(
        "entry {}: code of {} bytes is too long for its length field",
        index,
        code.len()
      ),
    })?;

  let mut w = ByteWriter::with_capacity(
    code_field_len as usize + word.len() + TERMINATOR.len(),
  );
  w.put_bytes(&RECORD_MAGIC);
  w.put_u16(code_field_len);
  w.put_u8(entry.order);
  w.put_u8(RECORD_PAD);
  w.put_zeros(4);
  w.put_u32(timestamp);
  w.put_bytes(&code);
  w.put_bytes(&TERMINATOR);
  w.put_bytes(&word);
  w.put_bytes(&TERMINATOR);
  Ok(w.into_inner())
}

/// Decodes the record occupying `window` of `data`.
pub fn decode_record(
  data: &[u8],
  window: Range<usize>,
  index: usize,
) -> Result<Entry, CodecError> {
  let mut r = ByteReader::window(data, window.start, window.end)?;

  if r.read_bytes(RECORD_MAGIC.len(), "record magic")? != RECORD_MAGIC {
    return Err(
      FormatError {
        location: window.start,
        message: format!("record {} has a bad magic", index),
      }
      .into(),
    );
  }

  let len_pos = r.pos();
  let code_field_len = r.read_u16("code length")? as usize;
  if code_field_len < CODE_FIELD_OVERHEAD {
    return Err(
      FormatError {
        location: len_pos,
        message: format!(
          "record {}: code length {} is below the minimum {}",
          index, code_field_len, CODE_FIELD_OVERHEAD
        ),
      }
      .into(),
    );
  }
  let code_len = code_field_len - CODE_FIELD_OVERHEAD;
  if code_len % 2 != 0 {
    return Err(
      FormatError {
        location: len_pos,
        message: format!("record {}: code length {} is odd", index, code_len),
      }
      .into(),
    );
  }

  let order = r.read_u8("order")?;
  // pad, reserved and timestamp
  r.read_bytes(1 + 4 + 4, "record header")?;
  let code = r.read_bytes(code_len, "code")?;
  r.read_bytes(TERMINATOR.len(), "code terminator")?;

  let word_pos = r.pos();
  let word = word_span(r.rest());
  if word.len() % 2 != 0 {
    return Err(
      FormatError {
        location: word_pos,
        message: format!("record {}: word has an odd byte length", index),
      }
      .into(),
    );
  }

  Ok(Entry {
    word: from_utf16le(word, index, Field::Word)?,
    code: from_utf16le(code, index, Field::Code)?,
    order,
  })
}

/// The bytes before the first zero code unit, or all of them.
fn word_span(bytes: &[u8]) -> &[u8] {
  let end = bytes
    .chunks_exact(2)
    .position(|unit| unit == &TERMINATOR[..])
    .map_or(bytes.len(), |i| i * 2);
  &bytes[..end]
}

fn to_utf16le(
  s: &str,
  entry: usize,
  field: Field,
) -> Result<Vec<u8>, EncodingError> {
  let kind = if s.is_empty() {
    EncodingErrorKind::Empty
  } else if s.contains('\0') {
    EncodingErrorKind::EmbeddedNul
  } else {
    let units = Utf16String::from_str(s).into_vec();
    return Ok(units.iter().flat_map(|u| u.to_le_bytes()).collect());
  };
  Err(EncodingError { entry, field, kind })
}

fn from_utf16le(
  bytes: &[u8],
  entry: usize,
  field: Field,
) -> Result<String, EncodingError> {
  let units: Vec<u16> = bytes
    .chunks_exact(2)
    .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
    .collect();
  Utf16String::from_vec(units)
    .map(|s| s.to_string())
    .map_err(|_| EncodingError {
      entry,
      field,
      kind: EncodingErrorKind::UnpairedSurrogate,
    })
}
