use crate::cursor::{ByteReader, ByteWriter};
use crate::{FormatError, RangeError};

pub const MAGIC: &[u8; 8] = b"mschxudp";

/// Protocol/version words that follow the magic. Opaque, reproduced as is.
pub const VERSION: [u8; 8] = [0x02, 0x00, 0x60, 0x00, 0x01, 0x00, 0x00, 0x00];

pub const HEADER_LEN: usize = 0x40;

/// Position of `record_area_end`, back-patched with the file length on save.
pub const RECORD_AREA_END_POS: usize = 0x18;

const RESERVED_POS: usize = 0x24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
  pub offset_table_start: u32,
  pub record_area_start: u32,
  pub record_area_end: u32,
  pub entry_count: u32,
  /// Unix seconds.
  pub export_timestamp: u32,
}

impl Header {
  /// Header for a freshly encoded file. `record_area_end` is left at zero
  /// until the body is assembled.
  pub fn for_entries(
    entry_count: u32,
    export_timestamp: u32,
  ) -> Result<Self, RangeError> {
    let offset_table_start = HEADER_LEN as u32;
    let stored_offsets = entry_count.saturating_sub(1);
    let record_area_start = stored_offsets
      .checked_mul(4)
      .and_then(|len| len.checked_add(offset_table_start))
      .ok_or_else(|| RangeError {
        message: format!("{} entries do not fit in one file", entry_count),
      })?;
    Ok(Self {
      offset_table_start,
      record_area_start,
      record_area_end: 0,
      entry_count,
      export_timestamp,
    })
  }

  pub fn read(data: &[u8]) -> Result<Self, FormatError> {
    if data.len() < HEADER_LEN {
      return Err(FormatError {
        location: data.len(),
        message: format!(
          "file is {} bytes, shorter than the 0x{:x}-byte header",
          data.len(),
          HEADER_LEN
        ),
      });
    }

    let mut r = ByteReader::new(data);
    if r.read_bytes(MAGIC.len(), "magic")? != MAGIC {
      return Err(FormatError {
        location: 0,
        message: "magic mismatch, expected \"mschxudp\"".to_owned(),
      });
    }
    r.read_bytes(VERSION.len(), "version")?;

    let header = Self {
      offset_table_start: r.read_u32("offset table start")?,
      record_area_start: r.read_u32("record area start")?,
      record_area_end: r.read_u32("record area end")?,
      entry_count: r.read_u32("entry count")?,
      export_timestamp: r.read_u32("export timestamp")?,
    };
    header.validate(data.len())?;
    Ok(header)
  }

  fn validate(&self, data_len: usize) -> Result<(), FormatError> {
    if (self.offset_table_start as usize) < HEADER_LEN {
      return Err(FormatError {
        location: 0x10,
        message: format!(
          "offset table start 0x{:x} overlaps the header",
          self.offset_table_start
        ),
      });
    }
    if self.record_area_start < self.offset_table_start {
      return Err(FormatError {
        location: 0x14,
        message: format!(
          "record area start 0x{:x} precedes offset table start 0x{:x}",
          self.record_area_start, self.offset_table_start
        ),
      });
    }
    if self.record_area_end < self.record_area_start {
      return Err(FormatError {
        location: RECORD_AREA_END_POS,
        message: format!(
          "record area end 0x{:x} precedes record area start 0x{:x}",
          self.record_area_end, self.record_area_start
        ),
      });
    }
    if data_len < self.record_area_end as usize {
      return Err(FormatError {
        location: data_len,
        message: format!(
          "file is truncated, records end at 0x{:x} but file has 0x{:x} bytes",
          self.record_area_end, data_len
        ),
      });
    }
    Ok(())
  }

  pub fn write(&self, w: &mut ByteWriter) {
    w.put_bytes(MAGIC);
    w.put_bytes(&VERSION);
    w.put_u32(self.offset_table_start);
    w.put_u32(self.record_area_start);
    w.put_u32(self.record_area_end);
    w.put_u32(self.entry_count);
    w.put_u32(self.export_timestamp);
    w.put_zeros(HEADER_LEN - RESERVED_POS);
  }

  /// Length of the record area, the end sentinel of the last record. `None`
  /// when the area ends before it starts.
  pub fn record_area_len(&self) -> Option<u32> {
    self.record_area_end.checked_sub(self.record_area_start)
  }

  /// Length of the offset table. `None` when the record area starts before
  /// the table.
  pub fn offset_table_len(&self) -> Option<u32> {
    self.record_area_start.checked_sub(self.offset_table_start)
  }
}
