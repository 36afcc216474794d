use crate::cursor::{ByteReader, ByteWriter};
use crate::header::Header;
use crate::{FormatError, RangeError};

/// Reads the offset table and returns the record boundaries, relative to
/// `record_area_start`: the implicit 0 of the first record, the stored
/// offsets, and the end sentinel derived from `record_area_end`. That is
/// `entry_count + 1` values, or none for an empty file.
///
/// Besides the compact layout (`entry_count - 1` stored offsets) this accepts
/// files whose offset table also stores the leading 0.
pub fn read_offsets(
  data: &[u8],
  header: &Header,
) -> Result<Vec<u32>, FormatError> {
  let count = header.entry_count as u64;
  if count == 0 {
    return Ok(vec![]);
  }

  let table_len = header.offset_table_len().ok_or_else(|| FormatError {
    location: 0x14,
    message: format!(
      "record area start 0x{:x} precedes offset table start 0x{:x}",
      header.record_area_start, header.offset_table_start
    ),
  })? as u64;
  let area_len = header.record_area_len().ok_or_else(|| FormatError {
    location: 0x18,
    message: format!(
      "record area end 0x{:x} precedes record area start 0x{:x}",
      header.record_area_end, header.record_area_start
    ),
  })?;
  let explicit_first = if table_len == 4 * (count - 1) {
    false
  } else if table_len == 4 * count {
    true
  } else {
    return Err(FormatError {
      location: header.offset_table_start as usize,
      message: format!(
        "offset table of {} bytes does not match {} entries",
        table_len, count
      ),
    });
  };

  let mut r = ByteReader::window(
    data,
    header.offset_table_start as usize,
    header.record_area_start as usize,
  )?;

  if explicit_first {
    let pos = r.pos();
    let first = r.read_u32("offset")?;
    if first != 0 {
      return Err(FormatError {
        location: pos,
        message: format!("first record offset is 0x{:x}, expected 0", first),
      });
    }
  }

  let mut offsets = Vec::with_capacity(count as usize + 1);
  offsets.push(0);
  for _ in 1..count {
    offsets.push(r.read_u32("offset")?);
  }
  offsets.push(area_len);

  for (i, pair) in offsets.windows(2).enumerate() {
    if pair[1] <= pair[0] {
      return Err(FormatError {
        location: header.offset_table_start as usize + 4 * i,
        message: format!(
          "record {} ends at 0x{:x}, not after its start 0x{:x}",
          i, pair[1], pair[0]
        ),
      });
    }
  }

  Ok(offsets)
}

/// Writes the start offset of every record but the first, given the byte
/// length of each record.
pub fn write_offsets(
  w: &mut ByteWriter,
  record_lens: &[usize],
) -> Result<(), RangeError> {
  let mut offset: u32 = 0;
  for &len in record_lens.iter().take(record_lens.len().saturating_sub(1)) {
    offset = u32::try_from(len)
      .ok()
      .and_then(|len| offset.checked_add(len))
      .ok_or_else(|| RangeError {
        message: "record area exceeds 4 GiB".to_owned(),
      })?;
    w.put_u32(offset);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::HEADER_LEN;
  use pretty_assertions::assert_eq;

  fn file(header: &Header, offsets: &[u32]) -> Vec<u8> {
    let mut w = ByteWriter::default();
    header.write(&mut w);
    for &o in offsets {
      w.put_u32(o);
    }
    w.put_zeros(header.record_area_end as usize - w.len());
    w.into_inner()
  }

  fn header(count: u32, stored: u32, area_len: u32) -> Header {
    Header {
      offset_table_start: HEADER_LEN as u32,
      record_area_start: HEADER_LEN as u32 + 4 * stored,
      record_area_end: HEADER_LEN as u32 + 4 * stored + area_len,
      entry_count: count,
      export_timestamp: 0,
    }
  }

  #[test]
  fn write_skips_last_record() {
    let mut w = ByteWriter::default();
    write_offsets(&mut w, &[30, 24, 40]).unwrap();
    assert_eq!(w.into_inner(), vec![30, 0, 0, 0, 54, 0, 0, 0]);
  }

  #[test]
  fn single_record_writes_nothing() {
    let mut w = ByteWriter::default();
    write_offsets(&mut w, &[30]).unwrap();
    assert!(w.is_empty());
  }

  #[test]
  fn compact_layout() {
    let h = header(3, 2, 90);
    let data = file(&h, &[30, 54]);
    assert_eq!(read_offsets(&data, &h).unwrap(), vec![0, 30, 54, 90]);
  }

  #[test]
  fn single_entry_uses_sentinel() {
    let h = header(1, 0, 34);
    let data = file(&h, &[]);
    assert_eq!(read_offsets(&data, &h).unwrap(), vec![0, 34]);
  }

  #[test]
  fn explicit_first_offset() {
    let h = header(3, 3, 90);
    let data = file(&h, &[0, 30, 54]);
    assert_eq!(read_offsets(&data, &h).unwrap(), vec![0, 30, 54, 90]);

    let data = file(&h, &[4, 30, 54]);
    assert!(read_offsets(&data, &h).is_err());
  }

  #[test]
  fn offsets_must_increase() {
    let h = header(3, 2, 90);
    let data = file(&h, &[54, 30]);
    let err = read_offsets(&data, &h).unwrap_err();
    assert_eq!(err.location, HEADER_LEN + 4);

    let data = file(&h, &[30, 90]);
    assert!(read_offsets(&data, &h).is_err());
  }

  #[test]
  fn unvalidated_header_is_rejected() {
    let mut h = header(2, 1, 60);
    let data = file(&h, &[30]);
    h.record_area_start = h.offset_table_start - 4;
    let err = read_offsets(&data, &h).unwrap_err();
    assert_eq!(err.location, 0x14);

    let mut h = header(2, 1, 60);
    h.record_area_end = h.record_area_start - 1;
    let err = read_offsets(&data, &h).unwrap_err();
    assert_eq!(err.location, 0x18);
  }

  #[test]
  fn mismatched_table_size() {
    let h = header(2, 3, 60);
    let data = file(&h, &[30, 40, 50]);
    assert!(read_offsets(&data, &h).is_err());
  }
}
