use crate::cursor::ByteWriter;
use crate::header::{Header, HEADER_LEN, RECORD_AREA_END_POS};
use crate::{offsets, record, CodecError, RangeError};
use chrono::Utc;
use tracing::debug;
use udptools::{Entry, Table};

/// A decoded `.dat` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpDocument {
  pub header: Header,
  /// Record boundaries relative to `header.record_area_start`.
  pub offsets: Vec<u32>,
  pub table: Table,
}

pub fn decode(data: impl AsRef<[u8]>) -> Result<Table, CodecError> {
  Ok(decode_document(data)?.table)
}

pub fn decode_document(
  data: impl AsRef<[u8]>,
) -> Result<UdpDocument, CodecError> {
  let data = data.as_ref();
  let header = Header::read(data)?;
  let offsets = offsets::read_offsets(data, &header)?;

  let base = header.record_area_start as usize;
  let table = offsets
    .windows(2)
    .enumerate()
    .map(|(i, w)| {
      record::decode_record(data, base + w[0] as usize..base + w[1] as usize, i)
    })
    .collect::<Result<Table, _>>()?;

  debug!(
    entries = table.len(),
    export_timestamp = header.export_timestamp,
    "decoded phrase table"
  );

  Ok(UdpDocument {
    header,
    offsets,
    table,
  })
}

/// Encodes with the current time as export and record timestamp.
pub fn encode(table: &[Entry]) -> Result<Vec<u8>, CodecError> {
  let now = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
  encode_at(table, now)
}

/// Every entry is serialized before the output buffer is assembled, so an
/// invalid entry fails the call without producing any bytes.
pub fn encode_at(table: &[Entry], timestamp: u32) -> Result<Vec<u8>, CodecError> {
  let entry_count = u32::try_from(table.len()).map_err(|_| RangeError {
    message: format!("{} entries do not fit in one file", table.len()),
  })?;

  let records = table
    .iter()
    .enumerate()
    .map(|(i, entry)| record::encode_record(entry, i, timestamp))
    .collect::<Result<Vec<_>, _>>()?;
  let record_lens: Vec<usize> = records.iter().map(Vec::len).collect();

  let header = Header::for_entries(entry_count, timestamp)?;
  let total_len = header.record_area_start as usize
    + record_lens.iter().sum::<usize>();
  let total_len_u32 = u32::try_from(total_len).map_err(|_| RangeError {
    message: format!("file of {} bytes exceeds 4 GiB", total_len),
  })?;

  let mut w = ByteWriter::with_capacity(total_len.max(HEADER_LEN));
  header.write(&mut w);
  offsets::write_offsets(&mut w, &record_lens)?;
  for blob in &records {
    w.put_bytes(blob);
  }
  w.patch_u32(RECORD_AREA_END_POS, total_len_u32);

  debug!(entries = table.len(), bytes = total_len, "encoded phrase table");

  Ok(w.into_inner())
}
