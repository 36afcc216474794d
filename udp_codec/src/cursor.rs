//! Bounded little-endian reading and writing over in-memory buffers.

use crate::FormatError;

/// Reads from `data[pos..end]`. Positions are absolute offsets into `data`, so
/// errors point at the right place in the file.
pub struct ByteReader<'a> {
  data: &'a [u8],
  pos: usize,
  end: usize,
}

impl<'a> ByteReader<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Self {
      data,
      pos: 0,
      end: data.len(),
    }
  }

  /// A reader confined to `data[start..end]`.
  pub fn window(
    data: &'a [u8],
    start: usize,
    end: usize,
  ) -> Result<Self, FormatError> {
    if start > end || end > data.len() {
      return Err(FormatError {
        location: start.min(data.len()),
        message: format!(
          "window 0x{:x}..0x{:x} exceeds buffer of 0x{:x} bytes",
          start,
          end,
          data.len()
        ),
      });
    }
    Ok(Self {
      data,
      pos: start,
      end,
    })
  }

  pub fn pos(&self) -> usize {
    self.pos
  }

  pub fn remaining(&self) -> usize {
    self.end - self.pos
  }

  pub fn read_bytes(
    &mut self,
    len: usize,
    what: &str,
  ) -> Result<&'a [u8], FormatError> {
    if self.remaining() < len {
      return Err(FormatError {
        location: self.pos,
        message: format!(
          "unexpected EOF reading {} ({} bytes needed, {} left)",
          what,
          len,
          self.remaining()
        ),
      });
    }
    let bytes = &self.data[self.pos..self.pos + len];
    self.pos += len;
    Ok(bytes)
  }

  pub fn read_u8(&mut self, what: &str) -> Result<u8, FormatError> {
    Ok(self.read_bytes(1, what)?[0])
  }

  pub fn read_u16(&mut self, what: &str) -> Result<u16, FormatError> {
    let b = self.read_bytes(2, what)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
  }

  pub fn read_u32(&mut self, what: &str) -> Result<u32, FormatError> {
    let b = self.read_bytes(4, what)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
  }

  /// Everything up to the end of the window.
  pub fn rest(&mut self) -> &'a [u8] {
    let bytes = &self.data[self.pos..self.end];
    self.pos = self.end;
    bytes
  }
}

#[derive(Default)]
pub struct ByteWriter {
  buf: Vec<u8>,
}

impl ByteWriter {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      buf: Vec::with_capacity(capacity),
    }
  }

  pub fn len(&self) -> usize {
    self.buf.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  pub fn put_u8(&mut self, value: u8) {
    self.buf.push(value);
  }

  pub fn put_u16(&mut self, value: u16) {
    self.buf.extend_from_slice(&value.to_le_bytes());
  }

  pub fn put_u32(&mut self, value: u32) {
    self.buf.extend_from_slice(&value.to_le_bytes());
  }

  pub fn put_bytes(&mut self, bytes: &[u8]) {
    self.buf.extend_from_slice(bytes);
  }

  pub fn put_zeros(&mut self, len: usize) {
    self.buf.resize(self.buf.len() + len, 0);
  }

  /// Overwrites 4 already written bytes at `pos`.
  pub fn patch_u32(&mut self, pos: usize, value: u32) {
    self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
  }

  pub fn into_inner(self) -> Vec<u8> {
    self.buf
  }
}
