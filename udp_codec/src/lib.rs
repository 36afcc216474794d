//! Codec for the `mschxudp` custom phrase container.
//!
//! Layout: a 0x40-byte [`header`], an [`offsets`] table holding the start of
//! every record but the first, then one [`record`] per entry.

pub mod cursor;
mod error;
pub mod header;
pub mod offsets;
pub mod record;
mod table;

pub use self::error::*;
pub use self::header::Header;
pub use self::table::*;
pub use udptools::{Entry, Table};
