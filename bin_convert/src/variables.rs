//! Rewrites Handxin dynamic variables into their Microsoft equivalents.
//!
//! The mapping is a CSV file with a `手心` column holding the Handxin
//! spelling and a `微软` column holding the Microsoft one. Rows with either
//! cell empty are ignored.

use std::io;
use std::path::Path;
use udptools::Entry;

pub const HANDXIN_COLUMN: &str = "手心";
pub const MICROSOFT_COLUMN: &str = "微软";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableMap {
  /// Applied in file order.
  pairs: Vec<(String, String)>,
}

impl VariableMap {
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, csv::Error> {
    Self::from_reader(csv::Reader::from_path(path)?)
  }

  pub fn from_reader<R: io::Read>(
    mut reader: csv::Reader<R>,
  ) -> Result<Self, csv::Error> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
      headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    };
    let (Some(from), Some(to)) =
      (column(HANDXIN_COLUMN), column(MICROSOFT_COLUMN))
    else {
      return Err(csv::Error::from(io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
          "variable mapping needs '{}' and '{}' columns",
          HANDXIN_COLUMN, MICROSOFT_COLUMN
        ),
      )));
    };

    let mut pairs = vec![];
    for row in reader.records() {
      let row = row?;
      match (row.get(from).map(str::trim), row.get(to).map(str::trim)) {
        (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
          pairs.push((from.to_owned(), to.to_owned()))
        }
        _ => {}
      }
    }
    Ok(Self { pairs })
  }

  pub fn len(&self) -> usize {
    self.pairs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  /// Rewrites every word. Returns the number of entries changed.
  pub fn apply(&self, table: &mut [Entry]) -> usize {
    let mut changed = 0;
    for entry in table.iter_mut() {
      let mut word = entry.word.clone();
      for (from, to) in &self.pairs {
        if word.contains(from.as_str()) {
          word = word.replace(from.as_str(), to);
        }
      }
      if word != entry.word {
        entry.word = word;
        changed += 1;
      }
    }
    changed
  }
}
