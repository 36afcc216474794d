//! `[{"py": code, "rank": order, "str": word}, ...]`, the JSON export of a
//! Handxin phrase list.

use serde::{Deserialize, Serialize};
use tracing::warn;
use udptools::{Entry, Table};

#[derive(Debug, Serialize, Deserialize)]
struct Phrase {
  py: String,
  rank: i64,
  #[serde(rename = "str")]
  word: String,
}

/// The document must be an array of phrase objects. Objects with an empty
/// field or an out-of-range rank are skipped with a warning.
pub fn parse(text: &str) -> Result<Table, serde_json::Error> {
  let phrases: Vec<Phrase> =
    serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
  let mut table = Vec::with_capacity(phrases.len());
  for (i, phrase) in phrases.into_iter().enumerate() {
    let (word, code) = (phrase.word.trim(), phrase.py.trim());
    if word.is_empty() || code.is_empty() {
      warn!(format = "json", index = i, "skipping phrase: empty code or word");
      continue;
    }
    match Entry::try_new(word, code, phrase.rank) {
      Ok(entry) => table.push(entry),
      Err(err) => {
        warn!(format = "json", index = i, "skipping phrase: {}", err)
      }
    }
  }
  Ok(table)
}

pub fn write(table: &[Entry]) -> Result<String, serde_json::Error> {
  let phrases: Vec<Phrase> = table
    .iter()
    .map(|e| Phrase {
      py: e.code.clone(),
      rank: e.order as i64,
      word: e.word.clone(),
    })
    .collect();
  let mut text = serde_json::to_string_pretty(&phrases)?;
  text.push('\n');
  Ok(text)
}
