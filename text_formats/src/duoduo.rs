//! `word<TAB>code`. No rank is stored; loaded entries get order 1.

use crate::lines::{join, phrase_lines, skip};
use udptools::{Entry, Table};

const NAME: &str = "duoduo";

pub fn parse(text: &str) -> Table {
  let mut table = vec![];
  for (line_no, line) in phrase_lines(text) {
    let mut fields = line.split('\t');
    let (word, code) = match (fields.next(), fields.next()) {
      (Some(word), Some(code)) => (word.trim(), code.trim()),
      _ => {
        skip(NAME, line_no, line, "missing tab");
        continue;
      }
    };
    if word.is_empty() || code.is_empty() {
      skip(NAME, line_no, line, "empty code or word");
      continue;
    }
    table.push(Entry::new(word, code, 1));
  }
  table
}

pub fn write(table: &[Entry]) -> String {
  join(table, |e| format!("{}\t{}", e.word, e.code))
}
