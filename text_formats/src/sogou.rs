//! `code,order=word`, Sogou's PhraseEdit.txt.

use crate::lines::{entry, join, phrase_lines, skip};
use udptools::{Entry, Table};

const NAME: &str = "sogou";

pub fn parse(text: &str) -> Table {
  let mut table = vec![];
  for (line_no, line) in phrase_lines(text) {
    let Some((head, word)) = line.split_once('=') else {
      skip(NAME, line_no, line, "missing '='");
      continue;
    };
    let Some((code, order)) = head.rsplit_once(',') else {
      skip(NAME, line_no, line, "missing ','");
      continue;
    };
    table.extend(entry(NAME, line_no, line, word, code, order));
  }
  table
}

pub fn write(table: &[Entry]) -> String {
  join(table, |e| format!("{},{}={}", e.code, e.order, e.word))
}
