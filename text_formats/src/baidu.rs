//! `code=order,word`, used by Baidu and Handxin.

use crate::lines::{entry, join, phrase_lines, skip};
use udptools::{Entry, Table};

const NAME: &str = "baidu";

pub fn parse(text: &str) -> Table {
  let mut table = vec![];
  for (line_no, line) in phrase_lines(text) {
    let Some((code, rest)) = line.split_once('=') else {
      skip(NAME, line_no, line, "missing '='");
      continue;
    };
    let Some((order, word)) = rest.split_once(',') else {
      skip(NAME, line_no, line, "missing ','");
      continue;
    };
    table.extend(entry(NAME, line_no, line, word, code, order));
  }
  table
}

pub fn write(table: &[Entry]) -> String {
  join(table, |e| format!("{}={},{}", e.code, e.order, e.word))
}
