//! `word<TAB>code<TAB>weight`, Rime's custom_phrase.txt. A larger weight
//! ranks higher, so weight and order run in opposite directions around 20.

use crate::lines::{join, phrase_lines, skip};
use udptools::{Entry, Table};

const NAME: &str = "rime";

const PIVOT: i64 = 20;

pub fn order_to_weight(order: u8) -> u32 {
  (PIVOT - order as i64).max(0) as u32
}

pub fn weight_to_order(weight: u32) -> u8 {
  (PIVOT - weight as i64).max(1) as u8
}

pub fn parse(text: &str) -> Table {
  let mut table = vec![];
  for (line_no, line) in phrase_lines(text) {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < 2 {
      skip(NAME, line_no, line, "missing tab");
      continue;
    }
    let (word, code) = (fields[0], fields[1]);
    if word.is_empty() || code.is_empty() {
      skip(NAME, line_no, line, "empty code or word");
      continue;
    }
    let weight = fields
      .get(2)
      .and_then(|w| w.parse::<u32>().ok())
      .unwrap_or(PIVOT as u32);
    table.push(Entry::new(word, code, weight_to_order(weight)));
  }
  table
}

pub fn write(table: &[Entry]) -> String {
  join(table, |e| {
    format!("{}\t{}\t{}", e.word, e.code, order_to_weight(e.order))
  })
}
