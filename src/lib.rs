use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};

/// One custom phrase: the candidate `word` shown for the input `code`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
  pub word: String,
  pub code: String,
  /// Candidate rank. Passed through unchanged by every codec.
  pub order: u8,
}

/// Phrase table. The sequence order is the on-disk record order.
pub type Table = Vec<Entry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
  pub message: String,
}

impl Display for RangeError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

impl std::error::Error for RangeError {}

impl Entry {
  pub fn new(word: impl Into<String>, code: impl Into<String>, order: u8) -> Self {
    Self {
      word: word.into(),
      code: code.into(),
      order,
    }
  }

  pub fn try_new(
    word: impl Into<String>,
    code: impl Into<String>,
    order: i64,
  ) -> Result<Self, RangeError> {
    let order = u8::try_from(order).map_err(|_| RangeError {
      message: format!("order {} is out of range [0, 255]", order),
    })?;
    Ok(Self::new(word, code, order))
  }
}

/// Keeps every entry of `base`, then appends the entries of `extra` whose
/// `(code, order)` pair has not been seen yet.
pub fn merge(base: Table, extra: Table) -> Table {
  let mut seen: HashSet<(String, u8)> = base
    .iter()
    .map(|e| (e.code.clone(), e.order))
    .collect();
  let mut table = base;
  for entry in extra {
    if seen.insert((entry.code.clone(), entry.order)) {
      table.push(entry);
    }
  }
  table
}

/// Rewrites `order` as a 1-based counter per code, following table order.
pub fn renumber_by_code(table: &mut Table) {
  let mut counter: HashMap<String, u8> = HashMap::new();
  for entry in table.iter_mut() {
    let n = counter.entry(entry.code.clone()).or_insert(0);
    *n = n.saturating_add(1);
    entry.order = *n;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn try_new_rejects_out_of_range_order() {
    assert!(Entry::try_new("你好", "nh", 255).is_ok());
    assert!(Entry::try_new("你好", "nh", 256).is_err());
    assert!(Entry::try_new("你好", "nh", -1).is_err());
  }

  #[test]
  fn merge_skips_duplicate_code_order() {
    let a = vec![Entry::new("你好", "nh", 1), Entry::new("您好", "nh", 2)];
    let b = vec![
      Entry::new("拟好", "nh", 1),
      Entry::new("你们", "nm", 1),
      Entry::new("你们好", "nm", 1),
    ];
    assert_eq!(
      merge(a, b),
      vec![
        Entry::new("你好", "nh", 1),
        Entry::new("您好", "nh", 2),
        Entry::new("你们", "nm", 1),
      ]
    );
  }

  #[test]
  fn renumber_counts_per_code() {
    let mut table = vec![
      Entry::new("啊", "a", 1),
      Entry::new("吧", "b", 1),
      Entry::new("阿", "a", 1),
      Entry::new("爸", "b", 9),
      Entry::new("嗄", "a", 1),
    ];
    renumber_by_code(&mut table);
    let orders: Vec<_> = table.iter().map(|e| e.order).collect();
    assert_eq!(orders, vec![1, 1, 2, 2, 3]);
  }

  #[test]
  fn renumber_saturates() {
    let mut table = vec![Entry::new("啊", "a", 0); 300];
    renumber_by_code(&mut table);
    assert_eq!(table[254].order, 255);
    assert_eq!(table[299].order, 255);
  }
}
