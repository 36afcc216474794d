use tracing::warn;
use udptools::Entry;

/// Trimmed lines worth parsing, with 1-based line numbers. Blank lines and
/// `#`/`;` comments are dropped.
pub(crate) fn phrase_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
  text
    .trim_start_matches('\u{feff}')
    .lines()
    .enumerate()
    .map(|(i, line)| (i + 1, line.trim()))
    .filter(|(_, line)| {
      !line.is_empty() && !line.starts_with('#') && !line.starts_with(';')
    })
}

pub(crate) fn skip(format: &str, line_no: usize, line: &str, reason: &str) {
  let shown: String = line.chars().take(30).collect();
  warn!(format, line = line_no, "skipping line '{}': {}", shown, reason);
}

/// Builds an entry from already split fields, warning and returning `None`
/// when a field is unusable.
pub(crate) fn entry(
  format: &str,
  line_no: usize,
  line: &str,
  word: &str,
  code: &str,
  order: &str,
) -> Option<Entry> {
  let (word, code, order) = (word.trim(), code.trim(), order.trim());
  if word.is_empty() || code.is_empty() {
    skip(format, line_no, line, "empty code or word");
    return None;
  }
  let order = match order.parse::<i64>() {
    Ok(order) => order,
    Err(_) => {
      skip(format, line_no, line, "order is not a number");
      return None;
    }
  };
  match Entry::try_new(word, code, order) {
    Ok(entry) => Some(entry),
    Err(err) => {
      skip(format, line_no, line, &err.message);
      None
    }
  }
}

/// One line per entry, each terminated by `\n`.
pub(crate) fn join<F>(table: &[Entry], f: F) -> String
where
  F: Fn(&Entry) -> String,
{
  let mut text = String::new();
  for entry in table {
    text.push_str(&f(entry));
    text.push('\n');
  }
  text
}
