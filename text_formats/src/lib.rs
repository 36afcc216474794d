//! Phrase table loaders and savers for the text formats of common Chinese
//! input methods, plus the `mschxudp` binary through `udp_codec`.
//!
//! Text parsing is lenient: a malformed line is logged and skipped. Binary
//! decoding is strict.

pub mod baidu;
pub mod charset;
pub mod duoduo;
pub mod json;
mod lines;
pub mod rime;
pub mod sogou;

use std::fs;
use std::io;
use std::path::Path;
use tracing::info;
use udp_codec::CodecError;
use udptools::{Entry, Table};

pub use self::charset::TextEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
  /// Also Handxin.
  Baidu,
  Sogou,
  Duoduo,
  Rime,
  /// Handxin phrases exported as a JSON array.
  Json,
  /// The `mschxudp` binary, `.dat`.
  Udp,
}

#[derive(Debug)]
pub enum LoadError {
  Io(io::Error),
  Codec(CodecError),
  Json(serde_json::Error),
}

#[derive(Debug)]
pub enum SaveError {
  Io(io::Error),
  Codec(CodecError),
  Json(serde_json::Error),
  Encoding(String),
}

impl From<io::Error> for LoadError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<CodecError> for LoadError {
  fn from(err: CodecError) -> Self {
    Self::Codec(err)
  }
}

impl From<serde_json::Error> for LoadError {
  fn from(err: serde_json::Error) -> Self {
    Self::Json(err)
  }
}

impl From<serde_json::Error> for SaveError {
  fn from(err: serde_json::Error) -> Self {
    Self::Json(err)
  }
}

impl From<io::Error> for SaveError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<CodecError> for SaveError {
  fn from(err: CodecError) -> Self {
    Self::Codec(err)
  }
}

impl std::fmt::Display for LoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(err) => write!(f, "{}", err),
      Self::Codec(err) => write!(f, "{}", err),
      Self::Json(err) => write!(f, "invalid json: {}", err),
    }
  }
}

impl std::fmt::Display for SaveError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(err) => write!(f, "{}", err),
      Self::Codec(err) => write!(f, "{}", err),
      Self::Json(err) => write!(f, "{}", err),
      Self::Encoding(err) => write!(f, "{}", err),
    }
  }
}

impl std::error::Error for LoadError {}

impl std::error::Error for SaveError {}

impl Format {
  pub const ALL: [Format; 6] = [
    Format::Baidu,
    Format::Sogou,
    Format::Duoduo,
    Format::Rime,
    Format::Json,
    Format::Udp,
  ];

  pub fn from_name(name: &str) -> Option<Self> {
    match name.to_ascii_lowercase().as_str() {
      "baidu" | "handxin" | "shouxin" => Some(Self::Baidu),
      "sogou" => Some(Self::Sogou),
      "duoduo" => Some(Self::Duoduo),
      "rime" => Some(Self::Rime),
      "json" => Some(Self::Json),
      "udp" | "ms" | "dat" => Some(Self::Udp),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Baidu => "baidu",
      Self::Sogou => "sogou",
      Self::Duoduo => "duoduo",
      Self::Rime => "rime",
      Self::Json => "json",
      Self::Udp => "udp",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      Self::Udp => "dat",
      Self::Json => "json",
      _ => "txt",
    }
  }

  /// Parses a line based text format. `None` for JSON and the binary
  /// format, which fail as a whole rather than line by line.
  pub fn parse(self, text: &str) -> Option<Table> {
    match self {
      Self::Baidu => Some(baidu::parse(text)),
      Self::Sogou => Some(sogou::parse(text)),
      Self::Duoduo => Some(duoduo::parse(text)),
      Self::Rime => Some(rime::parse(text)),
      Self::Json | Self::Udp => None,
    }
  }

  /// Renders a table in a line based text format. `None` for JSON and the
  /// binary format.
  pub fn write(self, table: &[Entry]) -> Option<String> {
    match self {
      Self::Baidu => Some(baidu::write(table)),
      Self::Sogou => Some(sogou::write(table)),
      Self::Duoduo => Some(duoduo::write(table)),
      Self::Rime => Some(rime::write(table)),
      Self::Json | Self::Udp => None,
    }
  }
}

/// Reads a whole file. Text files may be UTF-8, UTF-16 or GB18030.
pub fn load<P>(path: P, format: Format) -> Result<Table, LoadError>
where
  P: AsRef<Path>,
{
  let path = path.as_ref();
  let data = fs::read(path)?;
  let table = match format {
    Format::Udp => udp_codec::decode(&data)?,
    Format::Json => json::parse(&read_text(path, &data))?,
    _ => format.parse(&read_text(path, &data)).unwrap_or_default(),
  };
  info!(path = %path.display(), entries = table.len(), "loaded {}", format.name());
  Ok(table)
}

fn read_text(path: &Path, data: &[u8]) -> String {
  let (text, enc) = charset::decode_text(data);
  info!(path = %path.display(), encoding = enc.name(), "read text");
  text
}

fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, SaveError> {
  charset::encode_text(text, encoding).map_err(SaveError::Encoding)
}

/// Serializes the whole table before touching the file, so a failed encode
/// leaves no partial output. `encoding` applies to text formats only.
pub fn save<P>(
  path: P,
  format: Format,
  table: &[Entry],
  encoding: TextEncoding,
) -> Result<(), SaveError>
where
  P: AsRef<Path>,
{
  let path = path.as_ref();
  let data = match format {
    Format::Udp => udp_codec::encode(table)?,
    Format::Json => encode(&json::write(table)?, encoding)?,
    _ => encode(&format.write(table).unwrap_or_default(), encoding)?,
  };
  fs::write(path, data)?;
  info!(path = %path.display(), entries = table.len(), "saved {}", format.name());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::env;

  fn temp_path(name: &str) -> std::path::PathBuf {
    env::temp_dir().join(format!("udptools-{}-{}", std::process::id(), name))
  }

  #[test]
  fn sogou_to_rime_and_back() {
    let table = sogou::parse("pyd,3=你好");
    assert_eq!(table, vec![Entry::new("你好", "pyd", 3)]);
    let rime = Format::Rime.write(&table).unwrap();
    assert_eq!(rime, "你好\tpyd\t17\n");
    assert_eq!(Format::Rime.parse(&rime).unwrap(), table);
  }

  #[test]
  fn format_names() {
    for format in Format::ALL {
      assert_eq!(Format::from_name(format.name()), Some(format));
    }
    assert_eq!(Format::from_name("Handxin"), Some(Format::Baidu));
    assert_eq!(Format::from_name("MS"), Some(Format::Udp));
    assert_eq!(Format::from_name("qq"), None);
  }

  #[test]
  fn save_and_load_every_format() {
    let table = vec![
      Entry::new("你好", "nihao", 1),
      Entry::new("您好", "nihao", 2),
      Entry::new("再见", "zj", 1),
    ];
    for format in Format::ALL {
      for enc in [TextEncoding::Utf8, TextEncoding::Utf16Le] {
        let path = temp_path(&format!("{}-{}.{}", format.name(), enc.name(), format.extension()));
        save(&path, format, &table, enc).unwrap();
        let loaded = load(&path, format).unwrap();
        fs::remove_file(&path).unwrap();
        match format {
          Format::Duoduo => {
            let codes: Vec<_> = loaded.iter().map(|e| &e.code).collect();
            assert_eq!(codes, vec!["nihao", "nihao", "zj"]);
          }
          _ => assert_eq!(loaded, table),
        }
      }
    }
  }

  #[test]
  fn load_gbk_baidu() {
    let path = temp_path("gbk.ini");
    let text = "nihao=1,你好\r\nzj=2,再见\r\n";
    fs::write(&path, charset::encode_text(text, TextEncoding::Gb18030).unwrap())
      .unwrap();
    let loaded = load(&path, Format::Baidu).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(
      loaded,
      vec![Entry::new("你好", "nihao", 1), Entry::new("再见", "zj", 2)]
    );
  }

  #[test]
  fn invalid_entry_leaves_no_file() {
    let path = temp_path("bad.dat");
    let table = vec![Entry::new("你\0好", "nihao", 1)];
    assert!(matches!(
      save(&path, Format::Udp, &table, TextEncoding::Utf8),
      Err(SaveError::Codec(_))
    ));
    assert!(!path.exists());
  }

  #[test]
  fn load_utf16_json() {
    let path = temp_path("phrases.json");
    let text = "\u{feff}[{\"py\": \"nihao\", \"rank\": 2, \"str\": \"你好\"}]";
    fs::write(&path, charset::encode_text(text, TextEncoding::Utf16Le).unwrap())
      .unwrap();
    let loaded = load(&path, Format::Json).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(loaded, vec![Entry::new("你好", "nihao", 2)]);
  }

  #[test]
  fn load_rejects_bad_json() {
    let path = temp_path("bad.json");
    fs::write(&path, "nihao=1,你好\n").unwrap();
    let result = load(&path, Format::Json);
    fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(LoadError::Json(_))));
  }

  #[test]
  fn load_rejects_bad_dat() {
    let path = temp_path("garbage.dat");
    fs::write(&path, b"not a phrase file at all").unwrap();
    let result = load(&path, Format::Udp);
    fs::remove_file(&path).unwrap();
    assert!(matches!(
      result,
      Err(LoadError::Codec(CodecError::Format(_)))
    ));
  }
}
