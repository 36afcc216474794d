use chrono::{TimeZone, Utc};
use config::Config;
use std::fs;
use std::path::{Path, PathBuf};
use text_formats::{Format, LoadError, SaveError};
use tracing::{info, warn};
use udp_codec::UdpDocument;

pub use self::variables::VariableMap;

pub mod variables;

pub struct ConvertOptions {
  pub from: Format,
  /// Every other format when empty.
  pub targets: Vec<Format>,
  /// Next to the input when `None`.
  pub out_dir: Option<PathBuf>,
  pub renumber: bool,
  /// Rewrites Handxin variables in the Microsoft output only.
  pub variables: Option<VariableMap>,
}

#[derive(Debug)]
pub enum ConvertError {
  Load(PathBuf, LoadError),
  Save(PathBuf, SaveError),
  Variables(PathBuf, csv::Error),
}

impl std::fmt::Display for ConvertError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Load(path, err) => {
        write!(f, "cannot load {}: {}", path.display(), err)
      }
      Self::Save(path, err) => {
        write!(f, "cannot save {}: {}", path.display(), err)
      }
      Self::Variables(path, err) => {
        write!(f, "cannot read variable mapping {}: {}", path.display(), err)
      }
    }
  }
}

impl std::error::Error for ConvertError {}

fn load(path: &Path, format: Format) -> Result<udptools::Table, ConvertError> {
  text_formats::load(path, format)
    .map_err(|err| ConvertError::Load(path.to_owned(), err))
}

fn save(
  path: &Path,
  format: Format,
  table: &[udptools::Entry],
  config: &Config,
) -> Result<(), ConvertError> {
  text_formats::save(path, format, table, config.text_encoding(format))
    .map_err(|err| ConvertError::Save(path.to_owned(), err))
}

/// Converts one file into every target format. Returns the written paths.
pub fn convert(
  input: &Path,
  options: &ConvertOptions,
  config: &Config,
) -> Result<Vec<PathBuf>, ConvertError> {
  let mut table = load(input, options.from)?;
  if table.is_empty() {
    warn!(path = %input.display(), "no phrases found");
  }
  if options.renumber {
    udptools::renumber_by_code(&mut table);
  }

  let targets: Vec<Format> = if options.targets.is_empty() {
    Format::ALL
      .into_iter()
      .filter(|&f| f != options.from)
      .collect()
  } else {
    options.targets.clone()
  };

  let mut written = vec![];
  for format in targets {
    let path = output_path(input, options.out_dir.as_deref(), format, config);
    match (&options.variables, format) {
      (Some(vars), Format::Udp) => {
        let mut rewritten = table.clone();
        let changed = vars.apply(&mut rewritten);
        info!(entries = changed, "rewrote dynamic variables");
        save(&path, format, &rewritten, config)?;
      }
      _ => save(&path, format, &table, config)?,
    }
    written.push(path);
  }
  Ok(written)
}

pub fn load_variables(path: &Path) -> Result<VariableMap, ConvertError> {
  let vars = VariableMap::from_path(path)
    .map_err(|err| ConvertError::Variables(path.to_owned(), err))?;
  if vars.is_empty() {
    warn!(path = %path.display(), "variable mapping is empty");
  }
  Ok(vars)
}

/// Merges `extra` into `base`, both in `format`, and saves the result to
/// `output` in the same format. Returns the merged entry count.
pub fn merge_files(
  format: Format,
  base: &Path,
  extra: &Path,
  output: &Path,
  config: &Config,
) -> Result<usize, ConvertError> {
  let base_table = load(base, format)?;
  let extra_table = load(extra, format)?;
  let base_len = base_table.len();
  let merged = udptools::merge(base_table, extra_table);
  info!(
    added = merged.len() - base_len,
    total = merged.len(),
    "merged"
  );
  save(output, format, &merged, config)?;
  Ok(merged.len())
}

/// Reads a `.dat` file for [`describe`].
pub fn read_document(path: &Path) -> Result<UdpDocument, ConvertError> {
  let data = fs::read(path)
    .map_err(|err| ConvertError::Load(path.to_owned(), err.into()))?;
  udp_codec::decode_document(data)
    .map_err(|err| ConvertError::Load(path.to_owned(), err.into()))
}

/// Human readable summary of a decoded `.dat` file.
pub fn describe(doc: &UdpDocument) -> String {
  let header = &doc.header;
  let exported = Utc
    .timestamp_opt(header.export_timestamp as i64, 0)
    .single()
    .map_or_else(
      || header.export_timestamp.to_string(),
      |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

  let mut out = format!(
    "entries:        {}\n\
     exported:       {}\n\
     offset table:   0x{:x}\n\
     records:        0x{:x}..0x{:x}\n",
    header.entry_count,
    exported,
    header.offset_table_start,
    header.record_area_start,
    header.record_area_end
  );
  for (i, (entry, offset)) in doc.table.iter().zip(&doc.offsets).enumerate() {
    out.push_str(&format!(
      "{:>6} +0x{:06x}  {}  {}  {}\n",
      i, offset, entry.code, entry.order, entry.word
    ));
  }
  out
}

/// `<stem>_<tag>.<ext>` in `out_dir`, or next to `input`. A tag already on
/// the input stem is replaced rather than stacked.
pub fn output_path(
  input: &Path,
  out_dir: Option<&Path>,
  format: Format,
  config: &Config,
) -> PathBuf {
  let stem = input
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  let stem = strip_tag(&stem, config);
  let dir = out_dir
    .map(Path::to_path_buf)
    .or_else(|| input.parent().map(Path::to_path_buf))
    .unwrap_or_default();
  dir.join(format!(
    "{}_{}.{}",
    stem,
    config.tag(format),
    format.extension()
  ))
}

fn strip_tag<'a>(stem: &'a str, config: &Config) -> &'a str {
  for format in Format::ALL {
    let tag = config.tag(format);
    if let Some(rest) = stem.strip_suffix(tag) {
      if let Some(rest) = rest.strip_suffix('_') {
        if !rest.is_empty() {
          return rest;
        }
      }
    }
  }
  stem
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::env;
  use text_formats::TextEncoding;
  use udptools::Entry;

  fn temp_dir(name: &str) -> PathBuf {
    let dir =
      env::temp_dir().join(format!("udpconv-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn output_names() {
    let config = Config::default();
    assert_eq!(
      output_path(Path::new("dir/phrases.txt"), None, Format::Udp, &config),
      Path::new("dir/phrases_微软.dat")
    );
    assert_eq!(
      output_path(
        Path::new("dir/phrases_搜狗.txt"),
        Some(Path::new("out")),
        Format::Rime,
        &config
      ),
      Path::new("out/phrases_rime.txt")
    );
    assert_eq!(
      output_path(Path::new("_百度.txt"), None, Format::Duoduo, &config),
      Path::new("_百度_多多.txt")
    );
  }

  #[test]
  fn convert_to_all_formats() {
    let dir = temp_dir("convert");
    let input = dir.join("mine_百度.txt");
    fs::write(&input, "nihao=1,你好\nnihao=1,您好\nzj=3,再见\n").unwrap();

    let config = Config::default();
    let options = ConvertOptions {
      from: Format::Baidu,
      targets: vec![],
      out_dir: None,
      renumber: true,
      variables: None,
    };
    let written = convert(&input, &options, &config).unwrap();
    assert_eq!(
      written,
      vec![
        dir.join("mine_搜狗.txt"),
        dir.join("mine_多多.txt"),
        dir.join("mine_rime.txt"),
        dir.join("mine_json.json"),
        dir.join("mine_微软.dat"),
      ]
    );

    let expected = vec![
      Entry::new("你好", "nihao", 1),
      Entry::new("您好", "nihao", 2),
      Entry::new("再见", "zj", 1),
    ];
    assert_eq!(text_formats::load(&written[0], Format::Sogou).unwrap(), expected);
    assert_eq!(text_formats::load(&written[2], Format::Rime).unwrap(), expected);
    assert_eq!(text_formats::load(&written[3], Format::Json).unwrap(), expected);
    assert_eq!(text_formats::load(&written[4], Format::Udp).unwrap(), expected);

    let rime = fs::read(&written[2]).unwrap();
    assert_eq!(
      String::from_utf8(rime).unwrap(),
      "你好\tnihao\t19\n您好\tnihao\t18\n再见\tzj\t19\n"
    );
    let sogou = fs::read(&written[0]).unwrap();
    assert_eq!(&sogou[..4], &[b'n', 0, b'i', 0]);

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn variables_only_touch_microsoft_output() {
    let dir = temp_dir("variables");
    let input = dir.join("vars.txt");
    let mapping = dir.join("variable_mapping.csv");
    fs::write(&input, "rq=1,$Y年\n").unwrap();
    fs::write(&mapping, "手心,微软\n$Y,%yyyy%\n").unwrap();

    let config = Config::default();
    let options = ConvertOptions {
      from: Format::Baidu,
      targets: vec![Format::Sogou, Format::Udp],
      out_dir: None,
      renumber: false,
      variables: Some(load_variables(&mapping).unwrap()),
    };
    let written = convert(&input, &options, &config).unwrap();
    assert_eq!(
      text_formats::load(&written[0], Format::Sogou).unwrap(),
      vec![Entry::new("$Y年", "rq", 1)]
    );
    assert_eq!(
      text_formats::load(&written[1], Format::Udp).unwrap(),
      vec![Entry::new("%yyyy%年", "rq", 1)]
    );

    assert!(matches!(
      load_variables(&dir.join("missing.csv")),
      Err(ConvertError::Variables(_, _))
    ));

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn merge_two_files() {
    let dir = temp_dir("merge");
    let config = Config::default();
    let a = dir.join("a.dat");
    let b = dir.join("b.dat");
    let out = dir.join("out.dat");
    let write = |path: &Path, table: &[Entry]| {
      text_formats::save(path, Format::Udp, table, TextEncoding::Utf8).unwrap()
    };
    write(&a, &[Entry::new("你好", "nihao", 1)]);
    write(
      &b,
      &[Entry::new("拟好", "nihao", 1), Entry::new("再见", "zj", 1)],
    );

    let count = merge_files(Format::Udp, &a, &b, &out, &config).unwrap();
    assert_eq!(count, 2);
    assert_eq!(
      text_formats::load(&out, Format::Udp).unwrap(),
      vec![Entry::new("你好", "nihao", 1), Entry::new("再见", "zj", 1)]
    );

    let doc = read_document(&out).unwrap();
    let summary = describe(&doc);
    assert!(summary.starts_with("entries:        2\n"));
    assert!(summary.contains("zj  1  再见"));

    fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn describe_lists_header_and_records() {
    let table = vec![Entry::new("你好", "nihao", 1)];
    let data = udp_codec::encode_at(&table, 0).unwrap();
    let doc = udp_codec::decode_document(data).unwrap();
    assert_eq!(
      describe(&doc),
      "entries:        1\n\
       exported:       1970-01-01 00:00:00 UTC\n\
       offset table:   0x40\n\
       records:        0x40..0x62\n     \
       0 +0x000000  nihao  1  你好\n"
    );
  }

  #[test]
  fn missing_input() {
    let config = Config::default();
    let options = ConvertOptions {
      from: Format::Udp,
      targets: vec![Format::Rime],
      out_dir: None,
      renumber: false,
      variables: None,
    };
    let err =
      convert(Path::new("/nonexistent/x.dat"), &options, &config).unwrap_err();
    assert!(matches!(err, ConvertError::Load(_, LoadError::Io(_))));
  }
}
