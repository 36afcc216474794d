use linked_hash_map::LinkedHashMap;
use std::io;
use text_formats::{Format, TextEncoding};
use util::config;
use yaml_rust::{Yaml, YamlLoader};

pub const CONFIG_FILE_NAME: &str = "udpconv.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
  /// Encoding of text outputs other than Rime.
  pub encoding: TextEncoding,
  pub rime_encoding: TextEncoding,
  pub tags: TagConfig,
}

/// File name suffixes marking the format of an output, as in `foo_搜狗.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagConfig {
  pub baidu: String,
  pub sogou: String,
  pub duoduo: String,
  pub rime: String,
  pub json: String,
  pub udp: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      output: OutputConfig {
        encoding: TextEncoding::Utf16Le,
        rime_encoding: TextEncoding::Utf8,
        tags: TagConfig {
          baidu: "百度".to_owned(),
          sogou: "搜狗".to_owned(),
          duoduo: "多多".to_owned(),
          rime: "rime".to_owned(),
          json: "json".to_owned(),
          udp: "微软".to_owned(),
        },
      },
    }
  }
}

impl Config {
  pub fn tag(&self, format: Format) -> &str {
    let tags = &self.output.tags;
    match format {
      Format::Baidu => &tags.baidu,
      Format::Sogou => &tags.sogou,
      Format::Duoduo => &tags.duoduo,
      Format::Rime => &tags.rime,
      Format::Json => &tags.json,
      Format::Udp => &tags.udp,
    }
  }

  /// Encoding used when saving `format`. Ignored for the binary format.
  pub fn text_encoding(&self, format: Format) -> TextEncoding {
    match format {
      Format::Rime => self.output.rime_encoding,
      _ => self.output.encoding,
    }
  }
}

#[derive(Debug)]
pub enum ConfigError {
  Io(io::Error),
  Yaml(yaml_rust::ScanError),
  Other(String),
}

impl From<io::Error> for ConfigError {
  fn from(err: io::Error) -> Self {
    Self::Io(err)
  }
}

impl From<yaml_rust::ScanError> for ConfigError {
  fn from(err: yaml_rust::ScanError) -> Self {
    Self::Yaml(err)
  }
}

impl From<String> for ConfigError {
  fn from(err: String) -> Self {
    Self::Other(err)
  }
}

impl From<&str> for ConfigError {
  fn from(err: &str) -> Self {
    Self::Other(err.to_owned())
  }
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io(err) => write!(f, "{}", err),
      Self::Yaml(err) => write!(f, "{}", err),
      Self::Other(err) => write!(f, "{}", err),
    }
  }
}

impl std::error::Error for ConfigError {}

/// Loads `udpconv.yaml`. A missing file gives the defaults.
pub fn load_config() -> Result<Config, ConfigError> {
  match config::load_config_file(CONFIG_FILE_NAME)? {
    Some(content) => parse_config(&content),
    None => Ok(Config::default()),
  }
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
  let mut docs = YamlLoader::load_from_str(content)?;
  let mut config = Config::default();
  let doc = match docs.pop() {
    Some(doc) if !doc.is_null() => doc,
    _ => return Ok(config),
  };

  let mut obj = doc.into_hash().ok_or("toplevel is not object")?;

  // output
  if let Some(output) = obj.remove(&Yaml::String("output".to_owned())) {
    if !output.is_null() {
      let output = output.into_hash().ok_or("output is not object")?;
      config.output = load_output_config(output)?;
    }
  }

  if let Some((key, _)) = obj.pop_front() {
    return Err(format!("superfluous field {}", yaml_to_string(&key)).into());
  }

  Ok(config)
}

fn load_output_config(
  mut output: LinkedHashMap<Yaml, Yaml>,
) -> Result<OutputConfig, ConfigError> {
  let mut output_config = Config::default().output;

  if let Some(enc) = read_encoding(&mut output, "output", "encoding")? {
    output_config.encoding = enc;
  }

  if let Some(enc) = read_encoding(&mut output, "output", "rime-encoding")? {
    output_config.rime_encoding = enc;
  }

  // output.tags
  if let Some(tags) = output.remove(&Yaml::String("tags".into())) {
    if !tags.is_null() {
      let mut tags = tags.into_hash().ok_or("output.tags is not object")?;
      let tag_config = &mut output_config.tags;
      for format in Format::ALL {
        if let Some(tag) = read_tag(&mut tags, format.name())? {
          match format {
            Format::Baidu => tag_config.baidu = tag,
            Format::Sogou => tag_config.sogou = tag,
            Format::Duoduo => tag_config.duoduo = tag,
            Format::Rime => tag_config.rime = tag,
            Format::Json => tag_config.json = tag,
            Format::Udp => tag_config.udp = tag,
          }
        }
      }

      if let Some((key, _)) = tags.pop_front() {
        return Err(
          format!("superfluous field {} in output.tags", yaml_to_string(&key))
            .into(),
        );
      }
    }
  }

  if let Some((key, _)) = output.pop_front() {
    return Err(
      format!("superfluous field {} in output", yaml_to_string(&key)).into(),
    );
  }

  Ok(output_config)
}

fn read_encoding(
  obj: &mut LinkedHashMap<Yaml, Yaml>,
  ctx: impl AsRef<str>,
  name: impl ToString,
) -> Result<Option<TextEncoding>, ConfigError> {
  let ctx = ctx.as_ref();
  let name = name.to_string();

  if let Some(enc) = obj.remove(&Yaml::String(name.clone())) {
    let enc = enc
      .into_string()
      .ok_or_else(|| format!("{}.{} is not string", ctx, name))?;
    match TextEncoding::from_name(&enc) {
      Some(enc) => Ok(Some(enc)),
      None => {
        Err(format!("{}.{} is unknown encoding '{}'", ctx, name, enc).into())
      }
    }
  } else {
    Ok(None)
  }
}

fn read_tag(
  tags: &mut LinkedHashMap<Yaml, Yaml>,
  name: &str,
) -> Result<Option<String>, ConfigError> {
  if let Some(tag) = tags.remove(&Yaml::String(name.to_owned())) {
    let tag = match tag {
      Yaml::String(s) => s,
      Yaml::Integer(n) => n.to_string(),
      _ => {
        return Err(format!("output.tags.{} is not string", name).into());
      }
    };
    if tag.is_empty() || tag.contains(['/', '\\', '_']) {
      return Err(format!("output.tags.{} is invalid tag", name).into());
    }
    Ok(Some(tag))
  } else {
    Ok(None)
  }
}

fn yaml_to_string(yaml: &Yaml) -> String {
  match yaml {
    Yaml::Null => "~".to_owned(),
    Yaml::Boolean(true) => "true".to_owned(),
    Yaml::Boolean(false) => "false".to_owned(),
    Yaml::Hash(_) => "<object>".to_owned(),
    Yaml::Array(_) => "<array>".to_owned(),
    Yaml::String(s) => format!("'{}'", s.replace('\'', "\\'")),
    Yaml::Integer(n) => n.to_string(),
    Yaml::Real(n) => n.to_string(),
    _ => "<?>".to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn message(err: ConfigError) -> String {
    match err {
      ConfigError::Other(msg) => msg,
      err => panic!("unexpected error {:?}", err),
    }
  }

  #[test]
  fn empty_document() {
    assert_eq!(parse_config("").unwrap(), Config::default());
    assert_eq!(parse_config("~").unwrap(), Config::default());
    assert_eq!(parse_config("output:\n").unwrap(), Config::default());
  }

  #[test]
  fn full_document() {
    let config = parse_config(
      "output:
  encoding: UTF-8
  rime-encoding: utf-16le
  tags:
    sogou: sg
    json: js
    udp: 2018
",
    )
    .unwrap();
    assert_eq!(config.output.encoding, TextEncoding::Utf8);
    assert_eq!(config.output.rime_encoding, TextEncoding::Utf16Le);
    assert_eq!(config.tag(Format::Sogou), "sg");
    assert_eq!(config.tag(Format::Udp), "2018");
    assert_eq!(config.tag(Format::Json), "js");
    assert_eq!(config.text_encoding(Format::Json), TextEncoding::Utf8);
    assert_eq!(config.tag(Format::Baidu), "百度");
    assert_eq!(config.text_encoding(Format::Rime), TextEncoding::Utf16Le);
    assert_eq!(config.text_encoding(Format::Duoduo), TextEncoding::Utf8);
  }

  #[test]
  fn superfluous_fields() {
    assert_eq!(
      message(parse_config("input: 1").unwrap_err()),
      "superfluous field 'input'"
    );
    assert_eq!(
      message(parse_config("output:\n  color: red").unwrap_err()),
      "superfluous field 'color' in output"
    );
    assert_eq!(
      message(parse_config("output:\n  tags:\n    qq: q").unwrap_err()),
      "superfluous field 'qq' in output.tags"
    );
  }

  #[test]
  fn invalid_values() {
    assert_eq!(
      message(parse_config("- 1").unwrap_err()),
      "toplevel is not object"
    );
    assert_eq!(
      message(parse_config("output:\n  encoding: latin1").unwrap_err()),
      "output.encoding is unknown encoding 'latin1'"
    );
    assert_eq!(
      message(parse_config("output:\n  encoding: 8").unwrap_err()),
      "output.encoding is not string"
    );
    assert_eq!(
      message(parse_config("output:\n  tags:\n    rime: a_b").unwrap_err()),
      "output.tags.rime is invalid tag"
    );
  }

  #[test]
  fn bad_yaml() {
    assert!(matches!(
      parse_config("output: [").unwrap_err(),
      ConfigError::Yaml(_)
    ));
  }
}
