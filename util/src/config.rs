use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Locates a config file by relative name.
///
/// Search order:
/// - working directory
/// - directory of the executable
pub fn find_config_file<P>(p: P) -> io::Result<Option<PathBuf>>
where
  P: AsRef<Path>,
{
  let p = p.as_ref();
  if p.is_file() {
    return Ok(Some(PathBuf::from(p)));
  }
  let exe = env::current_exe()?;
  Ok(
    exe
      .parent()
      .map(|dir| dir.join(p))
      .filter(|path| path.is_file()),
  )
}

/// Reads a config file found by [`find_config_file`]. `Ok(None)` when the
/// file exists in neither place.
pub fn load_config_file<P>(p: P) -> io::Result<Option<String>>
where
  P: AsRef<Path>,
{
  match find_config_file(p)? {
    Some(path) => fs::read_to_string(path).map(Some),
    None => Ok(None),
  }
}
