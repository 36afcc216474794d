use bin_convert::ConvertOptions;
use clap::{crate_version, Arg, ArgMatches, Command};
use std::error::Error;
use std::path::{Path, PathBuf};
use text_formats::Format;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
  let matches = Command::new("udpconv")
    .version(crate_version!())
    .about("Convert custom phrase tables between input methods")
    .subcommand_required(true)
    .arg_required_else_help(true)
    .arg(
      Arg::new("verbose")
        .short('v')
        .long("verbose")
        .multiple_occurrences(true)
        .help("log more, repeat for debug output"),
    )
    .subcommand(
      Command::new("convert")
        .about("Convert a phrase file into other formats")
        .arg(format_arg())
        .arg(
          Arg::new("to")
            .short('t')
            .long("to")
            .value_name("FORMAT")
            .help("target format, repeatable; every other format if omitted")
            .takes_value(true)
            .multiple_occurrences(true)
            .validator(validate_format),
        )
        .arg(
          Arg::new("output")
            .short('o')
            .long("output")
            .value_name("DIR")
            .help("directory for converted files")
            .takes_value(true),
        )
        .arg(
          Arg::new("variables")
            .long("variables")
            .value_name("CSV")
            .help(
              "rewrite Handxin variables in the Microsoft output, \
               using a mapping with 手心 and 微软 columns",
            )
            .takes_value(true),
        )
        .arg(
          Arg::new("renumber")
            .long("renumber")
            .help("renumber candidate orders per code"),
        )
        .arg(Arg::new("FILE").help("source phrase file").required(true)),
    )
    .subcommand(
      Command::new("merge")
        .about("Merge two phrase files of the same format")
        .arg(format_arg())
        .arg(
          Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT")
            .help("merged phrase file")
            .takes_value(true)
            .required(true),
        )
        .arg(Arg::new("BASE").help("phrases kept as is").required(true))
        .arg(
          Arg::new("EXTRA")
            .help("phrases added unless code and order are taken")
            .required(true),
        ),
    )
    .subcommand(
      Command::new("info")
        .about("Show the header and records of a .dat file")
        .arg(Arg::new("FILE").help("phrase .dat file").required(true)),
    )
    .get_matches();

  init_tracing(matches.occurrences_of("verbose"));
  let config = config::load_config()?;

  match matches.subcommand() {
    Some(("convert", sub)) => {
      let options = ConvertOptions {
        from: format_of(sub, "format"),
        targets: sub
          .values_of("to")
          .map(|v| v.filter_map(Format::from_name).collect())
          .unwrap_or_default(),
        out_dir: sub.value_of("output").map(PathBuf::from),
        renumber: sub.is_present("renumber"),
        variables: match sub.value_of("variables") {
          Some(path) => Some(bin_convert::load_variables(Path::new(path))?),
          None => None,
        },
      };
      let input = path_of(sub, "FILE");
      for path in bin_convert::convert(input, &options, &config)? {
        println!("{}", path.display());
      }
    }
    Some(("merge", sub)) => {
      let count = bin_convert::merge_files(
        format_of(sub, "format"),
        path_of(sub, "BASE"),
        path_of(sub, "EXTRA"),
        path_of(sub, "output"),
        &config,
      )?;
      info!(entries = count, "merge done");
    }
    Some(("info", sub)) => {
      let doc = bin_convert::read_document(path_of(sub, "FILE"))?;
      print!("{}", bin_convert::describe(&doc));
    }
    _ => unreachable!(),
  }

  Ok(())
}

fn format_arg() -> Arg<'static> {
  Arg::new("format")
    .short('f')
    .long("format")
    .value_name("FORMAT")
    .help("baidu (handxin), sogou, duoduo, rime, json or udp (ms, dat)")
    .takes_value(true)
    .required(true)
    .validator(validate_format)
}

fn format_of(matches: &ArgMatches, name: &str) -> Format {
  matches
    .value_of(name)
    .and_then(Format::from_name)
    .unwrap_or(Format::Udp)
}

fn path_of<'a>(matches: &'a ArgMatches, name: &str) -> &'a Path {
  Path::new(matches.value_of(name).unwrap_or_default())
}

fn validate_format(s: &str) -> Result<(), String> {
  match Format::from_name(s) {
    Some(_) => Ok(()),
    None => Err(format!("unknown format '{}'", s)),
  }
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u64) {
  let level = match verbosity {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}
