//! sheetsync - terminal spreadsheet editor for CSV and XLSX workbooks

use anyhow::{Context, bail};
use sheetsync::config::{self, Config};
use sheetsync::session::Session;
use sheetsync_engine::{LocalBackend, SearchScope};
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

fn print_usage() {
    eprintln!("Usage: sheetsync [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Workbook to open (.csv, .xlsx, .xls, .ods)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>       Save FILE to another path/format (non-interactive)");
    eprintln!("  -s, --search <TEXT>       Print cells matching TEXT (non-interactive)");
    eprintln!("  --all-sheets              Search every sheet instead of the first");
    eprintln!("  --config <path>           Load settings from this TOML file");
    eprintln!("  --log <path>              Append log output to this file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Options {
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    search: Option<String>,
    all_sheets: bool,
    config: Option<PathBuf>,
    log: Option<PathBuf>,
}

fn require_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {}", flag, what);
            std::process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            flag @ ("-o" | "--output") => {
                i += 1;
                opts.output = Some(PathBuf::from(require_value(args, i, flag, "a file path")));
            }
            flag @ ("-s" | "--search") => {
                i += 1;
                opts.search = Some(require_value(args, i, flag, "a value"));
            }
            "--all-sheets" => opts.all_sheets = true,
            flag @ "--config" => {
                i += 1;
                opts.config = Some(PathBuf::from(require_value(args, i, flag, "a file path")));
            }
            flag @ "--log" => {
                i += 1;
                opts.log = Some(PathBuf::from(require_value(args, i, flag, "a file path")));
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if opts.file.is_none() {
                    opts.file = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }
    opts
}

/// Logs go to a file when one is configured, otherwise to stderr.
/// The terminal UI owns the screen, so interactive runs without a log
/// file only log at the default `warn` level after the UI has exited.
fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(path) = path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_session(file: &Path, config: &Config) -> anyhow::Result<Session<LocalBackend>> {
    Session::open(LocalBackend::new(), file, config.debounce())
        .with_context(|| format!("cannot open {}", file.display()))
}

/// Report the newest error notice, if the session recorded one.
fn session_error(session: &Session<LocalBackend>) -> Option<String> {
    session
        .notifications
        .errors()
        .last()
        .map(|notice| notice.message.clone())
}

fn convert(file: &Path, output: &Path, config: &Config) -> anyhow::Result<()> {
    let mut session = open_session(file, config)?;
    match session.save(Some(output)) {
        Some(path) => {
            println!("Saved to {}", path.display());
            Ok(())
        }
        None => bail!(
            session_error(&session).unwrap_or_else(|| "save failed".to_string())
        ),
    }
}

fn search(file: &Path, query: &str, all_sheets: bool, config: &Config) -> anyhow::Result<()> {
    let mut session = open_session(file, config)?;
    session.search.query = query.to_string();
    session.search.scope = if all_sheets {
        SearchScope::AllSheets
    } else {
        SearchScope::CurrentSheet
    };
    session.search();
    if let Some(message) = session_error(&session) {
        bail!(message);
    }
    for found in session.search.results() {
        println!("{}!{}\t{}", found.sheet_name, found.position, found.value);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn interactive(file: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    use sheetsync::tui;

    let session = match file {
        Some(file) => open_session(file, config)?,
        None => Session::create(LocalBackend::new(), config.debounce())?,
    };
    let mut app = tui::App::new(session, config.layout);
    tui::run(&mut app)?;
    app.session.close();
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn interactive(_file: Option<&Path>, _config: &Config) -> anyhow::Result<()> {
    bail!("built without the terminal UI; use --output or --search")
}

fn run(opts: Options) -> anyhow::Result<()> {
    let (config, warnings) = config::load_config(opts.config.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    init_logging(opts.log.as_deref().or(config.log_file.as_deref()))?;

    match (&opts.file, &opts.output, &opts.search) {
        (Some(file), Some(output), _) => convert(file, output, &config),
        (Some(file), None, Some(query)) => search(file, query, opts.all_sheets, &config),
        (None, Some(_), _) | (None, None, Some(_)) => {
            bail!("--output and --search need a FILE")
        }
        (file, None, None) => interactive(file.as_deref(), &config),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);
    if let Err(e) = run(opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
