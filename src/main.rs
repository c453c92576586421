// src/main.rs
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cslex::{
    Options, Phase,
    dfa::dump_dfa,
    nfa::dump_nfa,
    tables::{Emit, JsonEmitter, Tables, save_tables_bin},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Bin,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "tables.json",
            Format::Bin => "tables.bin",
        }
    }
}

#[derive(Parser)]
#[command(name = "cslex")]
#[command(about = "Compiles a lexer specification into DFA transition tables")]
#[command(version)]
struct Cli {
    /// Lexer specification
    input: PathBuf,

    /// Output file (default: input with a .tables.json / .tables.bin extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Version number exposed to the generated scanner (`%version` overrides it)
    #[arg(long)]
    target_version: Option<i32>,

    /// Print the NFA before alphabet compression
    #[arg(long)]
    dump_nfa: bool,

    /// Print the minimized transition table
    #[arg(long)]
    dump_dfa: bool,

    /// -v for info, -vv for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_output(input: &Path, format: Format) -> PathBuf {
    input.with_extension(format.extension())
}

fn run(cli: &Cli) -> Result<()> {
    let started = Instant::now();
    let file = File::open(&cli.input)
        .with_context(|| format!("opening {}", cli.input.display()))?;

    let mut options = Options::default();
    if let Some(v) = cli.target_version {
        options.version = v;
    }

    let mut spec = cslex::build_nfa(BufReader::new(file), options)
        .with_context(|| format!("compiling {}", cli.input.display()))?;
    if cli.dump_nfa {
        print!("{}", dump_nfa(&spec));
    }

    cslex::build_dfa(&mut spec);
    if cli.dump_dfa {
        print!("{}", dump_dfa(&spec));
    }

    Phase::Emitting.enter();
    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, cli.format));
    match cli.format {
        Format::Json => {
            let text = JsonEmitter { pretty: true }.emit(&spec)?;
            let mut f =
                File::create(&out).with_context(|| format!("creating {}", out.display()))?;
            f.write_all(text.as_bytes())?;
            f.write_all(b"\n")?;
        }
        Format::Bin => {
            let tables = Tables::from_spec(&spec)?;
            save_tables_bin(&out, &tables)
                .with_context(|| format!("writing {}", out.display()))?;
        }
    }

    Phase::Done.enter();
    log::info!(
        "[gen] {} rules, {} DFA states, {} rows x {} columns -> {} ({} ms)",
        spec.rule_count,
        spec.dtrans_list.len(),
        spec.rows.len(),
        spec.packed_ncols,
        out.display(),
        started.elapsed().as_millis()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
