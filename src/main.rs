//! pepper-style CLI
//!
//! プリプロセス済みの C/C++ ソースを検査し、診断を出力する

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser as ClapParser, ValueEnum};
use pepper_style::{Analyzer, CheckerConfig, SymbolTable, UnitReport};
use tracing_subscriber::EnvFilter;

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `file:line: severity (rule) message`
    Text,
    Json,
}

/// コマンドライン引数
#[derive(ClapParser)]
#[command(name = "pepper-style")]
#[command(version, about = "Hungarian-notation and layout style checker for C/C++")]
struct Cli {
    /// プリプロセス済みの入力ファイル
    input: PathBuf,

    /// 未処理の原文（コメント・波括弧の検査用、省略時は入力ファイル）
    #[arg(long = "raw")]
    raw: Option<PathBuf>,

    /// コメント・波括弧の検査を行わない
    #[arg(long = "no-raw", conflicts_with = "raw")]
    no_raw: bool,

    /// シンボルテーブル (JSON)
    #[arg(long = "symbols")]
    symbols: Option<PathBuf>,

    /// チェッカー設定 (JSON)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// ファイル名を相対化する基準パス（複数指定可）
    #[arg(long = "base-path")]
    base_path: Vec<PathBuf>,

    /// 出力形式
    #[arg(long = "format", value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// RUST_LOG が設定されている場合だけログを出す
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CheckerConfig::from_path(path)?,
        None => CheckerConfig::default(),
    };
    let symbols = match &cli.symbols {
        Some(path) => SymbolTable::from_path(path)?,
        None => SymbolTable::new(),
    };

    let source = fs::read_to_string(&cli.input)?;
    let raw = if cli.no_raw {
        None
    } else {
        match &cli.raw {
            Some(path) => Some(fs::read_to_string(path)?),
            None => Some(source.clone()),
        }
    };

    let analyzer = Analyzer::builder()
        .with_config(config)
        .with_base_paths(cli.base_path)
        .build();
    let file0 = cli.input.to_string_lossy();
    let report = analyzer.analyze(&source, &file0, raw.as_deref(), &symbols)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_report(&mut out, &report, cli.format)?;
    out.flush()?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &UnitReport, format: Format) -> io::Result<()> {
    match format {
        Format::Text => {
            for line in report.lines() {
                writeln!(out, "{}", line)?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &report.records())?;
            writeln!(out)?;
        }
    }
    Ok(())
}
