//! excelbundle CLI - Excel language packs to .properties files

mod logger;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use excelbundle::{write_language_pack, Encoding, ExcelImporter, LanguagePack, WriteOptions};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "excelbundle")]
#[command(
    author,
    version,
    about = "Extract localized strings from Excel workbooks into .properties files"
)]
struct Cli {
    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log level used when neither -v nor -q is given
    #[arg(long, env = "EXCELBUNDLE_LOG", global = true, value_name = "LEVEL")]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one .properties file per bundle for the requested languages
    Import(ImportArgs),

    /// List the languages named in the workbook's header rows
    Languages {
        /// Input workbook (.xls)
        workbook: PathBuf,
    },

    /// Print the resources of one language
    Show {
        /// Input workbook (.xls)
        workbook: PathBuf,

        /// Language to show
        #[arg(short, long)]
        language: String,

        /// Print JSON instead of key=value sections
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// Input workbook (.xls)
    workbook: PathBuf,

    /// Output directory for the bundle tree
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Language to import (repeatable)
    #[arg(
        short,
        long = "language",
        value_name = "LANG",
        required_unless_present = "all_languages"
    )]
    languages: Vec<String>,

    /// Import every language found in the workbook
    #[arg(long, conflicts_with = "languages")]
    all_languages: bool,

    /// Write UTF-8 instead of \uXXXX escapes
    #[arg(long)]
    utf8: bool,

    /// Write keys without a value as `key=`
    #[arg(long)]
    keep_empty: bool,

    /// Comment line written at the top of every file
    #[arg(long, value_name = "TEXT")]
    header: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = logger::level_from_flags(cli.quiet, cli.verbose, cli.log_level);
    logger::init(level).context("Failed to install logger")?;

    match cli.command {
        Commands::Import(args) => import(args),
        Commands::Languages { workbook } => list_languages(&workbook),
        Commands::Show {
            workbook,
            language,
            json,
        } => show(&workbook, &language, json),
    }
}

fn open(path: &Path) -> Result<ExcelImporter> {
    ExcelImporter::open(path).with_context(|| format!("Failed to open '{}'", path.display()))
}

fn import(args: ImportArgs) -> Result<()> {
    let importer = open(&args.workbook)?;

    let languages = if args.all_languages {
        importer.languages()
    } else {
        args.languages
    };
    if languages.is_empty() {
        bail!(
            "No language header found in '{}'",
            args.workbook.display()
        );
    }

    let options = WriteOptions {
        encoding: if args.utf8 {
            Encoding::Utf8
        } else {
            Encoding::AsciiEscaped
        },
        keep_empty: args.keep_empty,
        header: args.header,
    };

    let mut stdout = io::stdout().lock();
    let mut written = 0;
    for language in &languages {
        let Some(pack) = importer.load_language(language) else {
            log::warn!(
                "No resources for language '{}' in '{}'",
                language,
                args.workbook.display()
            );
            continue;
        };

        let paths = write_language_pack(&pack, &args.out_dir, &options)
            .with_context(|| format!("Failed to write language '{language}'"))?;
        for path in &paths {
            writeln!(stdout, "{}", path.display()).context("Failed to write to stdout")?;
        }
        written += paths.len();
    }

    if written == 0 {
        bail!(
            "No resources found in '{}' for {}",
            args.workbook.display(),
            languages.join(", ")
        );
    }
    Ok(())
}

fn list_languages(input: &Path) -> Result<()> {
    let importer = open(input)?;

    let mut output = String::new();
    for language in importer.languages() {
        output.push_str(&language);
        output.push('\n');
    }

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")
}

fn show(input: &Path, language: &str, json: bool) -> Result<()> {
    let importer = open(input)?;
    let pack = importer
        .load_language(language)
        .with_context(|| format!("No resources for language '{language}' in '{}'", input.display()))?;

    let output = if json {
        let mut text = serde_json::to_string_pretty(&pack).context("Failed to serialize pack")?;
        text.push('\n');
        text
    } else {
        format_pack(&pack)
    };

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")
}

/// `[bundle]` sections of raw `key=value` lines, separated by blank lines
fn format_pack(pack: &LanguagePack) -> String {
    let mut output = String::new();
    for (i, block) in pack.blocks().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("[{}]\n", block.bundle_path()));
        for (key, value) in block.iter() {
            output.push_str(&format!("{}={}\n", key, value.unwrap_or("")));
        }
    }
    output
}
