//! CLI parsing and orchestration. Parses args, runs list / read / save against a novel source,
//! and maps errors to exit codes.

use crate::config::{self, Config};
use crate::joiner::join_chapter_content;
use crate::model::{ChapterSummary, NovelSummary};
use crate::scraper::{open_source, parse_service, FetchClient, NovelSource, ScraperError};
use crate::writer::{ChapterFormat, NovelWriter, WriteError, WriteOptions, WriteSummary};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OUTPUT_DIR: &str = "novels";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Config(_) => 1,
            CliRunError::NotFound(_) => 3,
            CliRunError::Output(_) => 4,
            CliRunError::Scraper(e) => scraper_exit_code(e),
            CliRunError::Write(e) => match e {
                WriteError::NovelNotFound { .. } | WriteError::ChapterNotFound { .. } => 3,
                WriteError::Source(se) => scraper_exit_code(se),
                WriteError::Io { .. }
                | WriteError::Manifest { .. }
                | WriteError::ManifestMismatch { .. } => 4,
            },
        }
    }
}

fn scraper_exit_code(e: &ScraperError) -> i32 {
    match e {
        ScraperError::InvalidIdentifier { .. } | ScraperError::InvalidBaseUrl { .. } => 1,
        _ => 2,
    }
}

#[derive(Parser, Debug)]
#[command(name = "sekaiscrape")]
#[command(about = "List, read, and save novels from NeoSekai Translations")]
#[command(
    after_help = "Config file keys (output_dir, user_agent, timeout_secs, base_url, chapter_format) are read from ./sekaiscrape.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress and status output (errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging and the full error chain.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// HTTP User-Agent (overrides config).
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Service origin, e.g. a mirror (overrides config).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the novel catalog, or the chapters of one novel.
    List {
        /// The service to list. Currently only 'neosekai'.
        service: String,
        /// Novel path whose chapters to list. Lists all novels when omitted.
        novel: Option<String>,
        /// Output JSON instead of numbered lines.
        #[arg(long)]
        json: bool,
    },
    /// Read a chapter in the terminal, prompting for anything not given.
    Read {
        /// The service to read from. Currently only 'neosekai'.
        service: String,
        /// Novel path as seen in the site's address bar (not the title).
        novel: Option<String>,
        /// Chapter id.
        chapter: Option<String>,
        /// List older chapters first when prompting.
        #[arg(long, alias = "listReverse")]
        list_reverse: bool,
    },
    /// Save a novel's chapters for reading with the frontend.
    Save {
        /// The service to save from. Currently only 'neosekai'.
        service: String,
        /// Novel path.
        novel: String,
        /// Only save these chapter ids.
        chapters: Vec<String>,
        /// Write all chapters even if they were saved before.
        #[arg(long, alias = "writeAll")]
        write_all: bool,
        /// Base output directory (one subdirectory per novel is created inside it).
        #[arg(long, alias = "outDir")]
        out_dir: Option<PathBuf>,
        /// Chapter file format: json or text.
        #[arg(long, value_parser = parse_chapter_format)]
        format: Option<ChapterFormat>,
    },
}

fn parse_chapter_format(s: &str) -> Result<ChapterFormat, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(ChapterFormat::Json),
        "text" | "txt" => Ok(ChapterFormat::Text),
        _ => Err(format!(
            "Invalid chapter format: '{}'. Use json or text.",
            s
        )),
    }
}

/// Serialize with 4-space indentation.
fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, CliRunError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| CliRunError::Output(e.into()))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn print_novel_list(
    out: &mut dyn Write,
    novels: &[NovelSummary],
    json: bool,
) -> Result<(), CliRunError> {
    if json {
        writeln!(out, "{}", to_json_pretty(&novels)?)?;
        return Ok(());
    }
    for (i, novel) in novels.iter().enumerate() {
        writeln!(out, "{} - {} ({})", i + 1, novel.title, novel.path)?;
    }
    Ok(())
}

fn print_chapter_list(
    out: &mut dyn Write,
    chapters: &[ChapterSummary],
    json: bool,
) -> Result<(), CliRunError> {
    if json {
        writeln!(out, "{}", to_json_pretty(&chapters)?)?;
        return Ok(());
    }
    for (i, chapter) in chapters.iter().enumerate() {
        writeln!(out, "{} - {} ({})", i + 1, chapter.title, chapter.id)?;
    }
    Ok(())
}

/// Resolve a prompt answer against `keys`: a 1-based index, or one of the keys verbatim.
/// An in-range number is an index even when it also matches a key.
fn resolve_selection<'a>(answer: &str, keys: &[&'a str]) -> Option<&'a str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    if let Ok(n) = answer.parse::<usize>() {
        if (1..=keys.len()).contains(&n) {
            return Some(keys[n - 1]);
        }
    }
    keys.iter().copied().find(|k| *k == answer)
}

fn prompt(input: &mut dyn BufRead, out: &mut dyn Write, question: &str) -> io::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// `list`: catalog, or the chapter list of `novel`.
pub fn run_list(
    source: &mut dyn NovelSource,
    novel: Option<&str>,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliRunError> {
    let Some(novel_path) = novel else {
        let novels = source.get_novel_list()?;
        return print_novel_list(out, &novels, json);
    };
    match source.get_novel_info(novel_path)? {
        Some(info) => print_chapter_list(out, &info.chapters, json),
        None => {
            if json {
                writeln!(out, "[]")?;
            }
            Err(CliRunError::NotFound("Novel not found!".to_string()))
        }
    }
}

/// `read`: prompt for a missing novel / chapter on `input`, then print the chapter text.
pub fn run_read(
    source: &mut dyn NovelSource,
    novel: Option<&str>,
    chapter: Option<&str>,
    list_reverse: bool,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<(), CliRunError> {
    let novel_path = match novel {
        Some(n) => n.to_string(),
        None => {
            let novels = source.get_novel_list()?;
            if novels.is_empty() {
                return Err(CliRunError::NotFound("No novels listed.".to_string()));
            }
            print_novel_list(out, &novels, false)?;
            let answer = prompt(input, out, "Which novel do you want to read? ")?;
            let keys: Vec<&str> = novels.iter().map(|n| n.path.as_str()).collect();
            resolve_selection(&answer, &keys)
                .map(String::from)
                .ok_or_else(|| CliRunError::InvalidInput("Invalid index or path.".to_string()))?
        }
    };

    let chapter_id = match chapter {
        Some(c) => c.to_string(),
        None => {
            let mut info = source
                .get_novel_info(&novel_path)?
                .ok_or_else(|| CliRunError::NotFound("Novel not found!".to_string()))?;
            if info.chapters.is_empty() {
                return Err(CliRunError::NotFound("Novel has no chapters.".to_string()));
            }
            if list_reverse {
                info.chapters.reverse();
            }
            print_chapter_list(out, &info.chapters, false)?;
            let answer = prompt(input, out, "Which chapter do you want to read? ")?;
            let keys: Vec<&str> = info.chapters.iter().map(|c| c.id.as_str()).collect();
            resolve_selection(&answer, &keys)
                .map(String::from)
                .ok_or_else(|| CliRunError::InvalidInput("Invalid index".to_string()))?
        }
    };

    let content = source
        .get_chapter_content(&novel_path, &chapter_id)?
        .ok_or_else(|| CliRunError::NotFound("Chapter not found".to_string()))?;
    writeln!(out, "{}", join_chapter_content(&content))?;
    Ok(())
}

/// `save`: write chapters through the writer with an optional progress bar.
pub fn run_save(
    source: &mut dyn NovelSource,
    writer: &NovelWriter,
    novel: &str,
    options: &WriteOptions,
    quiet: bool,
) -> Result<WriteSummary, CliRunError> {
    let progress_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |n: u32, total: u32| {
        if total == 0 {
            return;
        }
        let mut state = progress_state.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total as u64);
            if let Ok(style) = indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
            {
                bar.set_style(
                    style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                        .progress_chars("█▉▊▋▌▍▎▏ "),
                );
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_position(n as u64);
        pb.set_message(format!("Saving chapter {}/{}", n, total));
    };
    let progress: Option<&dyn Fn(u32, u32)> = if quiet { None } else { Some(&progress_cb) };

    let result = writer.write_all(source, novel, options, progress);

    if let Some(pb) = progress_state.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
    Ok(result?)
}

fn build_client(args: &Args, config: Option<&Config>) -> Result<FetchClient, CliRunError> {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));

    let mut builder = FetchClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let service_name = match &args.command {
        Command::List { service, .. }
        | Command::Read { service, .. }
        | Command::Save { service, .. } => service,
    };
    let service = parse_service(service_name).map_err(CliRunError::InvalidInput)?;

    let config = config::load_config().map_err(CliRunError::Config)?;
    let client = build_client(args, config.as_ref())?;
    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.base_url.clone()));
    let mut source = open_source(service, &client, base_url.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::List { novel, json, .. } => {
            run_list(source.as_mut(), novel.as_deref(), *json, &mut out)
        }
        Command::Read {
            novel,
            chapter,
            list_reverse,
            ..
        } => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            run_read(
                source.as_mut(),
                novel.as_deref(),
                chapter.as_deref(),
                *list_reverse,
                &mut input,
                &mut out,
            )
        }
        Command::Save {
            novel,
            chapters,
            write_all,
            out_dir,
            format,
            ..
        } => {
            let out_dir = out_dir
                .clone()
                .or_else(|| config.as_ref().and_then(|c| c.output_dir.clone()))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
            let format = match format {
                Some(f) => *f,
                None => match config.as_ref().and_then(|c| c.chapter_format.as_deref()) {
                    Some(s) => parse_chapter_format(s).map_err(CliRunError::Config)?,
                    None => ChapterFormat::default(),
                },
            };
            let writer = NovelWriter::new(out_dir, format);
            let options = WriteOptions {
                write_all: *write_all,
                include_chapters: if chapters.is_empty() {
                    None
                } else {
                    Some(chapters.clone())
                },
            };
            let summary = run_save(source.as_mut(), &writer, novel, &options, args.quiet)?;
            if !args.quiet {
                eprintln!(
                    "Written successfully: {} ({} new, {} already saved) to {}",
                    summary.title,
                    summary.written.len(),
                    summary.skipped.len(),
                    writer.novel_dir(novel).display()
                );
            }
            Ok(())
        }
    }
}
