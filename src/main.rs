use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wgrep::grep::{Field, Matcher};
use wgrep::settings::{flag_pair, OutputFormat, Overrides, Settings};
use wgrep::stats::Stats;
use wgrep::{source, Page, Pages};

#[derive(Parser)]
#[command(name = "wgrep", about = "Grep concatenated HTTP capture logs page by page")]
struct Cli {
    /// Output format (default: settings, else text)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every page in the log
    Pages {
        /// Capture log (default: stdin)
        file: Option<PathBuf>,
        /// Also print each page body
        #[arg(long)]
        body: bool,
    },
    /// Print pages whose FIELD matches PATTERN
    Grep {
        pattern: String,
        /// Capture log (default: stdin)
        file: Option<PathBuf>,
        /// url, ip, ts, content-type, size, protocol, status, headers, header:<name> or body
        #[arg(short, long)]
        field: Option<String>,
        #[arg(short = 'i', long, overrides_with = "no_ignore_case")]
        ignore_case: bool,
        /// Match case even if settings say otherwise
        #[arg(long, overrides_with = "ignore_case")]
        no_ignore_case: bool,
        /// Select non-matching pages
        #[arg(short = 'v', long)]
        invert: bool,
        /// Only print the number of matching pages
        #[arg(short, long)]
        count: bool,
        /// Also print each page body
        #[arg(long)]
        body: bool,
    },
    /// Page counts by status and content type
    Stats {
        /// Capture log (default: stdin)
        file: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut o = Overrides {
            format: self.format,
            ..Overrides::default()
        };
        if let Commands::Grep {
            field,
            ignore_case,
            no_ignore_case,
            ..
        } = &self.command
        {
            o.field = field.clone();
            o.ignore_case = flag_pair(*ignore_case, *no_ignore_case);
        }
        o
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load()
        .context("Failed to load settings")?
        .with_overrides(cli.overrides());
    init_tracing(&settings.log);

    let format = settings.format;
    let mut out = BufWriter::new(io::stdout().lock());

    let result = match cli.command {
        Commands::Pages { file, body } => list_pages(&mut out, file.as_deref(), format, body),
        Commands::Grep {
            pattern,
            file,
            invert,
            count,
            body,
            ..
        } => {
            let field: Field = settings.field.parse().context("Invalid --field")?;
            let matcher = Matcher::new(field, &pattern, settings.ignore_case, invert)
                .context("Invalid pattern")?;
            grep(&mut out, &matcher, file.as_deref(), format, count, body)
        }
        Commands::Stats { file } => stats(&mut out, file.as_deref(), format),
    };

    match result.and_then(|code| Ok(out.flush().map(|_| code)?)) {
        Err(e) if is_broken_pipe(&e) => Ok(ExitCode::SUCCESS),
        other => other,
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn open_pages(file: Option<&Path>) -> Result<Pages<'static>> {
    let reader = source::open(file).context("Failed to open capture log")?;
    Ok(Pages::from_reader(reader))
}

fn input_name(file: Option<&Path>) -> String {
    file.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".into())
}

fn list_pages(
    out: &mut impl Write,
    file: Option<&Path>,
    format: OutputFormat,
    with_body: bool,
) -> Result<ExitCode> {
    let mut n = 0usize;
    for page in open_pages(file)? {
        let page = page.with_context(|| format!("Failed to parse {}", input_name(file)))?;
        print_page(out, &page, format, with_body)?;
        n += 1;
    }
    info!(pages = n, "listed pages");
    Ok(ExitCode::SUCCESS)
}

fn grep(
    out: &mut impl Write,
    matcher: &Matcher,
    file: Option<&Path>,
    format: OutputFormat,
    count_only: bool,
    with_body: bool,
) -> Result<ExitCode> {
    let mut seen = 0usize;
    let mut matched = 0usize;
    for page in open_pages(file)? {
        let page = page.with_context(|| format!("Failed to parse {}", input_name(file)))?;
        seen += 1;
        if !matcher.is_match(&page) {
            continue;
        }
        matched += 1;
        if !count_only {
            print_page(out, &page, format, with_body)?;
        }
    }

    if count_only {
        match format {
            OutputFormat::Text => writeln!(out, "{}", matched)?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::json!({ "matched": matched }))?,
        }
    }
    info!(field = %matcher.field(), pages = seen, matched, "grep finished");

    // grep convention: 1 when nothing matched
    Ok(if matched > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn stats(out: &mut impl Write, file: Option<&Path>, format: OutputFormat) -> Result<ExitCode> {
    let t0 = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} pages ({per_sec})")?,
    );

    let collected = Stats::collect(open_pages(file)?, |_| pb.inc(1));
    pb.finish_and_clear();
    let totals = collected.with_context(|| format!("Failed to parse {}", input_name(file)))?;
    info!(
        pages = totals.pages,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "stats finished"
    );

    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &totals)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "Lines:      {}", totals.lines)?;
            writeln!(out, "Pages:      {}", totals.pages)?;
            writeln!(out, "Body lines: {}", totals.body_lines)?;
            if let (Some(first), Some(last)) = (totals.first_capture, totals.last_capture) {
                writeln!(out, "Captured:   {} .. {}", first, last)?;
            }
            writeln!(out, "\n--- Status ---")?;
            for (status, n) in &totals.by_status {
                writeln!(out, "{:>6}  {}", n, status)?;
            }
            writeln!(out, "\n--- Content type ---")?;
            for (ct, n) in &totals.by_content_type {
                writeln!(out, "{:>6}  {}", n, ct)?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_page(
    out: &mut impl Write,
    page: &Page,
    format: OutputFormat,
    with_body: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, page)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{} {} {} {} ({} body lines)",
                page.status,
                page.url,
                page.content_type,
                page.size,
                page.body.len()
            )?;
            if with_body {
                for line in &page.body {
                    out.write_all(line.as_bytes())?;
                    if !line.ends_with('\n') {
                        writeln!(out)?;
                    }
                }
            }
        }
    }
    Ok(())
}
