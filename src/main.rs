use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use striking_distance::{
    analysis::{
        ProcessOutcome, ReportSummary, StrikingDistanceRow, UrlMode, UrlNormalizer, build_report,
        process,
    },
    config::{AnalysisConfig, FetchConfig, PositionBand},
    content::{ContentMap, HttpContentSource, collect_content, load_crawl_export},
    export::{ExportFormat, write_report},
    ingest::load_table,
};

/// Finds search queries ranking in striking distance and checks whether each
/// one already appears in the page's title, meta description, headings and copy.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Search Console performance export (CSV, TSV or semicolon separated)
    #[arg(long)]
    gsc: PathBuf,

    /// Crawler export with page content; skips live fetching
    #[arg(long, conflicts_with = "no_fetch")]
    content: Option<PathBuf>,

    /// Do not fetch pages; every URL is reported without content
    #[arg(long, default_value_t = false)]
    no_fetch: bool,

    /// Branded term to exclude (repeatable)
    #[arg(long = "branded")]
    branded: Vec<String>,

    /// File with one branded term per line
    #[arg(long)]
    branded_file: Option<PathBuf>,

    /// URL to exclude by exact match (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// File with one excluded URL per line
    #[arg(long)]
    exclude_file: Option<PathBuf>,

    /// Queries analyzed per URL, by clicks (1-20)
    #[arg(long)]
    top_n: Option<usize>,

    #[arg(long)]
    min_position: Option<u32>,

    #[arg(long)]
    max_position: Option<u32>,

    /// Rows with fewer clicks are dropped
    #[arg(long)]
    min_clicks: Option<u64>,

    /// Treat http:// and https:// URLs as the same page
    #[arg(long, default_value_t = false)]
    protocol_agnostic: bool,

    /// Pages fetched in parallel (1-32)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-URL fetch deadline in seconds (10-120)
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Output file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Top opportunities printed to stderr after the run
    #[arg(long, default_value_t = 10)]
    preview: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = analysis_config(&args)?;
    let fetch_config = fetch_config(&args)?;
    info!(
        "Position band {}-{}, top {} queries per URL",
        config.position_band().min,
        config.position_band().max,
        config.top_n()
    );

    let table = load_table(&args.gsc)
        .with_context(|| format!("failed to read {}", args.gsc.display()))?;
    let cleaned = match process(&table, &config)? {
        ProcessOutcome::Rows(cleaned) => cleaned,
        ProcessOutcome::Empty { reason, stats } => {
            warn!(?stats, "Nothing to analyze: {reason}");
            eprintln!("No striking distance keywords found: {reason}.");
            return emit(&[], &args);
        }
    };
    let urls = cleaned.urls();
    info!(
        "{} keywords across {} URLs after filtering",
        cleaned.records.len(),
        urls.len()
    );

    let content = if let Some(path) = &args.content {
        let export = load_table(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        load_crawl_export(&export, &UrlNormalizer::new(config.url_mode()))?
    } else if args.no_fetch {
        ContentMap::new()
    } else {
        let source = Arc::new(HttpContentSource::new(&fetch_config)?);
        collect_content(source, urls.as_slice(), &fetch_config).await
    };

    let rows = build_report(&cleaned, &content, config.top_n());
    let summary = ReportSummary::from_rows(&rows, &content);
    print_summary(&summary, &rows, args.preview);

    emit(&rows, &args)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn analysis_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::from_env()?;

    let mut branded = config.branded_terms().to_vec();
    branded.extend(args.branded.iter().cloned());
    if let Some(path) = &args.branded_file {
        branded.extend(read_list(path)?);
    }
    let mut exclusions = config.url_exclusions().to_vec();
    exclusions.extend(args.exclude.iter().cloned());
    if let Some(path) = &args.exclude_file {
        exclusions.extend(read_list(path)?);
    }
    config = config
        .with_branded_terms(branded)
        .with_url_exclusions(exclusions);

    let band = config.position_band();
    config = config.with_position_band(PositionBand::new(
        args.min_position.unwrap_or(band.min),
        args.max_position.unwrap_or(band.max),
    ));
    if let Some(top_n) = args.top_n {
        config = config.with_top_n(top_n);
    }
    if let Some(min_clicks) = args.min_clicks {
        config = config.with_minimum_clicks(min_clicks);
    }
    if args.protocol_agnostic {
        config = config.with_url_mode(UrlMode::ProtocolAgnostic);
    }
    Ok(config.validate()?)
}

fn fetch_config(args: &Args) -> Result<FetchConfig> {
    let mut config = FetchConfig::from_env()?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config.validate()?)
}

fn read_list(path: &Path) -> Result<Vec<String>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn emit(rows: &[StrikingDistanceRow], args: &Args) -> Result<()> {
    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_report(rows, args.format, BufWriter::new(file))?;
            info!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_report(rows, args.format, &mut handle)?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn print_summary(summary: &ReportSummary, rows: &[StrikingDistanceRow], preview: usize) {
    info!(?summary, "Report built");
    eprintln!(
        "{} keywords across {} URLs ({} URLs without content)",
        summary.rows, summary.urls, summary.urls_without_content
    );
    eprintln!(
        "missing from title: {}, meta: {}, h1: {}, h2: {}, body: {} (no body data: {})",
        summary.missing_from_title,
        summary.missing_from_meta,
        summary.missing_from_h1,
        summary.missing_from_h2,
        summary.missing_from_body,
        summary.body_no_data
    );
    eprintln!(
        "{} keywords missing from title, meta and H1",
        summary.full_opportunities
    );

    let top: Vec<_> = rows
        .iter()
        .filter(|r| r.is_full_opportunity())
        .take(preview)
        .collect();
    for row in top {
        eprintln!(
            "  {} | {} | {} clicks | pos {:.1} | body: {}",
            row.url,
            row.query,
            row.clicks,
            row.position,
            row.in_body.as_str()
        );
    }
}
