use std::fmt::{Display, Formatter};

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument, warn};

use crate::analysis::{
    errors::AnalysisError,
    exclusion::ExclusionList,
    url::UrlNormalizer,
};
use crate::config::{AnalysisConfig, PositionBand};
use crate::ingest::{RawTable, find_column};

/// Logical column and the canonical header names accepted for it.
struct ColumnSpec {
    name: &'static str,
    aliases: &'static [&'static str],
}

const QUERY_COLUMN: ColumnSpec = ColumnSpec {
    name: "Query",
    aliases: &["query", "queries", "top queries", "keyword", "keywords"],
};
const LANDING_PAGE_COLUMN: ColumnSpec = ColumnSpec {
    name: "Landing Page (or Address/URL)",
    aliases: &[
        "landing page",
        "landing pages",
        "address",
        "url",
        "urls",
        "page",
        "top pages",
    ],
};
const CLICKS_COLUMN: ColumnSpec = ColumnSpec {
    name: "Clicks",
    aliases: &["clicks", "url clicks"],
};
const POSITION_COLUMN: ColumnSpec = ColumnSpec {
    name: "Position",
    aliases: &["position", "avg. position", "average position", "avg position"],
};

/// One query's performance for one landing page, after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPerformanceRecord {
    pub url: String,
    pub query: String,
    /// Always greater than zero. Fractional counts are kept as parsed.
    #[serde(serialize_with = "serialize_clicks")]
    pub clicks: f64,
    pub position: f64,
}

/// Where the retained rows got their position from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    #[default]
    Column,
    /// The column exists but no row had a parseable value.
    Unparseable,
    /// No position column in the input.
    Missing,
}

/// Row counts removed at each cleaning stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub input_rows: usize,
    pub missing_url_or_query: usize,
    pub excluded_urls: usize,
    pub below_min_clicks: usize,
    pub outside_position_band: usize,
    pub branded: usize,
    pub retained: usize,
    pub position_source: PositionSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    /// Sorted by URL ascending, then clicks descending (stable).
    pub records: Vec<QueryPerformanceRecord>,
    pub stats: FilterStats,
}

impl CleanedTable {
    /// Distinct URLs in report order.
    pub fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for record in &self.records {
            if urls.last() != Some(&record.url.as_str()) {
                urls.push(&record.url);
            }
        }
        urls
    }
}

/// The stage that removed the last remaining rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum EmptyReason {
    NoInputRows,
    MissingUrlOrQuery,
    AllExcluded,
    NoClicks { minimum: u64 },
    OutsidePositionBand { min: u32, max: u32 },
    AllBranded,
}

impl Display for EmptyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NoInputRows => write!(f, "the performance report has no data rows"),
            EmptyReason::MissingUrlOrQuery => {
                write!(f, "every row is missing a landing page or a query")
            }
            EmptyReason::AllExcluded => write!(
                f,
                "every URL was excluded (parameter URLs and exclusion list matches)"
            ),
            EmptyReason::NoClicks { minimum } => {
                write!(f, "no keywords found with at least {minimum} click(s)")
            }
            EmptyReason::OutsidePositionBand { min, max } => {
                write!(f, "no keywords rank between positions {min} and {max}")
            }
            EmptyReason::AllBranded => write!(f, "every remaining query matched a branded term"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Rows(CleanedTable),
    Empty {
        reason: EmptyReason,
        stats: FilterStats,
    },
}

/// Cleans a raw performance table into ranked striking-distance candidates.
///
/// Only unresolvable mandatory columns are an error; every per-row problem
/// is recovered with a default or by dropping the row.
#[instrument(skip_all, fields(rows = table.rows.len()))]
pub fn process(table: &RawTable, config: &AnalysisConfig) -> Result<ProcessOutcome, AnalysisError> {
    let columns = resolve_columns(&table.headers)?;
    let normalizer = UrlNormalizer::new(config.url_mode());
    let exclusions = ExclusionList::new(config.url_exclusions(), config.url_mode());
    let band = config.position_band();

    let mut stats = FilterStats {
        input_rows: table.rows.len(),
        ..FilterStats::default()
    };
    if table.is_empty() {
        return Ok(empty(EmptyReason::NoInputRows, stats));
    }

    let mut rows: Vec<PendingRow> = Vec::with_capacity(table.rows.len());
    for i in 0..table.rows.len() {
        let url = normalizer.normalize(table.cell(i, columns.url));
        let query = table.cell(i, columns.query).trim();
        if url.is_empty() || query.is_empty() {
            stats.missing_url_or_query += 1;
            continue;
        }
        rows.push(PendingRow {
            url,
            query: query.to_string(),
            clicks: table.cell(i, columns.clicks),
            position: columns.position.map(|c| table.cell(i, c)),
        });
    }
    if rows.is_empty() {
        return Ok(empty(EmptyReason::MissingUrlOrQuery, stats));
    }

    let before = rows.len();
    rows.retain(|row| !exclusions.is_excluded(&row.url));
    stats.excluded_urls = before - rows.len();
    if stats.excluded_urls > 0 {
        info!(
            "Excluded {} URLs (parameter URLs and exact matches from exclusion list)",
            stats.excluded_urls
        );
    }
    if rows.is_empty() {
        return Ok(empty(EmptyReason::AllExcluded, stats));
    }

    let minimum = config.minimum_clicks();
    let mut scored: Vec<(PendingRow, f64)> = Vec::with_capacity(rows.len());
    for row in rows {
        let clicks = parse_clicks(row.clicks);
        if clicks <= 0.0 || clicks < minimum as f64 {
            stats.below_min_clicks += 1;
            continue;
        }
        scored.push((row, clicks));
    }
    if scored.is_empty() {
        return Ok(empty(EmptyReason::NoClicks { minimum }, stats));
    }

    let (mut records, source) = apply_position_band(scored, band);
    stats.position_source = source;
    stats.outside_position_band = stats.input_rows
        - stats.missing_url_or_query
        - stats.excluded_urls
        - stats.below_min_clicks
        - records.len();
    match source {
        PositionSource::Missing => info!(
            "No position data found. Analyzing all keywords regardless of ranking position."
        ),
        PositionSource::Unparseable => warn!(
            "Position column has no parseable values; assigning neutral position {}",
            band.neutral_position()
        ),
        PositionSource::Column => {}
    }
    if records.is_empty() {
        return Ok(empty(
            EmptyReason::OutsidePositionBand {
                min: band.min,
                max: band.max,
            },
            stats,
        ));
    }

    let brands = BrandedTerms::new(config.branded_terms());
    if !brands.is_empty() {
        let before = records.len();
        records.retain(|r| !brands.matches(&r.query));
        stats.branded = before - records.len();
        if records.is_empty() {
            return Ok(empty(EmptyReason::AllBranded, stats));
        }
    }

    records.sort_by(|a, b| {
        a.url
            .cmp(&b.url)
            .then_with(|| b.clicks.total_cmp(&a.clicks))
    });
    stats.retained = records.len();
    debug!(?stats, "performance data cleaned");

    Ok(ProcessOutcome::Rows(CleanedTable { records, stats }))
}

struct ResolvedColumns {
    query: usize,
    url: usize,
    clicks: usize,
    position: Option<usize>,
}

fn resolve_columns(headers: &[String]) -> Result<ResolvedColumns, AnalysisError> {
    let query = find_column(headers, QUERY_COLUMN.aliases);
    let url = find_column(headers, LANDING_PAGE_COLUMN.aliases);
    let clicks = find_column(headers, CLICKS_COLUMN.aliases);

    match (query, url, clicks) {
        (Some(query), Some(url), Some(clicks)) => Ok(ResolvedColumns {
            query,
            url,
            clicks,
            position: find_column(headers, POSITION_COLUMN.aliases),
        }),
        _ => {
            let missing = [
                (query, QUERY_COLUMN.name),
                (url, LANDING_PAGE_COLUMN.name),
                (clicks, CLICKS_COLUMN.name),
            ]
            .into_iter()
            .filter(|(found, _)| found.is_none())
            .map(|(_, name)| name)
            .collect();
            Err(AnalysisError::MissingColumns {
                missing,
                available: headers.to_vec(),
            })
        }
    }
}

struct PendingRow<'a> {
    url: String,
    query: String,
    clicks: &'a str,
    position: Option<&'a str>,
}

fn apply_position_band(
    rows: Vec<(PendingRow<'_>, f64)>,
    band: PositionBand,
) -> (Vec<QueryPerformanceRecord>, PositionSource) {
    let has_column = rows.iter().any(|(row, _)| row.position.is_some());
    let parsed: Vec<_> = rows
        .into_iter()
        .map(|(row, clicks)| {
            let position = row.position.and_then(parse_position);
            (row, clicks, position)
        })
        .collect();

    let source = if !has_column {
        PositionSource::Missing
    } else if parsed.iter().all(|(_, _, p)| p.is_none()) {
        PositionSource::Unparseable
    } else {
        PositionSource::Column
    };

    let records = parsed
        .into_iter()
        .filter_map(|(row, clicks, position)| {
            let position = match source {
                PositionSource::Column => position.filter(|p| band.contains(*p))?,
                _ => band.neutral_position(),
            };
            Some(QueryPerformanceRecord {
                url: row.url,
                query: row.query,
                clicks,
                position,
            })
        })
        .collect();

    (records, source)
}

/// Unparseable, negative or non-finite counts read as zero.
fn parse_clicks(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Whole click counts are written as integers, anything else as a float.
pub(crate) fn serialize_clicks<S: Serializer>(
    clicks: &f64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if clicks.fract() == 0.0 && *clicks >= 0.0 && *clicks <= u64::MAX as f64 {
        serializer.serialize_u64(*clicks as u64)
    } else {
        serializer.serialize_f64(*clicks)
    }
}

fn parse_position(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

fn empty(reason: EmptyReason, mut stats: FilterStats) -> ProcessOutcome {
    stats.retained = 0;
    warn!("No rows survived filtering: {}", reason);
    ProcessOutcome::Empty { reason, stats }
}

/// Case-insensitive literal substring match against any branded term.
pub struct BrandedTerms {
    pattern: Option<Regex>,
    fallback: Vec<String>,
}

impl BrandedTerms {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let terms: Vec<&str> = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Self {
                pattern: None,
                fallback: Vec::new(),
            };
        }

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        match RegexBuilder::new(&alternation).case_insensitive(true).build() {
            Ok(pattern) => Self {
                pattern: Some(pattern),
                fallback: Vec::new(),
            },
            Err(e) => {
                warn!("Branded-term pattern rejected ({e}); using plain substring checks");
                Self {
                    pattern: None,
                    fallback: terms.iter().map(|t| t.to_lowercase()).collect(),
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.fallback.is_empty()
    }

    pub fn matches(&self, query: &str) -> bool {
        if let Some(pattern) = &self.pattern {
            return pattern.is_match(query);
        }
        let query = query.to_lowercase();
        self.fallback.iter().any(|t| query.contains(t.as_str()))
    }
}
