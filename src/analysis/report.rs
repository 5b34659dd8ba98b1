use std::collections::{HashMap, HashSet};

use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

use crate::analysis::{
    matcher::{Presence, check_presence},
    processor::{CleanedTable, QueryPerformanceRecord, serialize_clicks},
};
use crate::content::{ContentLookup, ContentStatus, PageContent};

/// Body presence keeps "no data" apart from a confirmed miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPresence {
    Present,
    Absent,
    NoData,
}

impl BodyPresence {
    pub const NO_DATA: &'static str = "no data";

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPresence::Present => "true",
            BodyPresence::Absent => "false",
            BodyPresence::NoData => Self::NO_DATA,
        }
    }
}

impl From<Presence> for BodyPresence {
    fn from(presence: Presence) -> Self {
        match presence {
            Presence::Present => BodyPresence::Present,
            Presence::Absent => BodyPresence::Absent,
            Presence::Unknown => BodyPresence::NoData,
        }
    }
}

impl Serialize for BodyPresence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BodyPresence::Present => serializer.serialize_bool(true),
            BodyPresence::Absent => serializer.serialize_bool(false),
            BodyPresence::NoData => serializer.serialize_str(Self::NO_DATA),
        }
    }
}

/// One (URL, query) line of the report. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrikingDistanceRow {
    pub url: String,
    pub query: String,
    #[serde(serialize_with = "serialize_clicks")]
    pub clicks: f64,
    pub position: f64,
    pub in_title: bool,
    pub in_meta: bool,
    pub in_h1: bool,
    pub in_h2: bool,
    pub in_body: BodyPresence,
}

impl StrikingDistanceRow {
    /// Missing from title, meta description and H1 at once.
    pub fn is_full_opportunity(&self) -> bool {
        !self.in_title && !self.in_meta && !self.in_h1
    }
}

/// Joins the cleaned table with page content and flags where each query appears.
///
/// Keeps the processor's order (URL ascending, clicks descending) and at most
/// `top_n` queries per URL. Missing or failed content never fails a row.
#[instrument(skip_all, fields(records = cleaned.records.len(), top_n))]
pub fn build_report<L>(cleaned: &CleanedTable, lookup: &L, top_n: usize) -> Vec<StrikingDistanceRow>
where
    L: ContentLookup + ?Sized,
{
    let blank = PageContent::default();
    let mut rows = Vec::new();

    for group in group_by_url(&cleaned.records) {
        let url = &group[0].url;
        let page = match lookup.lookup(url) {
            ContentStatus::Found(page) => page,
            ContentStatus::Failed(reason) => {
                debug!("no content for {url} ({reason}); using empty fields");
                &blank
            }
            ContentStatus::NotFound => &blank,
        };

        for record in group.into_iter().take(top_n) {
            let q = record.query.as_str();
            rows.push(StrikingDistanceRow {
                url: record.url.clone(),
                query: record.query.clone(),
                clicks: record.clicks,
                position: record.position,
                in_title: check_presence(q, &page.title).is_present(),
                in_meta: check_presence(q, &page.meta_description).is_present(),
                in_h1: check_presence(q, &page.h1).is_present(),
                in_h2: check_presence(q, &page.h2).is_present(),
                in_body: check_presence(q, &page.body).into(),
            });
        }
    }

    rows
}

/// Groups in order of first appearance, each stably sorted by clicks
/// descending. Already-sorted input passes through unchanged.
fn group_by_url(records: &[QueryPerformanceRecord]) -> Vec<Vec<&QueryPerformanceRecord>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&QueryPerformanceRecord>> = Vec::new();
    for record in records {
        let slot = *index.entry(record.url.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }
    for group in &mut groups {
        group.sort_by(|a, b| b.clicks.total_cmp(&a.clicks));
    }
    groups
}

/// Aggregate counts shown after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub rows: usize,
    pub urls: usize,
    pub urls_without_content: usize,
    pub missing_from_title: usize,
    pub missing_from_meta: usize,
    pub missing_from_h1: usize,
    pub missing_from_h2: usize,
    pub missing_from_body: usize,
    pub body_no_data: usize,
    pub full_opportunities: usize,
}

impl ReportSummary {
    pub fn from_rows<L>(rows: &[StrikingDistanceRow], lookup: &L) -> Self
    where
        L: ContentLookup + ?Sized,
    {
        let urls: HashSet<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        let count = |pred: fn(&StrikingDistanceRow) -> bool| rows.iter().filter(|r| pred(r)).count();

        Self {
            rows: rows.len(),
            urls: urls.len(),
            urls_without_content: urls
                .iter()
                .filter(|u| lookup.lookup(u).page().is_none())
                .count(),
            missing_from_title: count(|r| !r.in_title),
            missing_from_meta: count(|r| !r.in_meta),
            missing_from_h1: count(|r| !r.in_h1),
            missing_from_h2: count(|r| !r.in_h2),
            missing_from_body: count(|r| r.in_body == BodyPresence::Absent),
            body_no_data: count(|r| r.in_body == BodyPresence::NoData),
            full_opportunities: count(StrikingDistanceRow::is_full_opportunity),
        }
    }
}
