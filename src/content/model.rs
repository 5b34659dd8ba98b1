use std::collections::HashMap;

/// On-page text fields for one URL. Absent fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub h1: String,
    /// Up to five subheadings joined with a space.
    pub h2: String,
    pub body: String,
}

impl PageContent {
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Result of resolving a normalized URL against a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus<'a> {
    Found(&'a PageContent),
    Failed(&'a str),
    NotFound,
}

impl<'a> ContentStatus<'a> {
    pub fn page(self) -> Option<&'a PageContent> {
        match self {
            ContentStatus::Found(page) => Some(page),
            _ => None,
        }
    }
}

/// Read side of the content join, keyed by normalized URL.
pub trait ContentLookup {
    fn lookup(&self, url: &str) -> ContentStatus<'_>;
}

impl ContentLookup for HashMap<String, PageContent> {
    fn lookup(&self, url: &str) -> ContentStatus<'_> {
        self.get(url)
            .map(ContentStatus::Found)
            .unwrap_or(ContentStatus::NotFound)
    }
}

/// Collected pages plus the reason each failed URL could not be read.
#[derive(Debug, Clone, Default)]
pub struct ContentMap {
    pages: HashMap<String, PageContent>,
    failures: HashMap<String, String>,
}

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first record for a URL wins; later duplicates are ignored.
    pub fn insert(&mut self, key: impl Into<String>, page: PageContent) {
        let key = key.into();
        self.failures.remove(&key);
        self.pages.entry(key).or_insert(page);
    }

    pub fn record_failure(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        let key = key.into();
        if !self.pages.contains_key(&key) {
            self.failures.insert(key, reason.into());
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

impl ContentLookup for ContentMap {
    fn lookup(&self, url: &str) -> ContentStatus<'_> {
        if let Some(page) = self.pages.get(url) {
            ContentStatus::Found(page)
        } else if let Some(reason) = self.failures.get(url) {
            ContentStatus::Failed(reason.as_str())
        } else {
            ContentStatus::NotFound
        }
    }
}
