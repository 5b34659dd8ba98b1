const ARTICLES: [&str; 3] = ["a", "an", "the"];
const BOUNDARY_PUNCTUATION: [char; 4] = ['?', '!', '.', ':'];

/// Outcome of a keyword presence check.
///
/// `Unknown` means there was nothing to compare (empty query or empty text),
/// which is different from a confirmed absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    Unknown,
}

impl Presence {
    /// Collapses `Unknown` into absence.
    pub fn is_present(self) -> bool {
        self == Presence::Present
    }
}

/// Decides whether `query` appears in `text`, tolerating trailing sentence
/// punctuation, inserted or dropped articles and simple plural forms.
pub fn check_presence(query: &str, text: &str) -> Presence {
    let query = query.trim().to_lowercase();
    if query.is_empty() || text.is_empty() {
        return Presence::Unknown;
    }
    let text = text.to_lowercase();

    if text.contains(&query) {
        return Presence::Present;
    }
    if !query.chars().any(char::is_alphanumeric) {
        return Presence::Absent;
    }

    let found = candidates(&query).iter().any(|c| text.contains(c.as_str()));
    if found {
        Presence::Present
    } else {
        Presence::Absent
    }
}

/// Variant phrasings probed after the direct substring test.
fn candidates(query: &str) -> Vec<String> {
    let mut out: Vec<String> = BOUNDARY_PUNCTUATION
        .iter()
        .map(|p| format!("{query}{p}"))
        .collect();

    let words: Vec<&str> = query.split_whitespace().collect();
    for i in 0..=words.len() {
        for article in ARTICLES {
            let mut phrase = Vec::with_capacity(words.len() + 1);
            phrase.extend_from_slice(&words[..i]);
            phrase.push(article);
            phrase.extend_from_slice(&words[i..]);
            out.push(phrase.join(" "));
        }
    }

    let without_articles: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !ARTICLES.contains(w))
        .collect();
    if without_articles.len() < words.len() {
        out.push(without_articles.join(" "));
    }

    if let Some(stem) = query.strip_suffix('s') {
        out.push(stem.to_string());
        if let Some(stem) = query.strip_suffix("es") {
            out.push(stem.to_string());
        }
    } else {
        out.push(format!("{query}s"));
        out.push(format!("{query}es"));
    }

    // An all-article query leaves an empty phrase behind, which would match anything.
    out.retain(|c| !c.is_empty());
    out
}
