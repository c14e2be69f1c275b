//! Line history
//!
//! [`History`] is an append-only list of accepted lines. It is owned by
//! the [`crate::editor::Editor`] and survives between reads, while the
//! [`HistoryBrowser`] position only lives for a single read.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::CrosslineError;

/// Keys handed out to search results, in order
const MNEMONICS: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Selection key for the `n`th item of a listing
///
/// The first 61 items get a single character, later ones two.
pub fn mnemonic(n: usize) -> String {
    let base = MNEMONICS.len();

    if n < base {
        (MNEMONICS[n] as char).to_string()
    } else {
        let n = n - base;

        [MNEMONICS[(n / base) % base], MNEMONICS[n % base]]
            .iter()
            .map(|&b| b as char)
            .collect()
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub key: String,
    pub index: usize,
}

/// Search hits in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    matches: Vec<SearchMatch>,
}

impl SearchResults {
    fn push(&mut self, index: usize) {
        let key = mnemonic(self.matches.len());

        self.matches.push(SearchMatch { key, index });
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchMatch> {
        self.matches.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.key.as_str())
    }

    /// History index selected by `key`
    pub fn get(&self, key: &str) -> Option<usize> {
        self.matches.iter().find(|m| m.key == key).map(|m| m.index)
    }

    pub fn indices(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.index).collect()
    }
}

/// Parsed `search_words` pattern
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchPattern {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SearchPattern {
    /// Split into space separated words. `"quoted phrases"` are one word
    /// and a leading `-` excludes the word.
    pub fn parse(pattern: &str) -> Self {
        let mut result = Self::default();
        let mut chars = pattern.chars().peekable();

        loop {
            while chars.next_if_eq(&' ').is_some() {}

            let Some(&first) = chars.peek() else {
                break;
            };

            let exclude = first == '-';
            if exclude {
                chars.next();
            }

            let mut word = String::new();

            if chars.next_if_eq(&'"').is_some() {
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    word.push(c);
                }
            } else {
                while let Some(c) = chars.next_if(|&c| c != ' ') {
                    word.push(c);
                }
            }

            if word.is_empty() {
                continue;
            }

            if exclude {
                result.exclude.push(word);
            } else {
                result.include.push(word);
            }
        }

        result
    }

    pub fn matches(&self, entry: &str) -> bool {
        self.include.iter().all(|word| entry.contains(word.as_str()))
            && !self.exclude.iter().any(|word| entry.contains(word.as_str()))
    }
}

pub struct History {
    entries: Vec<String>,
    dedup: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dedup: true,
        }
    }

    /// Suppress repeated entries in search results
    pub fn set_search_dedup(&mut self, dedup: bool) {
        self.dedup = dedup;
    }

    pub fn search_dedup(&self) -> bool {
        self.dedup
    }

    /// Append a line unless it is empty or repeats the last entry
    pub fn append(&mut self, entry: &str) {
        if entry.is_empty() || self.entries.last().map(String::as_str) == Some(entry) {
            return;
        }

        self.entries.push(entry.to_string());
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append the lines of a file in file order
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, CrosslineError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let before = self.count();

        for line in reader.lines() {
            let line = line?;

            self.append(line.trim_end_matches(['\r', '\n']));
        }

        debug!(
            "loaded {} history entries from {}",
            self.count() - before,
            path.as_ref().display()
        );

        Ok(self.count() - before)
    }

    /// Overwrite a file with all entries, one per line
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CrosslineError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);

        for entry in self.entries.iter() {
            writeln!(writer, "{entry}")?;
        }

        writer.flush()?;

        debug!(
            "saved {} history entries to {}",
            self.count(),
            path.as_ref().display()
        );

        Ok(())
    }

    fn collect(
        &self,
        max_results: usize,
        forward: bool,
        mut matches: impl FnMut(&str) -> bool,
    ) -> SearchResults {
        let mut results = SearchResults::default();

        let indices: Box<dyn Iterator<Item = usize>> = if forward {
            Box::new(0..self.count())
        } else {
            Box::new((0..self.count()).rev())
        };

        for index in indices {
            if results.len() >= max_results {
                break;
            }

            let entry = self.entries[index].as_str();

            if !matches(entry) {
                continue;
            }

            // A repeated line is listed once, at its oldest position
            if self.dedup && self.entries[..index].iter().any(|e| e == entry) {
                continue;
            }

            results.push(index);
        }

        results
    }

    /// Entries containing `pattern`, newest first unless `forward`
    pub fn search(&self, pattern: &str, max_results: usize, forward: bool) -> SearchResults {
        self.collect(max_results, forward, |entry| entry.contains(pattern))
    }

    /// Entries matching every word of `pattern`, see [`SearchPattern`]
    pub fn search_words(&self, pattern: &str, max_results: usize, forward: bool) -> SearchResults {
        let pattern = SearchPattern::parse(pattern);

        self.collect(max_results, forward, |entry| pattern.matches(entry))
    }
}

/// Position while stepping through history with Up and Down
///
/// The entries and the text that was in the buffer before browsing
/// started form a cycle: `[oldest .. newest, draft]`.
#[derive(Default)]
pub(crate) struct HistoryBrowser {
    position: Option<usize>,
    draft: String,
}

impl HistoryBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn start(&mut self, history: &History, current: &str) -> Option<usize> {
        if history.is_empty() {
            return None;
        }

        if self.position.is_none() {
            self.draft = current.to_string();
        }

        Some(*self.position.get_or_insert(history.count()))
    }

    fn text(&self, history: &History) -> Option<String> {
        let position = self.position?;

        Some(match history.get(position) {
            Some(entry) => entry.to_string(),
            None => self.draft.clone(),
        })
    }

    /// Step towards older entries
    pub(crate) fn back(&mut self, history: &History, current: &str) -> Option<String> {
        let position = self.start(history, current)?;

        self.position = Some(if position == 0 {
            history.count()
        } else {
            position - 1
        });

        self.text(history)
    }

    /// Step towards newer entries
    pub(crate) fn forward(&mut self, history: &History, current: &str) -> Option<String> {
        let position = self.start(history, current)?;

        self.position = Some(if position >= history.count() {
            0
        } else {
            position + 1
        });

        self.text(history)
    }

    /// Jump to the oldest entry
    pub(crate) fn first(&mut self, history: &History, current: &str) -> Option<String> {
        self.start(history, current)?;
        self.position = Some(0);

        self.text(history)
    }

    /// Jump back to the text from before browsing
    pub(crate) fn last(&mut self, history: &History) -> Option<String> {
        self.position?;
        self.position = Some(history.count());

        self.text(history)
    }

    pub(crate) fn reset(&mut self) {
        self.position = None;
        self.draft.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> History {
        let mut history = History::new();

        for entry in entries {
            history.append(entry);
        }

        history
    }

    fn found<'a>(history: &'a History, results: &SearchResults) -> Vec<&'a str> {
        results
            .iter()
            .map(|m| history.get(m.index).unwrap())
            .collect()
    }

    #[test]
    fn append() {
        let mut history = History::new();

        history.append("a");
        history.append("a");
        history.append("");
        history.append("b");
        history.append("a");

        assert_eq!(history.entries().collect::<Vec<_>>(), ["a", "b", "a"]);
        assert_eq!(history.count(), 3);
        assert_eq!(history.get(1), Some("b"));
        assert_eq!(history.get(3), None);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn search_dedup() {
        let mut history = history(&["a", "b", "a", "c"]);

        let results = history.search("", 16, false);
        assert_eq!(found(&history, &results), ["c", "b", "a"]);
        assert_eq!(results.indices(), [3, 1, 0]);

        let results = history.search("", 16, true);
        assert_eq!(found(&history, &results), ["a", "b", "c"]);

        history.set_search_dedup(false);
        let results = history.search("", 16, false);
        assert_eq!(found(&history, &results), ["c", "a", "b", "a"]);
    }

    #[test]
    fn search_keys_and_limit() {
        let history = history(&["select a", "insert b", "select c", "select d"]);

        let results = history.search("select", 2, false);

        assert_eq!(results.keys().collect::<Vec<_>>(), ["1", "2"]);
        assert_eq!(results.get("1"), Some(3));
        assert_eq!(results.get("2"), Some(2));
        assert_eq!(results.get("3"), None);

        assert!(history.search("Select", 16, false).is_empty());
    }

    #[test]
    fn mnemonics() {
        assert_eq!(mnemonic(0), "1");
        assert_eq!(mnemonic(8), "9");
        assert_eq!(mnemonic(9), "a");
        assert_eq!(mnemonic(35), "A");
        assert_eq!(mnemonic(60), "Z");
        assert_eq!(mnemonic(61), "11");
        assert_eq!(mnemonic(62), "12");
        assert_eq!(mnemonic(61 + 61), "21");
    }

    #[test]
    fn search_pattern() {
        assert_eq!(
            SearchPattern::parse(r#"select "from t" -where  -"x y""#),
            SearchPattern {
                include: vec!["select".to_string(), "from t".to_string()],
                exclude: vec!["where".to_string(), "x y".to_string()],
            }
        );

        assert_eq!(SearchPattern::parse("   "), SearchPattern::default());
    }

    #[test]
    fn search_words() {
        let history = history(&[
            "select * from t where a",
            "select * from t",
            "select * from u",
            "insert into t",
        ]);

        let results = history.search_words("select where", 16, true);
        assert_eq!(found(&history, &results), ["select * from t where a"]);

        let results = history.search_words("from -where", 16, true);
        assert_eq!(found(&history, &results), ["select * from t", "select * from u"]);

        let results = history.search_words(r#""from t""#, 16, false);
        assert_eq!(
            found(&history, &results),
            ["select * from t", "select * from t where a"]
        );

        assert_eq!(
            history.search_words("insert", 16, false),
            history.search("insert", 16, false)
        );
    }

    #[test]
    fn load_and_save() {
        let path = std::env::temp_dir().join(format!("crossline-history-{}", std::process::id()));

        std::fs::write(&path, "one\r\n\ntwo\nthree\n").unwrap();

        let mut history = history(&["zero"]);
        assert_eq!(history.load(&path).unwrap(), 3);
        assert_eq!(
            history.entries().collect::<Vec<_>>(),
            ["zero", "one", "two", "three"]
        );

        history.save(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "zero\none\ntwo\nthree\n"
        );

        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            history.load(&path),
            Err(CrosslineError::History(_))
        ));
    }

    #[test]
    fn browser() {
        let history = history(&["select a", "select b"]);
        let mut browser = HistoryBrowser::new();

        assert!(!browser.is_active());

        assert_eq!(browser.back(&history, "draft").as_deref(), Some("select b"));
        assert_eq!(browser.back(&history, "select b").as_deref(), Some("select a"));
        assert_eq!(browser.back(&history, "select a").as_deref(), Some("draft"));
        assert_eq!(browser.back(&history, "draft").as_deref(), Some("select b"));

        assert_eq!(browser.forward(&history, "").as_deref(), Some("draft"));
        assert_eq!(browser.forward(&history, "").as_deref(), Some("select a"));

        assert_eq!(browser.last(&history).as_deref(), Some("draft"));
        assert_eq!(browser.first(&history, "").as_deref(), Some("select a"));

        assert!(browser.is_active());
        browser.reset();
        assert!(!browser.is_active());
        assert_eq!(browser.last(&history), None);

        assert_eq!(browser.forward(&history, "new").as_deref(), Some("select a"));
    }

    #[test]
    fn browser_without_history() {
        let history = History::new();
        let mut browser = HistoryBrowser::new();

        assert_eq!(browser.back(&history, ""), None);
        assert_eq!(browser.forward(&history, ""), None);
        assert!(!browser.is_active());
    }
}
