//! Tab completion
//!
//! A [`Completer`] maps the line and cursor to a [`CompletionSet`]. The
//! editor splices a single candidate directly and lets the user pick
//! from a listing otherwise.

use crate::color::Color;
use crate::history::mnemonic;
use crate::pager::ListingRow;

/// Room for the `"{key:>4}: "` label in front of each word and a space
const LABEL_WIDTH: usize = 7;

/// Spaces between grid columns
const COLUMN_GAP: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub help: Option<String>,
    pub needs_quotes: bool,
    pub word_color: Color,
    pub help_color: Color,
}

impl Candidate {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            help: None,
            needs_quotes: false,
            word_color: Color::DEFAULT,
            help_color: Color::DEFAULT,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Insert the word in double quotes
    pub fn quoted(mut self) -> Self {
        self.needs_quotes = true;
        self
    }

    pub fn colors(mut self, word: Color, help: Color) -> Self {
        self.word_color = word;
        self.help_color = help;
        self
    }

    /// Text to put into the line when this candidate is chosen
    pub fn replacement(&self) -> String {
        if self.needs_quotes {
            format!("\"{}\"", self.word)
        } else {
            self.word.clone()
        }
    }

    fn width(&self) -> usize {
        self.word.chars().count()
    }
}

/// Candidates for one completion request
///
/// `replace_span` is the byte range of the line the chosen candidate
/// replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    pub candidates: Vec<Candidate>,
    pub replace_span: (usize, usize),
    pub hint: Option<String>,
    pub hint_color: Color,
}

impl CompletionSet {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            replace_span: (start, end),
            ..Self::default()
        }
    }

    pub fn add(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn with_hint(mut self, hint: impl Into<String>, color: Color) -> Self {
        self.hint = Some(hint.into());
        self.hint_color = color;
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Longest prefix shared by all candidates
    ///
    /// A lone candidate is returned in its quoted form if it needs
    /// quotes.
    pub fn common_prefix(&self) -> String {
        match self.candidates.as_slice() {
            [] => String::new(),
            [single] => single.replacement(),
            [first, rest @ ..] => {
                let mut len = first.word.len();

                for candidate in rest {
                    len = first.word[..len]
                        .char_indices()
                        .zip(candidate.word.chars())
                        .find(|((_, a), b)| a != b)
                        .map(|((pos, _), _)| pos)
                        .unwrap_or_else(|| len.min(candidate.word.len()));
                }

                first.word[..len].to_string()
            }
        }
    }

    /// Selection keys, one per candidate
    pub fn keys(&self) -> Vec<String> {
        (0..self.len()).map(mnemonic).collect()
    }

    pub fn choose(&self, key: &str) -> Option<&Candidate> {
        (0..self.len())
            .find(|&n| mnemonic(n) == key)
            .map(|n| &self.candidates[n])
    }

    /// Build the listing shown to the user for a screen `columns` wide
    pub fn listing(&self, columns: usize) -> Vec<ListingRow> {
        let mut rows = Vec::new();

        if let Some(hint) = &self.hint {
            let mut row = ListingRow::plain("Please input: ");
            row.push(hint.clone(), self.hint_color);
            rows.push(row);
        }

        let max_word = self.candidates.iter().map(Candidate::width).max().unwrap_or(0);

        if self.candidates.iter().any(|c| c.help.is_some()) {
            for (n, candidate) in self.candidates.iter().enumerate() {
                let mut row = ListingRow::new();

                row.push(
                    format!("{:>4}:  {}", mnemonic(n), candidate.word),
                    candidate.word_color,
                );
                row.push(
                    " ".repeat(max_word - candidate.width() + 4),
                    Color::DEFAULT,
                );
                if let Some(help) = &candidate.help {
                    row.push(help.clone(), candidate.help_color);
                }

                rows.push(row);
            }

            return rows;
        }

        let cell = max_word + LABEL_WIDTH;
        let per_row = columns.saturating_sub(1 + cell) / (cell + COLUMN_GAP) + 1;

        for (line, chunk) in self.candidates.chunks(per_row).enumerate() {
            let mut row = ListingRow::new();

            for (i, candidate) in chunk.iter().enumerate() {
                let n = line * per_row + i;

                if i > 0 {
                    row.push(" ".repeat(COLUMN_GAP), Color::DEFAULT);
                }

                row.push(
                    format!("{:>4}: {}", mnemonic(n), candidate.word),
                    candidate.word_color,
                );

                if i + 1 < chunk.len() {
                    row.push(
                        " ".repeat(cell - (LABEL_WIDTH - 1) - candidate.width()),
                        Color::DEFAULT,
                    );
                }
            }

            rows.push(row);
        }

        rows
    }
}

/// A type that provides completions for the line being edited
///
/// ```
/// use crossline::complete::{Candidate, Completer, CompletionSet};
///
/// static KEYWORDS: [&str; 5] = ["DELETE", "INSERT", "SELECT", "SET", "UPDATE"];
///
/// struct Keywords;
///
/// impl Completer for Keywords {
///     fn complete(&self, line: &str, cursor: usize) -> CompletionSet {
///         let start = line[..cursor].rfind(' ').map(|pos| pos + 1).unwrap_or(0);
///         let word = line[start..cursor].to_uppercase();
///
///         let mut set = CompletionSet::new(start, cursor);
///
///         for keyword in KEYWORDS.iter().filter(|k| k.starts_with(&word)) {
///             set.add(Candidate::new(*keyword));
///         }
///
///         set
///     }
/// }
///
/// let set = Keywords.complete("se", 2);
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.common_prefix(), "SE");
/// ```
pub trait Completer {
    /// Candidates for `line` with the cursor at byte offset `cursor`
    fn complete(&self, line: &str, cursor: usize) -> CompletionSet;
}

impl Completer for () {
    fn complete(&self, _: &str, cursor: usize) -> CompletionSet {
        CompletionSet::new(cursor, cursor)
    }
}

impl<T: Completer> Completer for &T {
    fn complete(&self, line: &str, cursor: usize) -> CompletionSet {
        T::complete(self, line, cursor)
    }
}

impl<T: Completer> Completer for &mut T {
    fn complete(&self, line: &str, cursor: usize) -> CompletionSet {
        T::complete(self, line, cursor)
    }
}

/// Completer backed by a closure
pub struct FnCompleter<F>(pub F);

impl<F> Completer for FnCompleter<F>
where
    F: Fn(&str, usize) -> CompletionSet,
{
    fn complete(&self, line: &str, cursor: usize) -> CompletionSet {
        (self.0)(line, cursor)
    }
}
