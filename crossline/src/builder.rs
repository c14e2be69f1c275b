//! Builder for editors

use std::path::Path;

use crate::{
    color::Color,
    complete::Completer,
    core::Config,
    editor::Editor,
    error::CrosslineError,
    history::History,
    line_buffer::Delimiters,
};

/// Builder for [`Editor`].
///
/// # Example
/// ```no_run
/// use crossline::builder::EditorBuilder;
/// use crossline::color::{BaseColor, Color};
///
/// let editor = EditorBuilder::new()
///     .with_prompt_color(Color::fg(BaseColor::Green).bright())
///     .with_history_file("history.txt")
///     .unwrap()
///     .build();
/// ```
pub struct EditorBuilder<C: Completer = ()> {
    config: Config,
    history: History,
    completer: C,
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBuilder {
    /// Create builder with default settings, empty history and no
    /// completer
    ///
    /// # Example
    /// ```
    /// use crossline::builder::EditorBuilder;
    ///
    /// let editor = EditorBuilder::new().build();
    ///
    /// assert!(editor.history().is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            history: History::new(),
            completer: (),
        }
    }
}

impl<C: Completer> EditorBuilder<C> {
    pub fn with_prompt_color(mut self, color: Color) -> Self {
        self.config.prompt_color = color;
        self
    }

    /// Characters that end words for word movement, case changes and
    /// word cuts
    pub fn with_delimiters(mut self, delimiters: impl Into<String>) -> Self {
        self.config.delimiters = Delimiters::new(delimiters);
        self
    }

    /// Treat a lone ESC as a prefix that turns the next key into an Alt
    /// key. On by default.
    pub fn with_escape_combo(mut self, enabled: bool) -> Self {
        self.config.escape_combo = enabled;
        self
    }

    /// Leave repeated lines out of history search results. On by
    /// default.
    pub fn with_search_dedup(mut self, enabled: bool) -> Self {
        self.history.set_search_dedup(enabled);
        self
    }

    /// Maximum number of history search results
    pub fn with_search_max(mut self, max: usize) -> Self {
        self.config.search_max = max.max(1);
        self
    }

    /// Maximum line length in characters, 0 for no limit
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = (capacity > 0).then_some(capacity);
        self
    }

    /// Pause listings taller than the screen
    pub fn with_paging(mut self, enabled: bool) -> Self {
        self.config.paging = enabled;
        self
    }

    /// Start out with `history`. The search dedup setting of the builder
    /// is kept.
    pub fn with_history(mut self, mut history: History) -> Self {
        history.set_search_dedup(self.history.search_dedup());
        self.history = history;
        self
    }

    /// Load history from a file. A missing file gives an empty history.
    pub fn with_history_file(mut self, path: impl AsRef<Path>) -> Result<Self, CrosslineError> {
        let path = path.as_ref();

        if path.exists() {
            self.history.load(path)?;
        }

        Ok(self)
    }

    /// Use `completer` for Tab completion
    ///
    /// # Example
    /// ```
    /// use crossline::builder::EditorBuilder;
    /// use crossline::complete::{Candidate, CompletionSet, FnCompleter};
    ///
    /// let editor = EditorBuilder::new()
    ///     .with_completer(FnCompleter(|_: &str, cursor: usize| {
    ///         let mut set = CompletionSet::new(0, cursor);
    ///         set.add(Candidate::new("SELECT"));
    ///         set
    ///     }))
    ///     .build();
    /// ```
    pub fn with_completer<D: Completer>(self, completer: D) -> EditorBuilder<D> {
        EditorBuilder {
            config: self.config,
            history: self.history,
            completer,
        }
    }

    /// Build [`Editor`]. Building does not touch the terminal.
    pub fn build(self) -> Editor<C> {
        Editor::new(self.history, self.config, self.completer)
    }
}
