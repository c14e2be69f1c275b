//! Read loop
//!
//! A [`Line`] owns everything that lives for a single read: the buffer,
//! the renderer and the history browse position. Everything that outlives
//! it is kept in the [`Session`] it borrows. History search, completion
//! choice and confirmations are nested reads, each a new [`Line`] on the
//! same session, so they end before the read that started them resumes.

use core::ops::Range;

use log::{debug, trace};

use crate::color::Color;
use crate::complete::Completer;
use crate::editor::{ReadOutcome, Termination};
use crate::error::CrosslineError;
use crate::history::{History, HistoryBrowser};
use crate::io::Terminal;
use crate::key::{KeyDecoder, KeyEvent};
use crate::keymap::{self, Command};
use crate::line_buffer::{CaseChange, Delimiters, LineBuffer};
use crate::output::{Refresh, Renderer};
use crate::pager::{ListingRow, Pager};
use crate::terminal::{ResizeFlag, Screen};

const SEARCH_PROMPT: &str = "History Search: ";
const HISTORY_CHOICE_PROMPT: &str = "Input history id: ";
const MATCH_CHOICE_PROMPT: &str = "Input match id: ";
const CLEAR_HISTORY_PROMPT: &str = "!!! Confirm to clear history [y]: ";

const CTRL_C: u8 = 0x03;

pub(crate) struct Config {
    pub(crate) prompt_color: Color,
    pub(crate) delimiters: Delimiters,
    pub(crate) escape_combo: bool,
    pub(crate) search_max: usize,
    pub(crate) capacity: Option<usize>,
    pub(crate) paging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_color: Color::DEFAULT,
            delimiters: Delimiters::default(),
            escape_combo: true,
            search_max: 16,
            capacity: Some(4096),
            paging: true,
        }
    }
}

/// State shared by every read of an editor
pub(crate) struct Session {
    pub(crate) history: History,
    pub(crate) clip: String,
    pub(crate) config: Config,
    pub(crate) decoder: KeyDecoder,
    pub(crate) resize: ResizeFlag,
}

impl Session {
    pub(crate) fn new(history: History, config: Config) -> Self {
        Self {
            history,
            clip: String::new(),
            config,
            decoder: KeyDecoder::new(),
            resize: ResizeFlag::new(),
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum ReadMode<'k> {
    /// Top level read with history and completion
    Edit,
    /// Plain nested read, `searching` selects the search pattern help
    Prompt { searching: bool },
    /// Nested read that only accepts one of the keys
    Choice(&'k [String]),
}

pub(crate) struct Line<'a, C: Completer + ?Sized> {
    session: &'a mut Session,
    completer: &'a C,
    prompt: &'a str,
    mode: ReadMode<'a>,
    buffer: LineBuffer,
    renderer: Renderer,
    browser: HistoryBrowser,
}

impl<'a, C: Completer + ?Sized> Line<'a, C> {
    pub(crate) fn new(
        session: &'a mut Session,
        completer: &'a C,
        prompt: &'a str,
        mode: ReadMode<'a>,
        screen: Screen,
    ) -> Self {
        let buffer = LineBuffer::new(session.config.capacity);
        let renderer = Renderer::new(screen, session.config.prompt_color);

        Self {
            session,
            completer,
            prompt,
            mode,
            buffer,
            renderer,
            browser: HistoryBrowser::new(),
        }
    }

    /// Read until the line is accepted or abandoned
    pub(crate) fn read<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        initial: &str,
    ) -> Result<ReadOutcome, CrosslineError> {
        self.start(port, initial)?;

        loop {
            if let Some(outcome) = self.step(port)? {
                return Ok(outcome);
            }
        }
    }

    /// Put `initial` in the buffer and draw prompt and text
    pub(crate) fn start<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        initial: &str,
    ) -> Result<(), CrosslineError> {
        self.buffer.set_text(initial);
        self.refresh(port, Refresh::RedrawAll)
    }

    /// Handle one key
    pub(crate) fn step<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
    ) -> Result<Option<ReadOutcome>, CrosslineError> {
        self.check_resize(port)?;

        let event = match self
            .session
            .decoder
            .next_key(port, self.session.config.escape_combo)
        {
            Ok(event) => event,
            Err(CrosslineError::InputEof) => {
                return self.end(port, "", Termination::EndOfInput).map(Some)
            }
            Err(CrosslineError::ReadError(embedded_io::ErrorKind::Interrupted)) => {
                return Ok(None)
            }
            Err(err) => return Err(err),
        };

        self.check_resize(port)?;
        self.dispatch(port, event)
    }

    fn check_resize<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        if self.session.resize.take() {
            let screen = Screen::query(port);

            self.renderer.resize(port, screen)?;
            self.refresh(port, Refresh::RedrawAll)?;
        }

        Ok(())
    }

    fn dispatch<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        event: KeyEvent,
    ) -> Result<Option<ReadOutcome>, CrosslineError> {
        let command = match Command::from_key(event) {
            Some(command) => command,
            None if event.escaped => {
                debug!("unbound key {event:?}, cancelling");
                Command::Cancel
            }
            None => {
                self.bell(port)?;
                return Ok(None);
            }
        };

        if command.needs_history() && !matches!(self.mode, ReadMode::Edit) {
            self.bell(port)?;
            return Ok(None);
        }

        trace!("{command:?}");

        let cursor = self.buffer.cursor();
        let delimiters = &self.session.config.delimiters;

        match command {
            Command::Insert(c) => return self.insert(port, c),
            Command::Accept => return self.accept(port).map(Some),
            Command::Interrupt => return self.end(port, "^C", Termination::Interrupted).map(Some),
            Command::Cancel => return self.end(port, "", Termination::Interrupted).map(Some),
            Command::DeleteOrEof if self.buffer.is_empty() => {
                return self.end(port, "", Termination::EndOfInput).map(Some)
            }

            Command::Left => self.move_cursor(port, cursor.saturating_sub(1))?,
            Command::Right => self.move_cursor(port, cursor + 1)?,
            Command::WordLeft => {
                let pos = self.buffer.word_left(cursor, delimiters);
                self.move_cursor(port, pos)?
            }
            Command::WordRight => {
                let pos = self.buffer.word_right(cursor, delimiters);
                self.move_cursor(port, pos)?
            }
            Command::Home => self.move_cursor(port, 0)?,
            Command::End => self.move_cursor(port, self.buffer.len())?,
            Command::RowUp => self.move_row(port, true)?,
            Command::RowDown => self.move_row(port, false)?,
            Command::ClearScreen => {
                port.clear_screen()?;
                self.renderer.reset();
                self.refresh(port, Refresh::RedrawAll)?
            }

            Command::Backspace => match self.buffer.backspace() {
                Some(at) => self.edited(port, Some(at))?,
                None => self.bell(port)?,
            },
            Command::Delete | Command::DeleteOrEof => match self.buffer.delete() {
                Some(at) => self.edited(port, Some(at))?,
                None => self.bell(port)?,
            },
            Command::Upcase => self.change_case(port, CaseChange::Upper)?,
            Command::Downcase => self.change_case(port, CaseChange::Lower)?,
            Command::Capitalize => self.change_case(port, CaseChange::Capitalize)?,
            Command::TrimSpaces => {
                let at = self.buffer.trim_spaces();
                self.edited(port, at)?
            }
            Command::Transpose => {
                let at = self.buffer.transpose(delimiters);
                self.edited(port, at)?
            }

            Command::CutToEnd => self.cut(port, cursor..self.buffer.len())?,
            Command::CutToStart => self.cut(port, 0..cursor)?,
            Command::CutLine => self.cut(port, 0..self.buffer.len())?,
            Command::CutToSpace => {
                let start = self.buffer.space_left(delimiters);
                self.cut(port, start..cursor)?
            }
            Command::CutWordLeft => {
                let start = self.buffer.word_left(cursor, delimiters);
                self.cut(port, start..cursor)?
            }
            Command::CutWordRight => {
                let end = self.buffer.word_right(cursor, delimiters);
                self.cut(port, cursor..end)?
            }
            Command::Paste => match self.buffer.insert_str(&self.session.clip) {
                Ok(at) => self.edited(port, at)?,
                Err(()) => self.bell(port)?,
            },

            Command::Complete => self.complete(port, false)?,
            Command::ListCompletions => self.complete(port, true)?,

            Command::Up => self.history_step(port, true, true)?,
            Command::Down => self.history_step(port, false, true)?,
            Command::HistoryPrevious => self.history_step(port, true, false)?,
            Command::HistoryNext => self.history_step(port, false, false)?,
            Command::HistoryFirst => {
                let text = self
                    .browser
                    .first(&self.session.history, self.buffer.as_str());
                self.show_history(port, text)?
            }
            Command::HistoryLast => {
                let text = self.browser.last(&self.session.history);
                self.show_history(port, text)?
            }
            Command::HistorySearch => {
                let pattern = (!self.buffer.is_empty()).then(|| self.buffer.as_str().to_string());
                self.search(port, pattern, false)?
            }
            Command::ListHistory => self.list_history(port)?,
            Command::ClearHistory => self.clear_history(port)?,

            Command::Help => self.help(port)?,
            Command::KeyboardDebug => self.keyboard_debug(port)?,
            Command::Revert => {
                self.buffer.clear();
                self.edited(port, Some(0))?
            }
            Command::Suspend => {
                self.renderer.finish(port, "")?;
                port.suspend()?;
                self.renderer.set_screen(Screen::query(port));
                self.refresh(port, Refresh::RedrawAll)?
            }
        }

        Ok(None)
    }

    fn refresh<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        mode: Refresh,
    ) -> Result<(), CrosslineError> {
        self.renderer.refresh(
            port,
            self.prompt,
            self.buffer.as_str(),
            self.buffer.cursor(),
            mode,
        )?;

        Ok(())
    }

    /// Redraw after the text changed from character `at` onwards, or
    /// just move the cursor if nothing changed
    fn edited<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        at: Option<usize>,
    ) -> Result<(), CrosslineError> {
        let mode = match at {
            Some(at) => self.renderer.edit_mode(self.prompt, at, self.buffer.len()),
            None => Refresh::MoveOnly,
        };

        self.refresh(port, mode)
    }

    fn bell<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        port.beep()?;
        port.flush()
    }

    fn move_cursor<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        cursor: usize,
    ) -> Result<(), CrosslineError> {
        self.buffer.set_cursor(cursor);
        self.refresh(port, Refresh::MoveOnly)
    }

    fn row_of(&self, cursor: usize) -> usize {
        let offset = self.prompt.chars().count() + cursor;

        self.renderer.screen().frame(offset).row
    }

    fn move_row<T: Terminal + ?Sized>(&mut self, port: &mut T, up: bool) -> Result<(), CrosslineError> {
        let columns = self.renderer.screen().columns;
        let cursor = self.buffer.cursor();

        let target = if up {
            cursor.saturating_sub(columns)
        } else {
            cursor + columns
        };

        self.move_cursor(port, target)
    }

    fn change_case<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        change: CaseChange,
    ) -> Result<(), CrosslineError> {
        let at = self
            .buffer
            .change_case(change, &self.session.config.delimiters);

        self.edited(port, at)
    }

    fn cut<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        range: Range<usize>,
    ) -> Result<(), CrosslineError> {
        let start = range.start;
        let removed = self.buffer.delete_range(range);

        if removed.is_empty() {
            return Ok(());
        }

        self.session.clip = removed;
        self.edited(port, Some(start))
    }

    fn insert<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        c: char,
    ) -> Result<Option<ReadOutcome>, CrosslineError> {
        match self.buffer.insert_char(c) {
            Ok(at) => self.edited(port, Some(at))?,
            Err(_) => {
                self.bell(port)?;
                return Ok(None);
            }
        }

        let ReadMode::Choice(keys) = self.mode else {
            return Ok(None);
        };

        let typed = self.buffer.as_str();
        let exact = keys.iter().any(|key| key == typed);
        let longer = keys
            .iter()
            .any(|key| key.len() > typed.len() && key.starts_with(typed));

        if exact && !longer {
            self.accept(port).map(Some)
        } else if exact || longer {
            Ok(None)
        } else {
            Err(self.reject(port))
        }
    }

    /// End a choice read that got something other than a key. The typed
    /// text goes back to the input for the read that resumes.
    fn reject<T: Terminal + ?Sized>(&mut self, port: &mut T) -> CrosslineError {
        if let Err(err) = self.renderer.finish(port, "") {
            return err;
        }

        debug!("choice {:?} rejected", self.buffer.as_str());

        for byte in self.buffer.as_str().bytes().rev() {
            port.push_back(byte);
        }

        CrosslineError::RestrictedChoiceRejected
    }

    fn accept<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<ReadOutcome, CrosslineError> {
        match self.mode {
            ReadMode::Edit => self.session.history.append(self.buffer.as_str()),
            ReadMode::Prompt { .. } => (),
            ReadMode::Choice(keys) => {
                let typed = self.buffer.as_str();

                if typed.is_empty() {
                    return self.end(port, "", Termination::Interrupted);
                }

                if !keys.iter().any(|key| key == typed) {
                    return Err(self.reject(port));
                }
            }
        }

        self.end(port, "", Termination::Accepted)
    }

    fn end<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        mark: &str,
        termination: Termination,
    ) -> Result<ReadOutcome, CrosslineError> {
        self.renderer.finish(port, mark)?;

        debug!("read ended, {termination:?}");

        Ok(ReadOutcome::new(self.buffer.as_str(), termination))
    }

    fn sub_read<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        prompt: &str,
        mode: ReadMode<'_>,
        initial: &str,
    ) -> Result<ReadOutcome, CrosslineError> {
        debug!("nested read {prompt:?}");

        let screen = self.renderer.screen();
        let mut line = Line::new(&mut *self.session, self.completer, prompt, mode, screen);
        let outcome = line.read(port, initial);

        self.renderer.set_screen(line.renderer.screen());

        outcome
    }

    /// Ask for one of `keys`. `None` if the user cancelled or typed
    /// something else.
    fn choose<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        prompt: &str,
        keys: &[String],
        initial: &str,
    ) -> Result<Option<String>, CrosslineError> {
        match self.sub_read(port, prompt, ReadMode::Choice(keys), initial) {
            Ok(outcome) if outcome.accepted() => Ok(Some(outcome.text)),
            Ok(_) | Err(CrosslineError::RestrictedChoiceRejected) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn print<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        rows: &[ListingRow],
    ) -> Result<(), CrosslineError> {
        let mut pager = Pager::new(port, self.session.config.paging);

        pager.print(
            port,
            &mut self.session.decoder,
            self.session.config.escape_combo,
            rows,
        )?;

        Ok(())
    }

    fn show_history<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        text: Option<String>,
    ) -> Result<(), CrosslineError> {
        match text {
            Some(text) => {
                self.buffer.set_text(&text);
                self.edited(port, Some(0))
            }
            None => self.bell(port),
        }
    }

    /// Up and Down. With `rows` set they first move within a wrapped
    /// line, then browse history. Leaving the end of a typed line
    /// searches for it instead.
    fn history_step<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        back: bool,
        rows: bool,
    ) -> Result<(), CrosslineError> {
        let cursor = self.buffer.cursor();
        let at_end = cursor == self.buffer.len();

        if rows && !at_end {
            let row = self.row_of(cursor);

            if (back && row > 0) || (!back && row < self.row_of(self.buffer.len())) {
                return self.move_row(port, back);
            }
        }

        if !matches!(self.mode, ReadMode::Edit) {
            return self.bell(port);
        }

        if self.browser.is_active() || self.buffer.is_empty() || !at_end {
            let history = &self.session.history;
            let current = self.buffer.as_str();

            let text = if back {
                self.browser.back(history, current)
            } else {
                self.browser.forward(history, current)
            };

            return self.show_history(port, text);
        }

        let pattern = self.buffer.as_str().to_string();

        self.search(port, Some(pattern), !back)
    }

    /// Search history and let the user pick a match. Without a pattern
    /// a nested read asks for one.
    fn search<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        pattern: Option<String>,
        forward: bool,
    ) -> Result<(), CrosslineError> {
        self.renderer.finish(port, "")?;

        let pattern = match pattern {
            Some(pattern) => pattern,
            None => {
                let outcome =
                    self.sub_read(port, SEARCH_PROMPT, ReadMode::Prompt { searching: true }, "")?;

                if !outcome.accepted() {
                    return self.refresh(port, Refresh::RedrawAll);
                }

                outcome.text
            }
        };

        debug!("history search for {pattern:?}");

        let results = self.session.history.search_words(
            &pattern,
            self.session.config.search_max,
            forward,
        );

        self.session.clip = pattern;

        if results.is_empty() {
            port.beep()?;
            return self.refresh(port, Refresh::RedrawAll);
        }

        let rows: Vec<ListingRow> = results
            .iter()
            .map(|found| {
                let entry = self.session.history.get(found.index).unwrap_or_default();
                ListingRow::plain(format!("{:>4}:  {entry}", found.key))
            })
            .collect();

        self.print(port, &rows)?;

        let keys: Vec<String> = results.keys().map(str::to_string).collect();
        let initial = match keys.as_slice() {
            [only] => only.clone(),
            _ => String::new(),
        };

        if let Some(key) = self.choose(port, HISTORY_CHOICE_PROMPT, &keys, &initial)? {
            if let Some(entry) = results.get(&key).and_then(|i| self.session.history.get(i)) {
                self.buffer.set_text(entry);
            }
        }

        self.refresh(port, Refresh::RedrawAll)
    }

    fn complete<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        always_list: bool,
    ) -> Result<(), CrosslineError> {
        let set = self
            .completer
            .complete(self.buffer.as_str(), self.buffer.cursor_byte());

        trace!("{} completions, span {:?}", set.len(), set.replace_span);

        if set.is_empty() && set.hint.is_none() {
            return self.bell(port);
        }

        let (start, mut end) = set.replace_span;

        let prefix = set.common_prefix();
        let typed = self
            .buffer
            .as_str()
            .get(start..end)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        if !prefix.is_empty() && prefix.chars().count() >= typed {
            match self.buffer.splice(start..end, &prefix) {
                Ok(at) => {
                    end = start + prefix.len();
                    self.edited(port, at)?;
                }
                Err(()) => return self.bell(port),
            }
        }

        if set.len() == 1 && set.hint.is_none() && !always_list {
            return Ok(());
        }

        self.renderer.finish(port, "")?;

        let rows = set.listing(self.renderer.screen().columns);
        self.print(port, &rows)?;

        if !set.is_empty() {
            let keys = set.keys();

            if let Some(key) = self.choose(port, MATCH_CHOICE_PROMPT, &keys, "")? {
                if let Some(candidate) = set.choose(&key) {
                    if self
                        .buffer
                        .splice(start..end, &candidate.replacement())
                        .is_err()
                    {
                        port.beep()?;
                    }
                }
            }
        }

        self.refresh(port, Refresh::RedrawAll)
    }

    fn help<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        let searching = matches!(self.mode, ReadMode::Prompt { searching: true });

        self.renderer.finish(port, "")?;
        self.print(port, &keymap::help(searching))?;
        self.refresh(port, Refresh::RedrawAll)
    }

    fn list_history<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        let rows: Vec<ListingRow> = self
            .session
            .history
            .entries()
            .enumerate()
            .map(|(n, entry)| ListingRow::plain(format!("{:>4}:  {entry}", n + 1)))
            .collect();

        self.renderer.finish(port, "")?;
        self.print(port, &rows)?;
        self.refresh(port, Refresh::RedrawAll)
    }

    fn clear_history<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        self.renderer.finish(port, "")?;

        let outcome = self.sub_read(
            port,
            CLEAR_HISTORY_PROMPT,
            ReadMode::Prompt { searching: false },
            "",
        )?;

        if outcome.accepted() && matches!(outcome.text.chars().next(), Some('y' | 'Y')) {
            debug!("clearing {} history entries", self.session.history.count());

            self.session.history.clear();
            self.browser.reset();
        }

        self.refresh(port, Refresh::RedrawAll)
    }

    /// Echo raw input bytes until Ctrl-C
    fn keyboard_debug<T: Terminal + ?Sized>(&mut self, port: &mut T) -> Result<(), CrosslineError> {
        self.renderer.finish(port, "")?;
        port.write_str("Keyboard debug mode, press Ctrl-C to leave\r\n")?;
        port.flush()?;

        loop {
            let byte = match port.read_byte() {
                Ok(CTRL_C) | Err(CrosslineError::InputEof) => break,
                Ok(byte) => byte,
                Err(err) => return Err(err),
            };

            let shown = if byte == b' ' || byte.is_ascii_graphic() {
                byte as char
            } else {
                ' '
            };

            port.write_str(&format!("{byte:3} 0x{byte:02x} ({shown})\r\n"))?;
            port.flush()?;
        }

        self.refresh(port, Refresh::RedrawAll)
    }
}
