//! Screen rendering
//!
//! The [`Renderer`] remembers where the cursor and the end of the line
//! are on screen, measured as character offsets into `prompt + text`,
//! and reconciles that with the buffer after every edit. Only relative
//! cursor movement is used, so the line can start anywhere on screen and
//! scroll freely.
//!
//! Whenever a write ends exactly on a column boundary a `\r\n` follows,
//! which keeps the physical cursor on the row given by `offset / columns`
//! instead of leaving it in the terminal's pending wrap state.

use log::trace;

use crate::color::Color;
use crate::error::CrosslineError;
use crate::io::Terminal;
use crate::terminal::Screen;

/// How much of the line to redraw
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Only the cursor moved
    MoveOnly,
    /// Text changed at this character offset and after
    RedrawFrom(usize),
    /// Everything, including the prompt
    RedrawAll,
}

/// What is currently on screen, as offsets into `prompt + text`
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub cursor: usize,
    pub end: usize,
}

pub struct Renderer {
    screen: Screen,
    display: DisplayState,
    prompt_color: Color,
}

fn width(s: &str) -> usize {
    s.chars().count()
}

impl Renderer {
    pub fn new(screen: Screen, prompt_color: Color) -> Self {
        Self {
            screen,
            display: DisplayState::default(),
            prompt_color,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn display(&self) -> DisplayState {
        self.display
    }

    /// Take over the geometry found by a nested read. Only valid while
    /// nothing is drawn.
    pub fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    /// Forget what is on screen, the next refresh starts on a fresh line
    pub fn reset(&mut self) {
        self.display = DisplayState::default();
    }

    fn move_to<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        target: usize,
    ) -> Result<(), CrosslineError> {
        let from = self.screen.frame(self.display.cursor);
        let to = self.screen.frame(target);

        if to.row < from.row {
            port.write_str(&format!("\x1b[{}A", from.row - to.row))?;
        } else if to.row > from.row {
            port.write_str(&format!("\x1b[{}B", to.row - from.row))?;
        }

        if to.column < from.column {
            port.write_str(&format!("\x1b[{}D", from.column - to.column))?;
        } else if to.column > from.column {
            port.write_str(&format!("\x1b[{}C", to.column - from.column))?;
        }

        self.display.cursor = target;

        Ok(())
    }

    fn put<T: Terminal + ?Sized>(&mut self, port: &mut T, s: &str) -> Result<(), CrosslineError> {
        let count = width(s);

        if count == 0 {
            return Ok(());
        }

        port.write_str(s)?;
        self.display.cursor += count;

        if self.display.cursor % self.screen.columns == 0 {
            port.write(b"\r\n")?;
        }

        Ok(())
    }

    fn put_prompt<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        prompt: &str,
    ) -> Result<(), CrosslineError> {
        if self.prompt_color.is_default() {
            self.put(port, prompt)
        } else {
            port.set_color(self.prompt_color)?;
            self.put(port, prompt)?;
            port.set_color(Color::DEFAULT)
        }
    }

    /// Bring the screen in line with `prompt + text` and put the cursor
    /// at character `cursor` of `text`
    pub fn refresh<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        prompt: &str,
        text: &str,
        cursor: usize,
        mode: Refresh,
    ) -> Result<DisplayState, CrosslineError> {
        let prompt_width = width(prompt);
        let new_cursor = prompt_width + cursor.min(width(text));
        let new_end = prompt_width + width(text);
        let old_end = self.display.end;

        trace!("refresh {mode:?} {:?} -> {new_cursor}/{new_end}", self.display);

        if mode == Refresh::MoveOnly {
            self.move_to(port, new_cursor)?;
            self.display.end = new_end;
            port.flush()?;

            return Ok(self.display);
        }

        port.show_cursor(false)?;

        match mode {
            Refresh::RedrawFrom(k) => {
                let start = (prompt_width + k).min(old_end).min(new_end);

                self.move_to(port, start)?;

                let skip = text
                    .char_indices()
                    .nth(start - prompt_width)
                    .map(|(pos, _)| pos)
                    .unwrap_or(text.len());

                self.put(port, &text[skip..])?;
            }
            _ => {
                self.move_to(port, 0)?;
                self.put_prompt(port, prompt)?;
                self.put(port, text)?;
            }
        }

        if old_end > self.display.cursor {
            let padding = " ".repeat(old_end - self.display.cursor);
            self.put(port, &padding)?;
        }

        self.move_to(port, new_cursor)?;
        self.display.end = new_end;

        port.show_cursor(true)?;
        port.flush()?;

        Ok(self.display)
    }

    /// Choose between a partial and a full redraw after the text changed
    /// at offset `k`. A partial redraw is only used while the old end,
    /// the new end and the change all sit on the same row.
    pub fn edit_mode(&self, prompt: &str, k: usize, new_len: usize) -> Refresh {
        let prompt_width = width(prompt);
        let row = |offset: usize| self.screen.frame(offset).row;

        let change = row(prompt_width + k);

        if change == row(self.display.end) && change == row(prompt_width + new_len) {
            Refresh::RedrawFrom(k)
        } else {
            Refresh::RedrawAll
        }
    }

    /// Write `mark` after the text and put the cursor on a fresh line
    pub fn finish<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        mark: &str,
    ) -> Result<(), CrosslineError> {
        self.move_to(port, self.display.end)?;
        self.put(port, mark)?;

        let end = self.display.cursor;

        if end == 0 || end % self.screen.columns != 0 {
            port.write(b"\r\n")?;
        }

        port.flush()?;
        self.reset();

        Ok(())
    }

    /// Adopt a new screen size. Everything from the start of the prompt
    /// down is erased, the caller redraws the line.
    pub fn resize<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        screen: Screen,
    ) -> Result<(), CrosslineError> {
        trace!("resize {:?} -> {screen:?}", self.screen);

        self.move_to(port, 0)?;
        port.write(b"\r\x1b[J")?;

        self.screen = screen;
        self.reset();

        Ok(())
    }
}
