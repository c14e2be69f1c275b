//! Printing of listings that may not fit on the screen
//!
//! Help, history and completion listings are built as [`ListingRow`]s
//! first and printed through a [`Pager`], which stops after each
//! screenful until the user asks for more.

use log::trace;

use crate::color::Color;
use crate::error::CrosslineError;
use crate::input::ControlCharacter;
use crate::io::Terminal;
use crate::key::{Key, KeyDecoder};
use crate::terminal::Screen;

const PAGING_HINT: &str = "*** Press <Space> or <Enter> to continue . . .";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub color: Color,
}

/// One output line made of colored segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    segments: Vec<Segment>,
}

impl ListingRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut row = Self::new();
        row.push(text, Color::DEFAULT);
        row
    }

    pub fn push(&mut self, text: impl Into<String>, color: Color) {
        self.segments.push(Segment {
            text: text.into(),
            color,
        });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Row text without colors
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }
}

pub(crate) struct Pager {
    enabled: bool,
    screen: Screen,
    printed: usize,
}

impl Pager {
    pub(crate) fn new<T: Terminal + ?Sized>(port: &mut T, enabled: bool) -> Self {
        Self {
            enabled: enabled && port.is_interactive(),
            screen: Screen::query(port),
            printed: 0,
        }
    }

    fn write_row<T: Terminal + ?Sized>(port: &mut T, row: &ListingRow) -> Result<(), CrosslineError> {
        for segment in row.segments() {
            if segment.color.is_default() {
                port.write_str(&segment.text)?;
            } else {
                port.set_color(segment.color)?;
                port.write_str(&segment.text)?;
                port.set_color(Color::DEFAULT)?;
            }
        }

        port.write(b"\r\n")
    }

    /// Wait for the user after a full screen. Returns `false` if the
    /// listing should stop.
    fn pause<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        decoder: &mut KeyDecoder,
        escape_combo: bool,
    ) -> Result<bool, CrosslineError> {
        port.write_str(PAGING_HINT)?;
        port.flush()?;

        let key = match decoder.next_key(port, escape_combo) {
            Ok(event) => Some(event.key),
            Err(CrosslineError::InputEof) => None,
            Err(err) => return Err(err),
        };

        port.write(b"\r\x1b[K")?;
        self.printed = 0;

        trace!("paging answered with {key:?}");

        Ok(matches!(
            key,
            Some(Key::Printable(' '))
                | Some(Key::Control(ControlCharacter::CarriageReturn))
                | Some(Key::Control(ControlCharacter::LineFeed))
        ))
    }

    /// Print rows, pausing whenever the screen is full. Returns the
    /// number of rows printed.
    pub(crate) fn print<'a, T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        decoder: &mut KeyDecoder,
        escape_combo: bool,
        rows: impl IntoIterator<Item = &'a ListingRow>,
    ) -> Result<usize, CrosslineError> {
        let mut count = 0;
        let mut rows = rows.into_iter().peekable();

        while let Some(row) = rows.next() {
            Self::write_row(port, row)?;
            count += 1;

            if !self.enabled {
                continue;
            }

            self.printed += self.screen.rows_spanned(row.width());

            if self.printed >= self.screen.rows.saturating_sub(1)
                && rows.peek().is_some()
                && !self.pause(port, decoder, escape_combo)?
            {
                break;
            }
        }

        port.flush()?;

        Ok(count)
    }
}
