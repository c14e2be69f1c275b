//! Terminal geometry
//!
//! All positions on screen are derived from a character offset into
//! `prompt + text` and the current number of columns. Nothing here is
//! cached between refreshes, a resize changes every derived position.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::input::{Action, Parser};
use crate::io::Terminal;

pub const DEFAULT_ROWS: usize = 24;
pub const DEFAULT_COLUMNS: usize = 160;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CursorFrame {
    pub row: usize,
    pub column: usize,
}

impl CursorFrame {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Screen {
    pub rows: usize,
    pub columns: usize,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

impl Screen {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: rows.max(1),
            columns: columns.max(1),
        }
    }

    /// Ask the terminal for its size, falling back to 24x160
    pub fn query<T: Terminal + ?Sized>(port: &mut T) -> Self {
        match port.screen_size() {
            Some((rows, columns)) if rows > 0 && columns > 0 => Self::new(rows, columns),
            _ => {
                warn!("terminal size unavailable, assuming {DEFAULT_ROWS}x{DEFAULT_COLUMNS}");
                Self::default()
            }
        }
    }

    pub fn frame(&self, offset: usize) -> CursorFrame {
        CursorFrame::new(offset / self.columns, offset % self.columns)
    }

    /// Number of rows occupied by `len` characters printed from column 0
    pub fn rows_spanned(&self, len: usize) -> usize {
        if len == 0 {
            1
        } else {
            (len - 1) / self.columns + 1
        }
    }
}

pub enum ProbeResult<T> {
    Continue,
    Item(T),
    InvalidInput,
}

/// Terminal size probe for plain byte streams. Print
/// [`SizeProbe::init()`] to output and feed the reply into
/// [`SizeProbe::advance()`] until it returns an item.
pub struct SizeProbe {
    parser: Parser,
}

impl Default for SizeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeProbe {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn init() -> &'static [u8] {
        // There is no request for the window size, so save the cursor,
        // move it far beyond the bottom right corner, ask where it ended
        // up and restore it again.
        "\x1b7\x1b[999;999H\x1b[6n\x1b8".as_bytes()
    }

    pub fn advance(&mut self, byte: u8) -> ProbeResult<Screen> {
        match self.parser.advance(byte) {
            Action::Ignore => ProbeResult::Continue,
            Action::ControlSequenceIntroducer(seq) => match seq.cursor_position() {
                Some((rows, columns)) => ProbeResult::Item(Screen::new(rows, columns)),
                None => ProbeResult::InvalidInput,
            },
            _ => ProbeResult::InvalidInput,
        }
    }
}

/// Set when the terminal changes size
///
/// Clones share the flag. The platform side only ever calls
/// [`ResizeFlag::notify`] (or stores `true` through
/// [`ResizeFlag::handle`]), the read loop takes it once per key.
#[derive(Debug, Clone, Default)]
pub struct ResizeFlag(Arc<AtomicBool>);

impl ResizeFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Read and clear the flag
    pub fn take(&self) -> bool {
        let resized = self.0.swap(false, Ordering::Relaxed);

        if resized {
            debug!("resize pending");
        }

        resized
    }

    /// The shared flag, for registering with a signal handler
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}
