use std::collections::VecDeque;

use crate::error::CrosslineError;
use crate::input::{Action, ControlCharacter, ControlSequence, Parser};
use crate::io::Terminal;
use crate::terminal::CursorFrame;

pub mod csi {
    pub const UP: &str = "\x1b[A";
    pub const DOWN: &str = "\x1b[B";
    pub const LEFT: &str = "\x1b[D";
    pub const RIGHT: &str = "\x1b[C";
    pub const HOME: &str = "\x1b[1~";
    pub const DELETE: &str = "\x1b[3~";
    pub const END: &str = "\x1b[4~";
    pub const INSERT: &str = "\x1b[2~";
    pub const PAGE_UP: &str = "\x1b[5~";
    pub const PAGE_DOWN: &str = "\x1b[6~";
    pub const F1: &str = "\x1bOP";
    pub const F2: &str = "\x1bOQ";
    pub const F3: &str = "\x1bOR";
    pub const F4: &str = "\x1bOS";
    pub const CTRL_UP: &str = "\x1b[1;5A";
    pub const CTRL_DOWN: &str = "\x1b[1;5B";
}

/// In-memory VT100 subset
///
/// Everything the editor writes is interpreted onto a screen grid, so
/// tests can assert on what the user would actually see. Input typed
/// with [`MockTerminal::type_input`] is handed out one byte at a time
/// and the terminal reports end of input once it runs dry.
pub struct MockTerminal {
    parser: Parser,
    screen: Vec<Vec<char>>,
    pub cursor: CursorFrame,
    rows: usize,
    columns: usize,
    wrap_pending: bool,
    saved_cursor: Option<CursorFrame>,
    cursor_visible: bool,
    input: VecDeque<u8>,
    pending: Vec<u8>,
    pub output: Vec<u8>,
    pub bell: bool,
    pub suspended: usize,
    pub interactive: bool,
    pub size_known: bool,
}

impl MockTerminal {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            parser: Parser::new(),
            screen: vec![vec!['\0'; columns]; rows],
            cursor: CursorFrame::new(0, 0),
            rows,
            columns,
            wrap_pending: false,
            saved_cursor: None,
            cursor_visible: true,
            input: VecDeque::new(),
            pending: Vec::new(),
            output: Vec::new(),
            bell: false,
            suspended: 0,
            interactive: true,
            size_known: true,
        }
    }

    pub fn type_input(&mut self, input: impl AsByteVec) {
        self.input.extend(input.as_byte_vec());
    }

    /// Number of input bytes not yet read
    pub fn unread(&self) -> usize {
        self.input.len() + self.pending.len()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn output_as_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    pub fn row_as_string(&self, row: usize) -> String {
        self.screen[row]
            .iter()
            .map(|&c| if c == '\0' { ' ' } else { c })
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Non-empty rows joined by newlines
    pub fn screen_as_string(&self) -> String {
        (0..self.rows)
            .map(|row| self.row_as_string(row))
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Change the size, keeping what fits of the current content
    pub fn resize(&mut self, rows: usize, columns: usize) {
        for line in self.screen.iter_mut() {
            line.resize(columns, '\0');
        }
        self.screen.resize(rows, vec!['\0'; columns]);

        self.rows = rows;
        self.columns = columns;
        self.cursor = CursorFrame::new(
            self.cursor.row.min(rows - 1),
            self.cursor.column.min(columns - 1),
        );
        self.wrap_pending = false;
    }

    fn scroll_up(&mut self) {
        self.screen.remove(0);
        self.screen.push(vec!['\0'; self.columns]);
    }

    fn line_feed(&mut self) {
        if self.cursor.row + 1 == self.rows {
            self.scroll_up();
        } else {
            self.cursor.row += 1;
        }
    }

    fn print(&mut self, c: char) {
        if self.wrap_pending {
            self.cursor.column = 0;
            self.line_feed();
            self.wrap_pending = false;
        }

        self.screen[self.cursor.row][self.cursor.column] = c;

        if self.cursor.column + 1 == self.columns {
            self.wrap_pending = true;
        } else {
            self.cursor.column += 1;
        }
    }

    fn erase(&mut self, from: CursorFrame, to_row: usize) {
        for row in from.row..=to_row.min(self.rows - 1) {
            let start = if row == from.row { from.column } else { 0 };

            for column in start..self.columns {
                self.screen[row][column] = '\0';
            }
        }
    }

    fn control_sequence(&mut self, seq: ControlSequence) {
        let steps = seq.arg1.unwrap_or(1);

        self.wrap_pending = false;

        match seq.final_byte {
            b'A' => self.cursor.row = self.cursor.row.saturating_sub(steps),
            b'B' => self.cursor.row = (self.cursor.row + steps).min(self.rows - 1),
            b'C' => self.cursor.column = (self.cursor.column + steps).min(self.columns - 1),
            b'D' => self.cursor.column = self.cursor.column.saturating_sub(steps),
            b'H' => {
                self.cursor = CursorFrame::new(
                    (seq.arg1.unwrap_or(1).max(1) - 1).min(self.rows - 1),
                    (seq.arg2.unwrap_or(1).max(1) - 1).min(self.columns - 1),
                )
            }
            b'J' => match seq.arg1 {
                Some(2) => self.erase(CursorFrame::new(0, 0), self.rows - 1),
                _ => self.erase(self.cursor, self.rows - 1),
            },
            b'K' => self.erase(self.cursor, self.cursor.row),
            b'h' if seq.arg1 == Some(25) => self.cursor_visible = true,
            b'l' if seq.arg1 == Some(25) => self.cursor_visible = false,
            b'm' => (),
            b => panic!("unsupported control sequence {:?}", b as char),
        }
    }

    fn advance(&mut self, byte: u8) {
        match self.parser.advance(byte) {
            Action::Ignore => (),
            Action::Print(c) => self.print(c),
            Action::ControlSequenceIntroducer(seq) => self.control_sequence(seq),
            Action::ControlCharacter(ctrl) => match ctrl {
                ControlCharacter::CarriageReturn => {
                    self.cursor.column = 0;
                    self.wrap_pending = false;
                }
                ControlCharacter::LineFeed => {
                    self.line_feed();
                    self.wrap_pending = false;
                }
                ControlCharacter::CtrlG => self.bell = true,
                ControlCharacter::CtrlH => {
                    self.cursor.column = self.cursor.column.saturating_sub(1);
                    self.wrap_pending = false;
                }
                _ => (),
            },
            Action::EscapeSequence(b'7') => self.saved_cursor = Some(self.cursor),
            Action::EscapeSequence(b'8') => {
                if let Some(cursor) = self.saved_cursor {
                    self.cursor = cursor;
                }
            }
            action => panic!("unexpected output {action:?}"),
        }
    }
}

impl Terminal for MockTerminal {
    fn read_byte(&mut self) -> Result<u8, CrosslineError> {
        match self.pending.pop() {
            Some(byte) => Ok(byte),
            None => self.input.pop_front().ok_or(CrosslineError::InputEof),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), CrosslineError> {
        self.output.extend_from_slice(bytes);

        for &b in bytes {
            self.advance(b);
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), CrosslineError> {
        Ok(())
    }

    fn screen_size(&mut self) -> Option<(usize, usize)> {
        self.size_known.then_some((self.rows, self.columns))
    }

    fn push_back(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    fn suspend(&mut self) -> Result<(), CrosslineError> {
        self.suspended += 1;
        Ok(())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

pub trait AsByteVec {
    fn as_byte_vec(self) -> Vec<u8>;
}

impl AsByteVec for &str {
    fn as_byte_vec(self) -> Vec<u8> {
        self.bytes().collect()
    }
}

impl AsByteVec for ControlCharacter {
    fn as_byte_vec(self) -> Vec<u8> {
        vec![self.into()]
    }
}

impl<const N: usize> AsByteVec for [ControlCharacter; N] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.into_iter().map(|c| c.into()).collect()
    }
}

impl<const N: usize> AsByteVec for [&str; N] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.iter().flat_map(|s| s.bytes()).collect()
    }
}

/// Mixed sequence of text and control characters
pub struct InputBuilder {
    items: Vec<u8>,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(mut self, input: impl AsByteVec) -> Self {
        self.items.extend(input.as_byte_vec());
        self
    }
}

impl AsByteVec for InputBuilder {
    fn as_byte_vec(self) -> Vec<u8> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_next_print() {
        let mut term = MockTerminal::new(4, 5);

        term.write_str("abcde").unwrap();
        assert_eq!(term.cursor, CursorFrame::new(0, 4));

        term.write_str("f").unwrap();
        assert_eq!(term.cursor, CursorFrame::new(1, 1));
        assert_eq!(term.screen_as_string(), "abcde\nf");
    }

    #[test]
    fn relative_moves() {
        let mut term = MockTerminal::new(4, 10);

        term.write_str("\r\n\r\nab\x1b[2A\x1b[3C\x1b[1Dx").unwrap();

        assert_eq!(term.row_as_string(0), "    x");
        assert_eq!(term.cursor, CursorFrame::new(0, 5));

        term.write_str("\x1b[J").unwrap();
        assert_eq!(term.screen_as_string(), "    x");
    }

    #[test]
    fn input() {
        let mut term = MockTerminal::new(4, 10);

        term.type_input("ab");
        term.push_back(b'z');

        assert_eq!(term.read_byte().unwrap(), b'z');
        assert_eq!(term.read_byte().unwrap(), b'a');
        assert_eq!(term.read_byte().unwrap(), b'b');
        assert!(matches!(term.read_byte(), Err(CrosslineError::InputEof)));
    }
}
