//! Key decoding
//!
//! Turns the raw byte stream of a [`Terminal`] into [`KeyEvent`]s.
//! Terminals disagree on how to encode most non-printable keys, so
//! every known encoding is collapsed onto one [`NamedKey`].

use log::{debug, trace};

use crate::error::CrosslineError;
use crate::input::{Action, ControlCharacter, ControlSequence, Parser};
use crate::io::Terminal;

const ESC: u8 = 0x1b;

/// Keys that are not characters
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    CtrlUp,
    CtrlDown,
    CtrlLeft,
    CtrlRight,
    CtrlHome,
    CtrlEnd,
    CtrlDelete,
    AltUp,
    AltDown,
    AltLeft,
    AltRight,
    AltHome,
    AltEnd,
    AltDelete,
}

impl NamedKey {
    /// Ctrl variant of a key, if it has one
    pub fn with_ctrl(self) -> Option<Self> {
        use NamedKey::*;

        Some(match self {
            Up => CtrlUp,
            Down => CtrlDown,
            Left => CtrlLeft,
            Right => CtrlRight,
            Home => CtrlHome,
            End => CtrlEnd,
            Delete => CtrlDelete,
            _ => return None,
        })
    }

    /// Alt variant of a key, if it has one
    pub fn with_alt(self) -> Option<Self> {
        use NamedKey::*;

        Some(match self {
            Up => AltUp,
            Down => AltDown,
            Left => AltLeft,
            Right => AltRight,
            Home => AltHome,
            End => AltEnd,
            Delete => AltDelete,
            _ => return None,
        })
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum Key {
    Printable(char),
    Control(ControlCharacter),
    Named(NamedKey),
}

/// One decoded key press
///
/// `escaped` is set for everything that arrived behind an ESC byte.
/// A printable or control key with `escaped` set is an Alt
/// combination, `Control(Escape)` with `escaped` set is a lone ESC.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub escaped: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            escaped: false,
        }
    }

    pub fn escaped(key: Key) -> Self {
        Self { key, escaped: true }
    }

    /// A lone ESC press
    pub fn escape() -> Self {
        Self::escaped(Key::Control(ControlCharacter::Escape))
    }

    pub fn is_escape(&self) -> bool {
        self.escaped
    }

    /// Alt-variant for keys read in the ESC+Key form
    fn promote(self) -> Self {
        let key = match self.key {
            Key::Named(named) => Key::Named(named.with_alt().unwrap_or(named)),
            key => key,
        };

        Self::escaped(key)
    }
}

fn canonical_control(c: ControlCharacter) -> ControlCharacter {
    match c {
        ControlCharacter::CtrlH => ControlCharacter::Backspace,
        c => c,
    }
}

fn control_sequence_key(seq: ControlSequence) -> Result<NamedKey, CrosslineError> {
    use NamedKey::*;

    let base = match (seq.final_byte, seq.arg1) {
        (b'A', _) => Up,
        (b'B', _) => Down,
        (b'C', _) => Right,
        (b'D', _) => Left,
        (b'H', _) => Home,
        (b'F', _) => End,
        (b'~', Some(1 | 7)) => Home,
        (b'~', Some(2)) => Insert,
        (b'~', Some(3)) => Delete,
        (b'~', Some(4 | 8)) => End,
        (b'~', Some(5)) => PageUp,
        (b'~', Some(6)) => PageDown,
        (b'~', Some(11)) => F1,
        (b'~', Some(12)) => F2,
        (b'~', Some(13)) => F3,
        (b'~', Some(14)) => F4,
        (b'~', Some(15)) => F5,
        _ => return Err(CrosslineError::DecodeAmbiguous),
    };

    let key = match seq.arg2 {
        None | Some(1) => Some(base),
        Some(5) => base.with_ctrl(),
        Some(3) => base.with_alt(),
        Some(_) => None,
    };

    key.ok_or(CrosslineError::DecodeAmbiguous)
}

fn single_shift_key(byte: u8) -> Result<NamedKey, CrosslineError> {
    use NamedKey::*;

    Ok(match byte {
        b'A' => CtrlUp,
        b'B' => CtrlDown,
        b'C' => CtrlRight,
        b'D' => CtrlLeft,
        b'H' => Home,
        b'F' => End,
        b'P' => F1,
        b'Q' => F2,
        b'R' => F3,
        b'S' => F4,
        _ => return Err(CrosslineError::DecodeAmbiguous),
    })
}

fn linux_console_key(byte: u8) -> Result<NamedKey, CrosslineError> {
    use NamedKey::*;

    Ok(match byte {
        b'A' => F1,
        b'B' => F2,
        b'C' => F3,
        b'D' => F4,
        b'E' => F5,
        _ => return Err(CrosslineError::DecodeAmbiguous),
    })
}

fn named(key: Result<NamedKey, CrosslineError>) -> KeyEvent {
    match key {
        Ok(key) => KeyEvent::escaped(Key::Named(key)),
        Err(err) => {
            debug!("{err}, falling back to ESC");
            KeyEvent::escape()
        }
    }
}

/// Reads key events from a [`Terminal`]
pub struct KeyDecoder {
    parser: Parser,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    fn alt_key<T: Terminal + ?Sized>(&mut self, port: &mut T, byte: u8) -> KeyEvent {
        match byte {
            0x20..=0x7e => KeyEvent::escaped(Key::Printable(byte as char)),
            _ => match ControlCharacter::new(byte) {
                Some(c) => KeyEvent::escaped(Key::Control(canonical_control(c))),
                None => {
                    // Start of a multibyte character, keep it for the next read
                    port.push_back(byte);
                    KeyEvent::escape()
                }
            },
        }
    }

    /// Read one key, blocking until a complete key has arrived
    ///
    /// With `escape_combo` set, ESC ESC followed by a key yields the
    /// Alt-variant of that key.
    pub fn next_key<T: Terminal + ?Sized>(
        &mut self,
        port: &mut T,
        escape_combo: bool,
    ) -> Result<KeyEvent, CrosslineError> {
        let mut promote = false;

        loop {
            let byte = port.read_byte()?;

            let event = match self.parser.advance(byte) {
                Action::Ignore => continue,
                Action::InvalidUtf8 => {
                    debug!("dropping invalid UTF-8 input");
                    continue;
                }
                Action::Print(c) => KeyEvent::plain(Key::Printable(c)),
                Action::ControlCharacter(c) => KeyEvent::plain(Key::Control(canonical_control(c))),
                Action::EscapeSequence(ESC) if escape_combo && !promote => {
                    promote = true;
                    self.parser.resume_escape();
                    continue;
                }
                Action::EscapeSequence(ESC) => {
                    // The second ESC starts the next key
                    self.parser.resume_escape();
                    trace!("lone ESC");
                    return Ok(KeyEvent::escape());
                }
                Action::EscapeSequence(byte) => self.alt_key(port, byte),
                Action::ControlSequenceIntroducer(seq) => named(control_sequence_key(seq)),
                Action::SingleShift(byte) => named(single_shift_key(byte)),
                Action::LinuxConsole(byte) => named(linux_console_key(byte)),
            };

            let event = if promote { event.promote() } else { event };

            trace!("key {event:?}");

            return Ok(event);
        }
    }
}
