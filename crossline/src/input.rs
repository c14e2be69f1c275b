use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::utf8::{Utf8Decoder, Utf8DecoderStatus};

const ESC: u8 = 0x1b;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCharacter {
    NUL = 0x0,
    CtrlA = 0x1,
    CtrlB = 0x2,
    CtrlC = 0x3,
    CtrlD = 0x4,
    CtrlE = 0x5,
    CtrlF = 0x6,
    CtrlG = 0x7,
    CtrlH = 0x8,
    Tab = 0x9,
    LineFeed = 0xA,
    CtrlK = 0xB,
    CtrlL = 0xC,
    CarriageReturn = 0xD,
    CtrlN = 0xE,
    CtrlO = 0xF,
    CtrlP = 0x10,
    CtrlQ = 0x11,
    CtrlR = 0x12,
    CtrlS = 0x13,
    CtrlT = 0x14,
    CtrlU = 0x15,
    CtrlV = 0x16,
    CtrlW = 0x17,
    CtrlX = 0x18,
    CtrlY = 0x19,
    CtrlZ = 0x1A,
    Escape = 0x1B,
    FS = 0x1C,
    GS = 0x1D,
    RS = 0x1E,
    US = 0x1F,
    Backspace = 0x7F,
}

impl ControlCharacter {
    pub fn new(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }
}

/// Raw control sequence, `ESC [ arg1 ; arg2 final_byte`
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct ControlSequence {
    pub arg1: Option<usize>,
    pub arg2: Option<usize>,
    pub final_byte: u8,
}

impl ControlSequence {
    fn new(final_byte: u8, arg1: Option<usize>, arg2: Option<usize>) -> Self {
        Self {
            arg1,
            arg2,
            final_byte,
        }
    }

    /// Cursor position report, 1-based `(row, column)`
    pub fn cursor_position(&self) -> Option<(usize, usize)> {
        match (self.final_byte, self.arg1, self.arg2) {
            (b'R', Some(row), Some(column)) => Some((row, column)),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Action {
    Ignore,
    Print(char),
    InvalidUtf8,
    ControlCharacter(ControlCharacter),
    /// ESC followed by a byte that starts no longer sequence
    EscapeSequence(u8),
    ControlSequenceIntroducer(ControlSequence),
    /// `ESC O final_byte`
    SingleShift(u8),
    /// `ESC [ [ final_byte`, sent by the Linux console for F1-F5
    LinuxConsole(u8),
}

#[derive(Debug, Eq, PartialEq)]
enum State {
    Ground,
    Utf8Sequence(Utf8Decoder),
    EscapeSequence,
    SingleShift,
    LinuxConsole,
    CSIStart,
    CSIArg1(Option<usize>),
    CSIArg2(Option<usize>, Option<usize>),
}

fn push_digit(value: Option<usize>, byte: u8) -> Option<usize> {
    Some(value.unwrap_or(0).saturating_mul(10) + (byte - b'0') as usize)
}

/// Byte level state machine splitting terminal input into characters,
/// control characters and escape sequences.
pub struct Parser {
    state: State,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
        }
    }

    /// Continue as if an ESC byte was just read
    pub fn resume_escape(&mut self) {
        self.state = State::EscapeSequence;
    }

    pub fn advance(&mut self, byte: u8) -> Action {
        match self.state {
            State::Ground => match byte {
                ESC => {
                    self.state = State::EscapeSequence;
                    Action::Ignore
                }
                0x0..=0x1a | 0x1c..=0x1f | 0x7f => ControlCharacter::new(byte)
                    .map(Action::ControlCharacter)
                    .unwrap_or(Action::Ignore),
                0x20..=0x7e | 0x80..=0xff => {
                    let mut decoder = Utf8Decoder::new();

                    match decoder.advance(byte) {
                        Utf8DecoderStatus::Continuation => {
                            self.state = State::Utf8Sequence(decoder);
                            Action::Ignore
                        }
                        Utf8DecoderStatus::Done(c) => Action::Print(c),
                        Utf8DecoderStatus::Error => Action::InvalidUtf8,
                    }
                }
            },
            State::Utf8Sequence(ref mut decoder) => match decoder.advance(byte) {
                Utf8DecoderStatus::Continuation => Action::Ignore,
                Utf8DecoderStatus::Done(c) => {
                    self.state = State::Ground;
                    Action::Print(c)
                }
                Utf8DecoderStatus::Error => {
                    self.state = State::Ground;
                    Action::InvalidUtf8
                }
            },
            State::EscapeSequence => match byte {
                b'[' => {
                    self.state = State::CSIStart;
                    Action::Ignore
                }
                b'O' => {
                    self.state = State::SingleShift;
                    Action::Ignore
                }
                _ => {
                    self.state = State::Ground;
                    Action::EscapeSequence(byte)
                }
            },
            State::SingleShift => {
                self.state = State::Ground;
                Action::SingleShift(byte)
            }
            State::LinuxConsole => {
                self.state = State::Ground;
                Action::LinuxConsole(byte)
            }
            State::CSIStart => match byte {
                b'0'..=b'9' => {
                    self.state = State::CSIArg1(push_digit(None, byte));
                    Action::Ignore
                }
                b';' => {
                    self.state = State::CSIArg2(None, None);
                    Action::Ignore
                }
                b'[' => {
                    self.state = State::LinuxConsole;
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(ControlSequence::new(byte, None, None))
                }
                _ => Action::Ignore,
            },
            State::CSIArg1(value) => match byte {
                b'0'..=b'9' => {
                    self.state = State::CSIArg1(push_digit(value, byte));
                    Action::Ignore
                }
                b';' => {
                    self.state = State::CSIArg2(value, None);
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(ControlSequence::new(byte, value, None))
                }
                _ => Action::Ignore,
            },
            State::CSIArg2(arg1, arg2) => match byte {
                b'0'..=b'9' => {
                    self.state = State::CSIArg2(arg1, push_digit(arg2, byte));
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(ControlSequence::new(byte, arg1, arg2))
                }
                _ => Action::Ignore,
            },
        }
    }
}
