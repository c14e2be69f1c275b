//! Line editor
//!
//! The editor takes any [`Terminal`]. [`crate::io::IO`] adapts a pair
//! of [`embedded_io`] streams and, on Unix,
//! [`crate::std_terminal::StdTerminal`] drives the process terminal.
//!
//! Use the [`crate::builder::EditorBuilder`] to build an editor.

use log::debug;

use crate::complete::Completer;
use crate::core::{Config, Line, ReadMode, Session};
use crate::error::CrosslineError;
use crate::history::History;
use crate::io::Terminal;
use crate::terminal::{ResizeFlag, Screen};

/// How a read ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Enter
    Accepted,
    /// Ctrl-C, Ctrl-G or an unbound Alt key
    Interrupted,
    /// Ctrl-D on an empty line, or the input closed
    EndOfInput,
}

/// Result of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Buffer contents when the read ended
    pub text: String,
    pub termination: Termination,
}

impl ReadOutcome {
    pub fn new(text: impl Into<String>, termination: Termination) -> Self {
        Self {
            text: text.into(),
            termination,
        }
    }

    pub fn accepted(&self) -> bool {
        self.termination == Termination::Accepted
    }

    /// The accepted text, or [`CrosslineError::UserAbort`] and
    /// [`CrosslineError::InputEof`] for the other endings
    pub fn into_result(self) -> Result<String, CrosslineError> {
        match self.termination {
            Termination::Accepted => Ok(self.text),
            Termination::Interrupted => Err(CrosslineError::UserAbort),
            Termination::EndOfInput => Err(CrosslineError::InputEof),
        }
    }
}

/// Line editor
///
/// It is recommended to use [`crate::builder::EditorBuilder`] to build an Editor.
pub struct Editor<C: Completer = ()> {
    session: Session,
    completer: C,
}

impl<C: Completer> Editor<C> {
    pub(crate) fn new(history: History, config: Config, completer: C) -> Self {
        Self {
            session: Session::new(history, config),
            completer,
        }
    }

    /// Read a line
    pub fn readline<T: Terminal + ?Sized>(
        &mut self,
        prompt: &str,
        port: &mut T,
    ) -> Result<ReadOutcome, CrosslineError> {
        self.readline_with(prompt, "", port)
    }

    /// Read a line that starts out as `initial`, with the cursor at its
    /// end
    pub fn readline_with<T: Terminal + ?Sized>(
        &mut self,
        prompt: &str,
        initial: &str,
        port: &mut T,
    ) -> Result<ReadOutcome, CrosslineError> {
        if !port.is_interactive() {
            debug!("input is not a terminal, reading a plain line");
            return read_plain(prompt, port);
        }

        port.raw_mode(true)?;

        let screen = Screen::query(port);
        let outcome = Line::new(
            &mut self.session,
            &self.completer,
            prompt,
            ReadMode::Edit,
            screen,
        )
        .read(port, initial);

        port.raw_mode(false)?;

        outcome
    }

    pub fn history(&self) -> &History {
        &self.session.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.session.history
    }

    /// Flag to set when the terminal size changes. The next key read
    /// redraws the line for the new size.
    pub fn resize_flag(&self) -> ResizeFlag {
        self.session.resize.clone()
    }

    /// Text of the last cut
    pub fn clipboard(&self) -> &str {
        &self.session.clip
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }
}

/// Read one line without any editing
fn read_plain<T: Terminal + ?Sized>(
    prompt: &str,
    port: &mut T,
) -> Result<ReadOutcome, CrosslineError> {
    port.write_str(prompt)?;
    port.flush()?;

    let mut bytes = Vec::new();

    loop {
        match port.read_byte() {
            Ok(b'\n') => break,
            Ok(byte) => bytes.push(byte),
            Err(CrosslineError::InputEof) if bytes.is_empty() => {
                return Ok(ReadOutcome::new("", Termination::EndOfInput))
            }
            Err(CrosslineError::InputEof) => break,
            Err(err) => return Err(err),
        }
    }

    let text = String::from_utf8_lossy(&bytes);

    Ok(ReadOutcome::new(
        text.trim_end_matches('\r'),
        Termination::Accepted,
    ))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use core::convert::Infallible;
    use crossbeam::channel::{unbounded, Receiver, Sender};

    use super::*;
    use crate::builder::EditorBuilder;
    use crate::complete::{Candidate, CompletionSet, FnCompleter};
    use crate::input::ControlCharacter::*;
    use crate::io::IO;
    use crate::testlib::{csi, InputBuilder, MockTerminal};

    const PROMPT: &str = "Crossline> ";

    fn editor(entries: &[&str]) -> Editor {
        let mut history = History::new();

        for entry in entries {
            history.append(entry);
        }

        EditorBuilder::new().with_history(history).build()
    }

    #[test]
    fn accepted_line_goes_to_history() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&[]);

        term.type_input("select\r");

        let outcome = editor.readline(PROMPT, &mut term).unwrap();

        assert!(outcome.accepted());
        assert_eq!(outcome.text, "select");
        assert_eq!(editor.history().count(), 1);
        assert_eq!(term.screen_as_string(), "Crossline> select");
    }

    #[test]
    fn history_walk() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&["select a", "select b"]);

        term.type_input([csi::UP, "\r"]);
        assert_eq!(editor.readline(PROMPT, &mut term).unwrap().text, "select b");

        term.type_input([csi::UP, csi::UP, "\r"]);
        assert_eq!(editor.readline(PROMPT, &mut term).unwrap().text, "select a");

        term.type_input([csi::UP, csi::UP, csi::DOWN, csi::DOWN, "\r"]);
        let outcome = editor.readline(PROMPT, &mut term).unwrap();

        assert!(outcome.accepted());
        assert_eq!(outcome.text, "");
        assert_eq!(editor.history().count(), 3);
    }

    #[test]
    fn interrupt_leaves_history_alone() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&["select a"]);

        term.type_input(InputBuilder::new().add("drop table").add(CtrlC));

        let outcome = editor.readline(PROMPT, &mut term).unwrap();

        assert!(!outcome.accepted());
        assert_eq!(outcome.termination, Termination::Interrupted);
        assert_eq!(editor.history().entries().collect::<Vec<_>>(), ["select a"]);
        assert!(matches!(
            outcome.into_result(),
            Err(CrosslineError::UserAbort)
        ));
    }

    #[test]
    fn end_of_input() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&[]);

        term.type_input(CtrlD);
        assert_eq!(
            editor.readline(PROMPT, &mut term).unwrap().termination,
            Termination::EndOfInput
        );

        let outcome = editor.readline(PROMPT, &mut term).unwrap();
        assert_eq!(outcome.termination, Termination::EndOfInput);
        assert!(matches!(outcome.into_result(), Err(CrosslineError::InputEof)));
    }

    #[test]
    fn completion_choice() {
        let completer = FnCompleter(|line: &str, cursor: usize| {
            let mut set = CompletionSet::new(0, cursor);

            for keyword in ["SELECT", "SET"] {
                if keyword.starts_with(&line[..cursor].to_uppercase()) {
                    set.add(Candidate::new(keyword));
                }
            }

            set
        });

        let mut term = MockTerminal::new(10, 40);
        let mut editor = EditorBuilder::new().with_completer(completer).build();

        term.type_input("se\t2\r");

        let outcome = editor.readline(PROMPT, &mut term).unwrap();

        assert_eq!(outcome.text, "SET");
        assert_eq!(editor.history().entries().collect::<Vec<_>>(), ["SET"]);
    }

    #[test]
    fn prefilled() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&[]);

        term.type_input("d\r");

        let outcome = editor.readline_with(PROMPT, "abc", &mut term).unwrap();

        assert_eq!(outcome.text, "abcd");
        assert_eq!(term.screen_as_string(), "Crossline> abcd");
    }

    #[test]
    fn clipboard_outlives_a_read() {
        let mut term = MockTerminal::new(10, 40);
        let mut editor = editor(&[]);

        term.type_input(InputBuilder::new().add("hello world").add([CtrlW, CtrlC]));
        editor.readline(PROMPT, &mut term).unwrap();
        assert_eq!(editor.clipboard(), "world");

        term.type_input(InputBuilder::new().add(CtrlY).add("\r"));
        assert_eq!(editor.readline(PROMPT, &mut term).unwrap().text, "world");
    }

    #[test]
    fn nested_reads_stay_out_of_history() {
        let mut term = MockTerminal::new(20, 40);
        let mut editor = editor(&["select a", "select b"]);

        term.type_input(["sel", csi::UP, "2", "\r"]);

        assert_eq!(editor.readline(PROMPT, &mut term).unwrap().text, "select a");
        assert_eq!(
            editor.history().entries().collect::<Vec<_>>(),
            ["select a", "select b", "select a"]
        );
    }

    #[test]
    fn not_a_terminal() {
        let mut term = MockTerminal::new(10, 40);
        term.interactive = false;

        let mut editor = editor(&[]);

        term.type_input("select a\r\nno newline");

        let outcome = editor.readline(PROMPT, &mut term).unwrap();
        assert!(outcome.accepted());
        assert_eq!(outcome.text, "select a");

        assert_eq!(editor.readline(PROMPT, &mut term).unwrap().text, "no newline");
        assert_eq!(
            editor.readline(PROMPT, &mut term).unwrap().termination,
            Termination::EndOfInput
        );
        assert!(editor.history().is_empty());
    }

    struct ChannelIO {
        input: Receiver<u8>,
        buffer: Vec<u8>,
        output: Sender<u8>,
    }

    impl embedded_io::ErrorType for ChannelIO {
        type Error = Infallible;
    }

    impl embedded_io::Write for ChannelIO {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.buffer.extend(buf.iter());

            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            for b in self.buffer.drain(0..) {
                let _ = self.output.send(b);
            }

            Ok(())
        }
    }

    impl embedded_io::Read for ChannelIO {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.input.recv() {
                Ok(byte) => {
                    buf[0] = byte;
                    Ok(1)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[test]
    fn threaded_io() {
        let (input_tx, input_rx) = unbounded();
        let (output_tx, output_rx) = unbounded();

        let handle = thread::spawn(move || {
            let mut io = IO::new(
                ChannelIO {
                    input: input_rx,
                    buffer: Vec::new(),
                    output: unbounded().0,
                },
                ChannelIO {
                    input: unbounded().1,
                    buffer: Vec::new(),
                    output: output_tx,
                },
            )
            .with_size(24, 80);

            let mut editor = EditorBuilder::new().build();

            editor.readline("> ", &mut io).map(|outcome| outcome.text).ok()
        });

        for b in "abc\r".bytes() {
            input_tx.send(b).unwrap();
        }

        assert_eq!(handle.join().unwrap(), Some("abc".to_string()));

        let output: Vec<u8> = output_rx.try_iter().collect();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("> "));
        assert!(output.ends_with("\r\n"));
    }
}
