//! Terminal port for the process terminal
//!
//! [`StdTerminal`] reads stdin and writes stdout, switching the terminal
//! to raw mode only while a line is being read. If stdin is not a
//! terminal, or `TERM` names one without cursor control, the editor
//! falls back to reading plain lines.

use std::env;
use std::io::{self, Stdout, Write};

use embedded_io::ErrorType;
use log::{debug, warn};
use signal_hook::consts::{SIGTSTP, SIGWINCH};
use signal_hook::SigId;
use termion::raw::{IntoRawMode, RawTerminal};

use crate::error::CrosslineError;
use crate::io::std_io::StdinWrapper;
use crate::io::{Terminal, IO};
use crate::terminal::ResizeFlag;

const UNSUPPORTED_TERMS: [&str; 3] = ["dumb", "cons25", "emacs"];

fn supported_term(term: Option<&str>) -> bool {
    match term {
        Some(term) => !UNSUPPORTED_TERMS.contains(&term),
        None => true,
    }
}

pub enum StdOutput {
    Raw(RawTerminal<Stdout>),
    Plain(Stdout),
}

impl ErrorType for StdOutput {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Write for StdOutput {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        match self {
            StdOutput::Raw(out) => out.write(buf),
            StdOutput::Plain(out) => out.write(buf),
        }
        .map_err(|e| e.kind().into())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        match self {
            StdOutput::Raw(out) => out.flush(),
            StdOutput::Plain(out) => out.flush(),
        }
        .map_err(|e| e.kind().into())
    }
}

/// stdin and stdout as a [`Terminal`]
///
/// # Example
/// ```no_run
/// use crossline::builder::EditorBuilder;
/// use crossline::std_terminal::StdTerminal;
///
/// let mut term = StdTerminal::new().unwrap();
/// let mut editor = EditorBuilder::new().build();
///
/// term.watch_resize(&editor.resize_flag()).unwrap();
///
/// let outcome = editor.readline("> ", &mut term).unwrap();
/// ```
pub struct StdTerminal {
    io: IO<StdinWrapper, StdOutput>,
    interactive: bool,
    resize: Option<SigId>,
}

impl StdTerminal {
    pub fn new() -> Result<Self, CrosslineError> {
        let stdin = io::stdin();
        let interactive =
            termion::is_tty(&stdin) && supported_term(env::var("TERM").ok().as_deref());

        let output = if interactive {
            let raw = io::stdout().into_raw_mode().map_err(CrosslineError::Platform)?;
            raw.suspend_raw_mode().map_err(CrosslineError::Platform)?;
            StdOutput::Raw(raw)
        } else {
            debug!("stdin is not a usable terminal");
            StdOutput::Plain(io::stdout())
        };

        Ok(Self {
            io: IO::new(StdinWrapper::new_with(stdin), output),
            interactive,
            resize: None,
        })
    }

    /// Set `flag` whenever the terminal window changes size
    pub fn watch_resize(&mut self, flag: &ResizeFlag) -> Result<(), CrosslineError> {
        self.unwatch_resize();

        let id =
            signal_hook::flag::register(SIGWINCH, flag.handle()).map_err(CrosslineError::Platform)?;
        self.resize = Some(id);

        Ok(())
    }

    fn unwatch_resize(&mut self) {
        if let Some(id) = self.resize.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

impl Drop for StdTerminal {
    fn drop(&mut self) {
        self.unwatch_resize();
    }
}

impl Terminal for StdTerminal {
    fn read_byte(&mut self) -> Result<u8, CrosslineError> {
        self.io.read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), CrosslineError> {
        self.io.write(bytes)
    }

    fn flush(&mut self) -> Result<(), CrosslineError> {
        self.io.flush()
    }

    fn screen_size(&mut self) -> Option<(usize, usize)> {
        match termion::terminal_size() {
            Ok((columns, rows)) => Some((rows as usize, columns as usize)),
            Err(err) => {
                warn!("terminal size query failed: {err}");
                None
            }
        }
    }

    fn push_back(&mut self, byte: u8) {
        self.io.push_back(byte);
    }

    fn suspend(&mut self) -> Result<(), CrosslineError> {
        self.raw_mode(false)?;
        signal_hook::low_level::raise(SIGTSTP).map_err(CrosslineError::Platform)?;
        self.raw_mode(true)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn raw_mode(&mut self, enabled: bool) -> Result<(), CrosslineError> {
        match self.io.output_mut() {
            StdOutput::Raw(raw) if enabled => raw.activate_raw_mode(),
            StdOutput::Raw(raw) => raw.suspend_raw_mode(),
            StdOutput::Plain(_) => Ok(()),
        }
        .map_err(CrosslineError::Platform)
    }
}
