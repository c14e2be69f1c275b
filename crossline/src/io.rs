//! Terminal port
//!
//! The editor never touches the operating system directly, all input
//! and output goes through the [`Terminal`] trait. [`IO`] implements
//! it on top of any [`embedded_io::Read`] and [`embedded_io::Write`]
//! pair.

use core::fmt;

use embedded_io::Error;
use log::{debug, warn};

use crate::color::Color;
use crate::error::CrosslineError;
use crate::terminal::{ProbeResult, SizeProbe};

/// Byte level access to a terminal in raw mode
pub trait Terminal {
    /// Read one byte, blocking until it is available. Bytes passed to
    /// [`Terminal::push_back`] are returned first, last in first out.
    fn read_byte(&mut self) -> Result<u8, CrosslineError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), CrosslineError>;

    fn flush(&mut self) -> Result<(), CrosslineError>;

    /// `(rows, columns)`, or `None` if the size is unknown
    fn screen_size(&mut self) -> Option<(usize, usize)>;

    /// Return a byte to the input
    fn push_back(&mut self, byte: u8);

    fn write_str(&mut self, s: &str) -> Result<(), CrosslineError> {
        self.write(s.as_bytes())
    }

    fn show_cursor(&mut self, show: bool) -> Result<(), CrosslineError> {
        self.write(if show { b"\x1b[?25h" } else { b"\x1b[?25l" })
    }

    fn beep(&mut self) -> Result<(), CrosslineError> {
        self.write(b"\x07")
    }

    fn set_color(&mut self, color: Color) -> Result<(), CrosslineError> {
        self.write_str(&color.to_sgr())
    }

    fn clear_screen(&mut self) -> Result<(), CrosslineError> {
        self.write(b"\x1b[2J\x1b[H")
    }

    /// Stop the process until the shell resumes it
    fn suspend(&mut self) -> Result<(), CrosslineError> {
        Ok(())
    }

    /// `false` for pipes, files and dumb terminals
    fn is_interactive(&self) -> bool {
        true
    }

    /// Switch raw mode on for the duration of a read and off again
    fn raw_mode(&mut self, _enabled: bool) -> Result<(), CrosslineError> {
        Ok(())
    }
}

/// Terminal port for a separate input and output
pub struct IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    input: R,
    output: W,
    pending: Vec<u8>,
    size: Option<(usize, usize)>,
    interactive: bool,
}

impl<R, W> IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    /// Create IO wrapper from input and output
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: Vec::new(),
            size: None,
            interactive: true,
        }
    }

    /// Set a fixed screen size
    pub fn with_size(mut self, rows: usize, columns: usize) -> Self {
        self.size = Some((rows, columns));
        self
    }

    /// Mark the input as a plain stream without line editing
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Consume wrapper and return input and output as tuple
    pub fn take(self) -> (R, W) {
        (self.input, self.output)
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    fn read_raw(&mut self) -> Result<u8, CrosslineError> {
        let mut buf = [0u8; 1];

        match self.input.read(&mut buf) {
            Ok(0) => Err(CrosslineError::InputEof),
            Ok(_) => Ok(buf[0]),
            Err(e) => Err(CrosslineError::ReadError(e.kind())),
        }
    }

    /// Ask the terminal for its size with a cursor position report
    pub fn probe_size(&mut self) -> Result<(usize, usize), CrosslineError> {
        let mut probe = SizeProbe::new();

        self.write(SizeProbe::init())?;
        self.flush()?;

        loop {
            let byte = self
                .read_raw()
                .map_err(|_| CrosslineError::TerminalQueryFailure)?;

            match probe.advance(byte) {
                ProbeResult::Continue => (),
                ProbeResult::Item(screen) => {
                    debug!("probed size {}x{}", screen.rows, screen.columns);
                    let size = (screen.rows, screen.columns);
                    self.size = Some(size);
                    return Ok(size);
                }
                ProbeResult::InvalidInput => {
                    warn!("unexpected reply to size probe");
                    return Err(CrosslineError::TerminalQueryFailure);
                }
            }
        }
    }
}

impl<R, W> Terminal for IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    fn read_byte(&mut self) -> Result<u8, CrosslineError> {
        match self.pending.pop() {
            Some(byte) => Ok(byte),
            None => self.read_raw(),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), CrosslineError> {
        self.output
            .write_all(bytes)
            .map_err(|e| CrosslineError::WriteError(e.kind()))
    }

    fn flush(&mut self) -> Result<(), CrosslineError> {
        self.output
            .flush()
            .map_err(|e| CrosslineError::WriteError(e.kind()))
    }

    fn screen_size(&mut self) -> Option<(usize, usize)> {
        self.size
    }

    fn push_back(&mut self, byte: u8) {
        self.pending.push(byte);
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl<R, W> fmt::Write for IO<R, W>
where
    R: embedded_io::Read,
    W: embedded_io::Write,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Terminal::write(self, s.as_bytes()).or(Err(fmt::Error))
    }
}

pub mod std_io {
    //! [`embedded_io`] wrappers for stdin and stdout
    use std::io::{Read, Stdin, Stdout, Write};

    use super::IO;

    impl Default for IO<StdinWrapper, StdoutWrapper> {
        fn default() -> Self {
            Self::new(StdinWrapper::new(), StdoutWrapper::new())
        }
    }

    // Wrapper for std::io::stdin
    pub struct StdinWrapper(Stdin);
    impl StdinWrapper {
        pub fn new() -> Self {
            Self(std::io::stdin())
        }
        pub fn new_with(val: Stdin) -> Self {
            Self(val)
        }
    }
    impl Default for StdinWrapper {
        fn default() -> Self {
            Self::new()
        }
    }
    impl embedded_io::ErrorType for StdinWrapper {
        type Error = embedded_io::ErrorKind;
    }
    impl embedded_io::Read for StdinWrapper {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }

            let mut b = [0];

            match self.0.read(&mut b) {
                Ok(0) => Ok(0),
                Ok(_) => {
                    buf[0] = b[0];
                    Ok(1)
                }
                Err(e) => Err(e.kind().into()),
            }
        }
    }

    // Wrapper for std::io::stdout
    pub struct StdoutWrapper(Stdout);
    impl StdoutWrapper {
        pub fn new() -> Self {
            Self(std::io::stdout())
        }
        pub fn new_with(val: Stdout) -> Self {
            Self(val)
        }
    }
    impl Default for StdoutWrapper {
        fn default() -> Self {
            Self::new()
        }
    }
    impl embedded_io::ErrorType for StdoutWrapper {
        type Error = embedded_io::ErrorKind;
    }
    impl embedded_io::Write for StdoutWrapper {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.write(buf).map_err(|e| e.kind().into())
        }
        fn flush(&mut self) -> Result<(), Self::Error> {
            self.0.flush().map_err(|e| e.kind().into())
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;
    use std::thread;

    use crossbeam::channel::{unbounded, Receiver, Sender};

    use super::*;

    struct ChannelIO {
        input: Receiver<u8>,
        buffer: Vec<u8>,
        output: Sender<u8>,
    }

    impl ChannelIO {
        fn new(input: Receiver<u8>, output: Sender<u8>) -> Self {
            Self {
                input,
                buffer: Vec::new(),
                output,
            }
        }
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
                // The receiving side may already be gone
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
    fn push_back_is_lifo() {
        let (input_tx, input_rx) = unbounded();

        let mut io = IO::new(
            ChannelIO::new(input_rx, unbounded().0),
            ChannelIO::new(unbounded().1, unbounded().0),
        );

        input_tx.send(b'c').unwrap();

        io.push_back(b'b');
        io.push_back(b'a');

        assert_eq!(io.read_byte().unwrap(), b'a');
        assert_eq!(io.read_byte().unwrap(), b'b');
        assert_eq!(io.read_byte().unwrap(), b'c');

        drop(input_tx);

        assert!(matches!(io.read_byte(), Err(CrosslineError::InputEof)));
    }

    #[test]
    fn probe_size() {
        let (input_tx, input_rx) = unbounded();
        let (output_tx, output_rx) = unbounded();

        let handle = thread::spawn(move || {
            let mut io = IO::new(
                ChannelIO::new(input_rx, unbounded().0),
                ChannelIO::new(unbounded().1, output_tx),
            );

            let size = io.probe_size().ok();

            (size, io.screen_size())
        });

        for &b in SizeProbe::init() {
            assert_eq!(
                output_rx.recv_timeout(::core::time::Duration::from_millis(1000)),
                Ok(b)
            );
        }

        for b in "\x1b[30;100R".bytes() {
            input_tx.send(b).unwrap();
        }

        assert_eq!(handle.join().unwrap(), (Some((30, 100)), Some((30, 100))));
    }

    #[test]
    fn probe_size_failure() {
        let (input_tx, input_rx) = unbounded();

        let mut io = IO::new(
            ChannelIO::new(input_rx, unbounded().0),
            ChannelIO::new(unbounded().1, unbounded().0),
        );

        input_tx.send(b'x').unwrap();

        assert!(matches!(
            io.probe_size(),
            Err(CrosslineError::TerminalQueryFailure)
        ));
        assert_eq!(io.screen_size(), None);
    }
}
