//! Crossline is a small readline-style line editor for raw terminals.
//! All terminal access goes through the [`io::Terminal`] trait, so the
//! editor runs just as well on the process terminal as on a serial
//! port, a socket or a test double.
//!
//! Features:
//! - Emacs keybindings with Alt-keys typed as ESC followed by the key
//! - UTF-8 and lines wrapping over several screen rows
//! - Line history with word search, numbered picks and a history file
//! - Tab completion with help text, hints and colors
//! - Paged listings for help, history and completions
//! - Falls back to plain line reads when the input is not a terminal
//!
//! The editor is built with [`builder::EditorBuilder`] and each
//! [`editor::Editor::readline`] returns a [`editor::ReadOutcome`] telling
//! how the read ended.
//!
//! # Example
//! ```no_run
//! use crossline::builder::EditorBuilder;
//! use crossline::editor::Termination;
//! use crossline::io::Terminal;
//! use crossline::std_terminal::StdTerminal;
//!
//! fn main() -> Result<(), crossline::error::CrosslineError> {
//!     let mut term = StdTerminal::new()?;
//!     let mut editor = EditorBuilder::new().build();
//!
//!     term.watch_resize(&editor.resize_flag())?;
//!
//!     loop {
//!         let outcome = editor.readline("> ", &mut term)?;
//!
//!         match outcome.termination {
//!             Termination::Accepted => term.write_str(&format!("Read: '{}'\r\n", outcome.text))?,
//!             Termination::Interrupted => continue,
//!             Termination::EndOfInput => break,
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod color;
pub mod complete;
mod core;
pub mod editor;
pub mod error;
pub mod history;
mod input;
pub mod io;
pub mod key;
pub mod keymap;
pub mod line_buffer;
mod output;
pub mod pager;
#[cfg(all(unix, feature = "std"))]
pub mod std_terminal;
pub mod terminal;
mod utf8;

pub use input::ControlCharacter;

#[cfg(test)]
pub(crate) mod testlib;
