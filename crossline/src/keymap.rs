//! Key bindings
//!
//! The binding table is fixed. [`Command::from_key`] maps a decoded
//! [`KeyEvent`] to the editing command it triggers.

use crate::input::ControlCharacter;
use crate::key::{Key, KeyEvent, NamedKey};
use crate::pager::ListingRow;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(char),

    Left,
    Right,
    WordLeft,
    WordRight,
    Home,
    End,
    /// Move one screen row, never touching history
    RowUp,
    RowDown,
    ClearScreen,

    Backspace,
    Delete,
    /// Delete under the cursor, or end of input on an empty line
    DeleteOrEof,
    Upcase,
    Downcase,
    Capitalize,
    TrimSpaces,
    Transpose,

    CutToEnd,
    CutToStart,
    CutLine,
    CutToSpace,
    CutWordLeft,
    CutWordRight,
    Paste,

    Complete,
    ListCompletions,

    /// Up arrow, moves between rows or through history
    Up,
    Down,
    HistoryPrevious,
    HistoryNext,
    HistoryFirst,
    HistoryLast,
    HistorySearch,
    ListHistory,
    ClearHistory,

    Help,
    KeyboardDebug,
    Accept,
    Interrupt,
    Cancel,
    Revert,
    Suspend,
}

impl Command {
    /// Command bound to `event`, `None` for unbound keys
    pub fn from_key(event: KeyEvent) -> Option<Self> {
        use Command::*;
        use ControlCharacter::*;

        let command = match (event.key, event.escaped) {
            (Key::Printable(c), false) => Insert(c),
            (Key::Printable(c), true) => match c {
                'b' | 'B' => WordLeft,
                'f' | 'F' => WordRight,
                'u' | 'U' => Upcase,
                'l' | 'L' => Downcase,
                'c' | 'C' => Capitalize,
                '\\' => TrimSpaces,
                'd' | 'D' => CutWordRight,
                'r' | 'R' => Revert,
                '=' | '?' => ListCompletions,
                '<' => HistoryFirst,
                '>' => HistoryLast,
                _ => return None,
            },
            (Key::Control(ControlCharacter::Backspace | CtrlH), true) => CutWordLeft,
            (Key::Control(_), true) => return None,
            (Key::Control(c), false) => match c {
                CtrlA => Home,
                CtrlB => Left,
                CtrlC => Interrupt,
                CtrlD => DeleteOrEof,
                CtrlE => End,
                CtrlF => Right,
                CtrlG => Cancel,
                ControlCharacter::Backspace | CtrlH => Command::Backspace,
                Tab => Complete,
                LineFeed | CarriageReturn => Accept,
                CtrlK => CutToEnd,
                CtrlL => ClearScreen,
                CtrlN => HistoryNext,
                CtrlP => HistoryPrevious,
                CtrlR | CtrlS => HistorySearch,
                CtrlT => Transpose,
                CtrlU => CutToStart,
                CtrlV | CtrlY => Paste,
                CtrlW => CutToSpace,
                CtrlX => CutLine,
                CtrlZ => Suspend,
                RS => KeyboardDebug,
                _ => return None,
            },
            (Key::Named(key), _) => match key {
                NamedKey::Up => Up,
                NamedKey::Down => Down,
                NamedKey::Left => Left,
                NamedKey::Right => Right,
                NamedKey::Home => Home,
                NamedKey::End => End,
                NamedKey::Insert => Paste,
                NamedKey::Delete => Delete,
                NamedKey::PageUp => HistoryFirst,
                NamedKey::PageDown => HistoryLast,
                NamedKey::F1 => Help,
                NamedKey::F2 => ListHistory,
                NamedKey::F3 => ClearHistory,
                NamedKey::F4 => HistorySearch,
                NamedKey::F5 => return None,
                NamedKey::CtrlUp | NamedKey::AltUp => RowUp,
                NamedKey::CtrlDown | NamedKey::AltDown => RowDown,
                NamedKey::CtrlLeft | NamedKey::AltLeft => WordLeft,
                NamedKey::CtrlRight | NamedKey::AltRight => WordRight,
                NamedKey::CtrlHome | NamedKey::AltHome => CutToStart,
                NamedKey::CtrlEnd | NamedKey::AltEnd => CutToEnd,
                NamedKey::CtrlDelete | NamedKey::AltDelete => CutWordRight,
            },
        };

        Some(command)
    }

    /// Commands that only make sense in a top level read
    pub fn needs_history(&self) -> bool {
        use Command::*;

        matches!(
            self,
            HistoryPrevious
                | HistoryNext
                | HistoryFirst
                | HistoryLast
                | HistorySearch
                | ListHistory
                | ClearHistory
                | Complete
                | ListCompletions
        )
    }
}

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Misc",
        &[
            ("F1", "Show this help"),
            ("Ctrl-^", "Keyboard debug mode, Ctrl-C leaves it"),
            ("Ctrl-L", "Clear screen and redraw the line"),
        ],
    ),
    (
        "Move",
        &[
            ("Ctrl-B, Left", "Back one character"),
            ("Ctrl-F, Right", "Forward one character"),
            ("Alt-B, Ctrl-Left", "Back one word"),
            ("Alt-F, Ctrl-Right", "Forward one word"),
            ("Ctrl-A, Home", "Start of line"),
            ("Ctrl-E, End", "End of line"),
            ("Ctrl-Up, Alt-Up", "Up one row of a wrapped line"),
            ("Ctrl-Down, Alt-Down", "Down one row of a wrapped line"),
        ],
    ),
    (
        "Edit",
        &[
            ("Backspace, Ctrl-H", "Delete the character before the cursor"),
            ("Ctrl-D, Del", "Delete the character under the cursor"),
            ("Alt-U", "Uppercase the current or next word"),
            ("Alt-L", "Lowercase the current or next word"),
            ("Alt-C", "Capitalize the current or next word"),
            ("Alt-\\", "Delete spaces around the cursor"),
            ("Ctrl-T", "Transpose characters"),
        ],
    ),
    (
        "Cut and paste",
        &[
            ("Ctrl-K, Ctrl-End", "Cut to end of line"),
            ("Ctrl-U, Ctrl-Home", "Cut to start of line"),
            ("Ctrl-X", "Cut the whole line"),
            ("Alt-Backspace", "Cut the word before the cursor"),
            ("Alt-D, Ctrl-Del", "Cut the word after the cursor"),
            ("Ctrl-W", "Cut back to the previous space"),
            ("Ctrl-Y, Ctrl-V, Insert", "Paste the last cut"),
        ],
    ),
    (
        "Complete",
        &[
            ("Tab", "Complete the word before the cursor"),
            ("Alt-=, Alt-?", "List completions"),
        ],
    ),
    (
        "History",
        &[
            ("Ctrl-P, Up", "Previous line"),
            ("Ctrl-N, Down", "Next line"),
            ("Alt-<, PgUp", "Oldest line"),
            ("Alt->, PgDn", "Back to the line being edited"),
            ("Ctrl-R, Ctrl-S, F4", "Search history"),
            ("F2", "List history"),
            ("F3", "Clear history"),
        ],
    ),
    (
        "Control",
        &[
            ("Enter", "Accept the line"),
            ("Ctrl-C, Ctrl-G", "Abort the line"),
            ("Ctrl-D", "End of input on an empty line"),
            ("Alt-R", "Revert the line"),
            ("Ctrl-Z", "Suspend, resume with fg"),
        ],
    ),
];

const SEARCH_HELP: &[&str] = &[
    "Words are separated by spaces, matching is case sensitive:",
    "    select           lines containing 'select'",
    "    -select          lines not containing 'select'",
    "    \"select from\"    lines containing 'select from'",
    "    -\"select from\"   lines not containing 'select from'",
    "Ctrl-Y pastes the last pattern.",
];

/// Key binding table, or the pattern syntax while a search pattern is
/// being read
pub fn help(searching: bool) -> Vec<ListingRow> {
    if searching {
        return SEARCH_HELP.iter().map(|line| ListingRow::plain(*line)).collect();
    }

    let keys_width = HELP
        .iter()
        .flat_map(|(_, bindings)| bindings.iter())
        .map(|(keys, _)| keys.len())
        .max()
        .unwrap_or(0);

    let mut rows = Vec::new();

    for (group, bindings) in HELP {
        rows.push(ListingRow::plain(format!(" {group}")));

        for (keys, description) in bindings.iter() {
            rows.push(ListingRow::plain(format!(
                "   {keys:<keys_width$}  {description}"
            )));
        }
    }

    rows.push(ListingRow::plain(
        " Alt-key can also be typed as ESC followed by the key.",
    ));

    rows
}
