use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{Config, WriteLogger};

use crossline::builder::EditorBuilder;
use crossline::color::{BaseColor, Color};
use crossline::complete::{Candidate, Completer, CompletionSet};
use crossline::editor::Termination;
use crossline::error::CrosslineError;
use crossline::io::Terminal;
use crossline::std_terminal::StdTerminal;

const KEYWORDS: [(&str, &str); 10] = [
    ("CREATE", "Create a table or index"),
    ("DELETE", "Delete rows"),
    ("DROP", "Remove a table or index"),
    ("EXIT", "Leave the shell"),
    ("HELP", "Show keyboard help"),
    ("INSERT", "Insert rows"),
    ("SELECT", "Query rows"),
    ("SET", "Change a setting"),
    ("SHOW", "List tables"),
    ("UPDATE", "Change rows"),
];

const TABLE_WORDS: [&str; 4] = ["FROM", "INTO", "TABLE", "UPDATE"];

/// Small SQL shell showing off completion, history and colors
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// History file, read at start and written at exit
    #[arg(long, default_value = "history.txt")]
    history: PathBuf,

    /// Plain prompt and completion listings
    #[arg(long)]
    no_color: bool,

    /// Debug log file
    #[arg(long, default_value = "crossline-sql.log")]
    log: PathBuf,
}

struct SqlCompleter {
    color: bool,
}

impl SqlCompleter {
    fn paint(&self, color: Color) -> Color {
        if self.color {
            color
        } else {
            Color::DEFAULT
        }
    }
}

impl Completer for SqlCompleter {
    fn complete(&self, line: &str, cursor: usize) -> CompletionSet {
        let start = line[..cursor].rfind(' ').map(|pos| pos + 1).unwrap_or(0);
        let word = line[start..cursor].to_uppercase();
        let previous = line[..start].split_whitespace().last().map(str::to_uppercase);

        let mut set = CompletionSet::new(start, cursor);

        if previous.as_deref().is_some_and(|p| TABLE_WORDS.contains(&p)) {
            return set.with_hint("table name", self.paint(Color::fg(BaseColor::Cyan)));
        }

        for (keyword, help) in KEYWORDS.iter().filter(|(k, _)| k.starts_with(&word)) {
            set.add(Candidate::new(*keyword).with_help(*help).colors(
                self.paint(Color::fg(BaseColor::Green).bright()),
                self.paint(Color::fg(BaseColor::Blue)),
            ));
        }

        set
    }
}

fn run(args: &Args) -> Result<(), CrosslineError> {
    let prompt_color = if args.no_color {
        Color::DEFAULT
    } else {
        Color::fg(BaseColor::Yellow).bright()
    };

    let mut editor = EditorBuilder::new()
        .with_prompt_color(prompt_color)
        .with_history_file(&args.history)?
        .with_completer(SqlCompleter {
            color: !args.no_color,
        })
        .build();

    let mut term = StdTerminal::new()?;
    term.watch_resize(&editor.resize_flag())?;

    loop {
        let outcome = editor.readline("SQL> ", &mut term)?;

        match outcome.termination {
            Termination::Accepted => {
                let statement = outcome.text.trim();

                if statement.eq_ignore_ascii_case("exit") {
                    break;
                }

                info!("statement: {statement}");
                term.write_str(&format!("Read: '{statement}'\r\n"))?;
                term.flush()?;
            }
            Termination::Interrupted => continue,
            Termination::EndOfInput => break,
        }
    }

    editor.history().save(&args.history)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Ok(file) = File::create(&args.log) {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("crossline-sql: {err}");
            ExitCode::FAILURE
        }
    }
}
