//! Interactive REPL for casting boards by hand.
//!
//! Launch with `liuren repl`. Type `<seed> <time>` to cast a board, or
//! `/help` for the other commands.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};

use crate::handler::{split_input, DivinationHandler};
use crate::types::Envelope;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/url", "Show the renderer URL for <seed> <time> without fetching"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for command completion.
#[derive(Default)]
struct BoardHelper;

impl Completer for BoardHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];
        if !input.starts_with('/') || input.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| Pair {
                display: format!("{cmd:<10} {desc}"),
                replacement: format!("{cmd} "),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for BoardHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|(cmd, _)| cmd.starts_with(line) && *cmd != line)
            .map(|(cmd, _)| cmd[line.len()..].to_string())
    }
}

impl Highlighter for BoardHelper {}
impl Validator for BoardHelper {}
impl Helper for BoardHelper {}

/// Run the interactive REPL.
pub async fn run(handler: &DivinationHandler) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[1mliuren v{}\x1b[0m \x1b[90m\u{2014} Six Ren boards\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("    Enter \x1b[36m<seed> <time>\x1b[0m (e.g. 1234 05:45), \x1b[90m/exit\x1b[0m to quit.");
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<BoardHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(BoardHelper));

    let hist_path = dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".liuren_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mliuren>\x1b[0m ";

    loop {
        let read = tokio::task::block_in_place(|| rl.readline(prompt));
        match read {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let Some(input) = line.strip_prefix('/') else {
                    cmd_cast(handler, line).await;
                    continue;
                };

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                match cmd {
                    "exit" | "quit" => break,
                    "help" | "h" | "?" | "" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "url" => cmd_url(handler, args.trim()),
                    _ => eprintln!("  Unknown command '/{cmd}'. Type /help for commands."),
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);
    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  <seed> <time>      Cast a board (time: HH:MM or YYYY-MM-DD-HH:MM)");
    for (cmd, desc) in COMMANDS {
        eprintln!("  {cmd:<18} {desc}");
    }
    eprintln!();
}

fn cmd_url(handler: &DivinationHandler, args: &str) {
    match split_input(args).and_then(|(seed, time)| handler.board_url(seed, time)) {
        Ok(url) => println!("{url}"),
        Err(e) => eprintln!("  {e}"),
    }
}

async fn cmd_cast(handler: &DivinationHandler, line: &str) {
    let envelope = match handler.handle_content(line).await {
        Ok(board) => Envelope::success(&board),
        Err(e) => Envelope::from_error(&e),
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  Error: {e}"),
    }
}
