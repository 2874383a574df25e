//! Interactive terminal task board.
//!
//! A small line-oriented loop over [`TaskBoard`]: one command per line,
//! with the full board re-rendered after anything changes.

use anyhow::{Context, Result};
use taskmaster_client::{ApiClient, TaskBoard};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// `add <title> [:: <description>]`
    Add {
        title: String,
        description: Option<String>,
    },
    /// `done <id>`
    Done(i64),
    Refresh,
    Help,
    Quit,
    /// Anything unparsable, with the message to print.
    Invalid(String),
}

/// Parse one input line. Blank lines yield `None`.
fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "add" => {
            let (title, description) = match rest.split_once("::") {
                Some((title, description)) => (title.trim(), Some(description.trim())),
                None => (rest, None),
            };
            Command::Add {
                // An empty title is passed through so the form can
                // reject it with its own message.
                title: title.to_string(),
                description: description
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            }
        }
        "done" => match rest.parse::<i64>() {
            Ok(id) => Command::Done(id),
            Err(_) => Command::Invalid("Invalid task ID".to_string()),
        },
        "refresh" | "r" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("Unknown command: {other} (try `help`)")),
    };
    Some(command)
}

fn print_help() {
    println!("Commands:");
    println!("  add <title> [:: <description>]   create a task");
    println!("  done <id>                        mark a task complete");
    println!("  refresh                          re-fetch both lists");
    println!("  help                             show this message");
    println!("  quit                             exit");
}

fn print_prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Run the board loop until `quit` or end of input.
pub async fn run(api_url: &str) -> Result<()> {
    let api = ApiClient::new(api_url);
    let mut board = TaskBoard::new();

    board.refresh(&api).await;
    println!("{}", board.render());
    println!();
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Add { title, description } => {
                board.form.set_title(title);
                board.form.set_description(description.unwrap_or_default());
                let _ = board.submit_form(&api).await;
            }
            Command::Done(id) => {
                let _ = board.complete_task(&api, id).await;
            }
            Command::Refresh => board.refresh(&api).await,
            Command::Help => {
                print_help();
                continue;
            }
            Command::Quit => break,
            Command::Invalid(message) => {
                println!("{message}");
                continue;
            }
        }
        println!("{}", board.render());
    }
    Ok(())
}
