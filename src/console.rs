//! Line-oriented terminal front-end.

use crate::controller::{ConversationController, StreamOutcome, TurnError};
use crate::error::AppError;
use crate::session::{ExportArtifact, SessionContext};
use crate::types::{ModelOption, Role};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

const WELCOME: &str = "I'm here to help! This conversation is secure and private.";

const HELP: &str = "Commands:
  /models               list available models
  /model <name>         switch model
  /clear                clear the conversation
  /export [path]        save the conversation as JSON
  /export-text [path]   save the conversation as a text transcript
  /import <path>        load a conversation exported as JSON
  /quit                 exit
Anything else is sent as a message.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Submit(String),
    Models,
    Model(String),
    Clear,
    Export(Option<PathBuf>),
    ExportText(Option<PathBuf>),
    Import(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

impl ConsoleCommand {
    /// Parses one input line; blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Some(ConsoleCommand::Submit(trimmed.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let path_arg = || (!arg.is_empty()).then(|| PathBuf::from(arg));

        let command = match name {
            "models" => ConsoleCommand::Models,
            "model" if arg.is_empty() => ConsoleCommand::Models,
            "model" => ConsoleCommand::Model(arg.to_string()),
            "clear" => ConsoleCommand::Clear,
            "export" => ConsoleCommand::Export(path_arg()),
            "export-text" => ConsoleCommand::ExportText(path_arg()),
            "import" => match path_arg() {
                Some(path) => ConsoleCommand::Import(path),
                None => ConsoleCommand::Unknown("/import needs a file path".to_string()),
            },
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => ConsoleCommand::Unknown(format!("Unknown command /{other}")),
        };
        Some(command)
    }
}

/// Runs the interactive loop until EOF or `/quit`.
pub async fn run(controller: &ConversationController, ctx: &mut SessionContext) -> Result<()> {
    print_intro(ctx);
    if let Some(count) = ConversationController::take_restored_notice(ctx) {
        println!("(Restored {count} messages from your previous session)\n");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(ctx)?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = ConsoleCommand::parse(&line) else {
            continue;
        };

        match command {
            ConsoleCommand::Submit(text) => submit(controller, ctx, &text).await?,
            ConsoleCommand::Models => {
                for model in ModelOption::ALL {
                    let marker = if model == ctx.selected_model { "*" } else { " " };
                    println!("{marker} {}", model.label());
                }
            }
            ConsoleCommand::Model(label) => match ModelOption::from_label(&label) {
                Some(model) => {
                    controller.change_model(ctx, model);
                    println!("Model: {model}");
                }
                None => println!("Unknown model \"{label}\". Try /models."),
            },
            ConsoleCommand::Clear => match controller.clear(ctx) {
                Ok(removed) => {
                    if !removed {
                        println!("(Could not remove the saved session file)");
                    }
                    println!("🗑️ Chat cleared.\n{WELCOME}");
                }
                Err(err) => report(err.into())?,
            },
            ConsoleCommand::Export(path) => match controller.export(ctx) {
                Some(artifact) => write_artifact(&artifact, path.as_deref()).await,
                None => println!("Nothing to export yet."),
            },
            ConsoleCommand::ExportText(path) => match controller.export_text(ctx) {
                Some(artifact) => write_artifact(&artifact, path.as_deref()).await,
                None => println!("Nothing to export yet."),
            },
            ConsoleCommand::Import(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => match controller.import(ctx, &bytes) {
                    Ok(summary) => {
                        println!("{summary}");
                        if ConversationController::take_loaded_notice(ctx) {
                            println!("📁 Conversation loaded from file - Continue where you left off!\n");
                            print_history(ctx);
                        }
                    }
                    Err(err) => report(err)?,
                },
                Err(err) => println!("❌ Error loading file: {err}"),
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
            ConsoleCommand::Unknown(message) => println!("{message}. Type /help for commands."),
        }
    }

    Ok(())
}

async fn submit(controller: &ConversationController, ctx: &mut SessionContext, text: &str) -> Result<()> {
    let turn = match controller.start_turn(ctx, text) {
        Ok(turn) => turn,
        Err(TurnError::EmptyInput) => return Ok(()),
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };

    print!("\nAssistant: ");
    std::io::stdout().flush()?;
    let mut sink = |piece: &str| {
        print!("{piece}");
        let _ = std::io::stdout().flush();
    };
    let outcome = controller.stream_turn(turn, &mut sink).await;
    if let StreamOutcome::Failed { error, .. } = &outcome {
        println!("\n❌ Error generating response: {error}");
    }
    controller.finish_turn(ctx, outcome);
    println!("\n");
    Ok(())
}

/// Prints a recoverable error and keeps the loop going; fatal ones end it.
fn report(err: AppError) -> Result<()> {
    if err.is_fatal() {
        return Err(err.into());
    }
    println!("{err}");
    Ok(())
}

async fn write_artifact(artifact: &ExportArtifact, target: Option<&Path>) {
    let path = match target {
        Some(path) if path.is_dir() => path.join(&artifact.file_name),
        Some(path) => path.to_path_buf(),
        None => default_download_dir().join(&artifact.file_name),
    };
    match write_file(&path, &artifact.contents).await {
        Ok(()) => println!("💾 Saved {}", path.display()),
        Err(err) => println!("❌ Could not save {}: {err:#}", path.display()),
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_intro(ctx: &SessionContext) {
    println!("PairD 2 ({})", ctx.selected_model);
    println!("{}", "-".repeat(40));
    if ctx.history.is_empty() {
        println!("{WELCOME}");
    } else {
        print_history(ctx);
    }
    println!("Type /help for commands.\n");
}

fn print_history(ctx: &SessionContext) {
    for message in ctx.history.messages() {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!("{speaker}: {}\n", message.content);
    }
}

fn prompt(ctx: &SessionContext) -> Result<()> {
    print!("[{}] > ", ctx.selected_model);
    std::io::stdout().flush()?;
    Ok(())
}
