//! Shell session management

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use super::command::{ShellCommand, parse_command};
use super::render::{notice_line, print_help, print_snapshot};
use crate::app::AppSnapshot;
use crate::runtime::{AppHandle, RuntimeEvent};

/// Interactive shell session
pub struct ShellSession {
    handle: AppHandle,
    events: broadcast::Receiver<RuntimeEvent>,
    base_url: String,
    last_notice: u64,
}

impl ShellSession {
    pub fn new(handle: AppHandle, base_url: impl Into<String>) -> Self {
        let events = handle.subscribe_events();
        Self {
            handle,
            events,
            base_url: base_url.into(),
            last_notice: 0,
        }
    }

    /// Run the shell main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if !input.starts_with('/') {
                        println!("Type {} for available commands", "/help".yellow());
                        continue;
                    }
                    if let SlashResult::Quit = self.handle_slash_command(input).await? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.handle.shutdown().await?;
        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Next Meal".bright_cyan().bold());
        println!("Backend: {}", self.base_url);
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> Result<SlashResult> {
        debug!(%input, "handle_slash_command: called");
        let command = match parse_command(input, Local::now().date_naive()) {
            Ok(command) => command,
            Err(e) => {
                println!("{} {}", "?".yellow(), e);
                return Ok(SlashResult::Continue);
            }
        };

        match command {
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => return Ok(SlashResult::Quit),
            ShellCommand::Status => {
                let snapshot = self.handle.snapshot().await?;
                print_snapshot(&snapshot);
                for notice in &snapshot.notices {
                    println!("{}", notice_line(notice));
                }
            }
            ShellCommand::Dispatch(intent) => {
                let snapshot = self.handle.dispatch(intent).await?;
                self.print_redirects();
                if snapshot.suggestion_pending || snapshot.plan_loading || snapshot.committing {
                    println!("{}", "...".dimmed());
                }
                let snapshot = self.handle.when_idle().await?;
                self.render(&snapshot);
            }
        }
        Ok(SlashResult::Continue)
    }

    fn print_redirects(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(RuntimeEvent::RedirectRequested { url }) => {
                    println!("{} {}", "Open to sign in:".bright_cyan(), url.underline());
                    println!(
                        "Then run {} with the session it hands back",
                        "/federated-complete <token> <subject>".yellow()
                    );
                }
                Ok(RuntimeEvent::Updated(_)) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    /// Print the state and any notices not shown yet
    fn render(&mut self, snapshot: &AppSnapshot) {
        print_snapshot(snapshot);
        for notice in snapshot.notices.iter().filter(|n| n.id > self.last_notice) {
            println!("{}", notice_line(notice));
        }
        if let Some(last) = snapshot.notices.iter().map(|n| n.id).max() {
            self.last_notice = self.last_notice.max(last);
        }
    }
}

enum SlashResult {
    Continue,
    Quit,
}
