//! Terminal session: stdin/stdout REPL driving one conversation.
//!
//! Owns the `ConversationState` for the lifetime of the process and feeds
//! each typed line to the `FlowController` one at a time.

use futures::StreamExt;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::conversation::render::{itinerary_html, render_entries, render_prompt, render_transcript};
use crate::conversation::{Archetype, ConversationState, FlowController, Step, UserAction};
use crate::error::Result;
use crate::services::{EmailNotifier, ExternalResult, SmsNotifier};

const HELP: &str = "\
Commands:
  /restaurants               show restaurants near your experience
  /chat <message>            chat at any step
  /sms <number> <message>    text someone (E.164, e.g. +12345678901)
  /email <address> <subject> email your plan
  /transcript                reprint the conversation
  /quit                      exit";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Quit,
    Help,
    Transcript,
    /// Step 1 collects the location before the archetype menu.
    SetLocation(String),
    Act(UserAction),
    Sms { to: String, body: String },
    Email { to: String, subject: String },
    Invalid(String),
}

fn split_command(rest: &str) -> Option<(&str, &str)> {
    let rest = rest.trim();
    let (first, tail) = rest.split_once(char::is_whitespace)?;
    let tail = tail.trim();
    (!first.is_empty() && !tail.is_empty()).then_some((first, tail))
}

/// Interpret `line` for the current step. `pending_location` is the location
/// already typed during step 1, if any.
pub fn parse_line(step: Step, pending_location: Option<&str>, line: &str) -> CliCommand {
    let line = line.trim();

    if let Some(command) = line.strip_prefix('/') {
        let (name, rest) = command
            .split_once(char::is_whitespace)
            .unwrap_or((command, ""));
        return match name {
            "quit" | "exit" => CliCommand::Quit,
            "help" => CliCommand::Help,
            "transcript" => CliCommand::Transcript,
            "restaurants" => CliCommand::Act(UserAction::ShowRestaurants),
            "chat" if !rest.trim().is_empty() => {
                CliCommand::Act(UserAction::Chat(rest.trim().to_string()))
            }
            "sms" => match split_command(rest) {
                Some((to, body)) => CliCommand::Sms {
                    to: to.to_string(),
                    body: body.to_string(),
                },
                None => CliCommand::Invalid("Usage: /sms <number> <message>".to_string()),
            },
            "email" => match split_command(rest) {
                Some((to, subject)) => CliCommand::Email {
                    to: to.to_string(),
                    subject: subject.to_string(),
                },
                None => CliCommand::Invalid("Usage: /email <address> <subject>".to_string()),
            },
            _ => CliCommand::Invalid(format!("Unknown command /{name}. Try /help.")),
        };
    }

    match step {
        Step::CollectName => CliCommand::Act(UserAction::SubmitName(line.to_string())),
        Step::CollectPreferences => match pending_location {
            None => CliCommand::SetLocation(line.to_string()),
            Some(location) => match line.parse::<Archetype>() {
                Ok(archetype) => CliCommand::Act(UserAction::SubmitPreferences {
                    archetype,
                    location: location.to_string(),
                }),
                Err(e) => CliCommand::Invalid(format!("{e}. Pick a number from 1 to 5.")),
            },
        },
        Step::ShowRestaurants | Step::OpenChat => {
            CliCommand::Act(UserAction::Chat(line.to_string()))
        }
    }
}

/// Blank lines are ignored except as the name, which may be empty.
fn skips_blank(step: Step, line: &str) -> bool {
    line.trim().is_empty() && step != Step::CollectName
}

fn archetype_menu() -> String {
    Archetype::ALL
        .iter()
        .enumerate()
        .map(|(i, a)| format!("  {}. {}", i + 1, a.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single interactive session.
pub struct Session {
    state: ConversationState,
    controller: FlowController,
    sms: Option<SmsNotifier>,
    email: Option<EmailNotifier>,
    pending_location: Option<String>,
}

impl Session {
    pub fn new(
        controller: FlowController,
        sms: Option<SmsNotifier>,
        email: Option<EmailNotifier>,
    ) -> Self {
        Self {
            state: ConversationState::new(),
            controller,
            sms,
            email,
            pending_location: None,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    fn print_prompt(&self) {
        for line in render_prompt(&self.state) {
            println!("{line}");
        }
        if self.state.step() == Step::CollectPreferences {
            match &self.pending_location {
                None => println!("Where are you? (city, neighborhood or address)"),
                Some(location) => println!("Near {location}. Choose one:\n{}", archetype_menu()),
            }
        }
        eprint!("> ");
    }

    /// Handle one line. Returns `false` when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        let command = parse_line(self.state.step(), self.pending_location.as_deref(), line);
        match command {
            CliCommand::Quit => return false,
            CliCommand::Help => println!("{HELP}"),
            CliCommand::Transcript => {
                for line in render_transcript(&self.state) {
                    println!("{line}");
                }
            }
            CliCommand::SetLocation(location) => self.pending_location = Some(location),
            CliCommand::Invalid(message) => println!("{message}"),
            CliCommand::Act(action) => self.act(action).await,
            CliCommand::Sms { to, body } => match &self.sms {
                Some(notifier) => report("SMS", &to, notifier.send(&to, &body).await),
                None => println!("SMS is not configured."),
            },
            CliCommand::Email { to, subject } => match &self.email {
                Some(notifier) => {
                    let body = itinerary_html(&self.state);
                    report("Email", &to, notifier.send(&to, &subject, &body).await);
                }
                None => println!("Email is not configured."),
            },
        }
        true
    }

    async fn act(&mut self, action: UserAction) {
        let before = self.state.transcript().len();
        let submitted_preferences = matches!(action, UserAction::SubmitPreferences { .. });
        match self.controller.apply(&mut self.state, action).await {
            Ok(_) => {
                for line in render_entries(&self.state.transcript()[before..]) {
                    println!("{line}");
                }
            }
            Err(e) => println!("{e}"),
        }
        if submitted_preferences {
            self.pending_location = None;
        }
    }

    /// Run until EOF or `/quit`.
    pub async fn run(mut self) -> Result<()> {
        println!("{}", crate::conversation::prompts::TITLE);
        println!("Type /help for commands.\n");

        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = Box::pin(stream::unfold(reader.lines(), |mut lines| async move {
            match lines.next_line().await {
                Ok(Some(line)) => Some((Ok(line), lines)),
                Ok(None) => None,
                Err(e) => Some((Err(e), lines)),
            }
        }));

        self.print_prompt();
        while let Some(line) = lines.next().await {
            let line = line?;
            if skips_blank(self.state.step(), &line) {
                eprint!("> ");
                continue;
            }
            if !self.handle_line(&line).await {
                break;
            }
            println!();
            self.print_prompt();
        }
        tracing::info!(
            session = %self.state.session_id(),
            turns = self.state.transcript().len(),
            "Session ended"
        );
        Ok(())
    }
}

fn report(channel: &str, to: &str, result: ExternalResult<()>) {
    match result {
        ExternalResult::Success(()) => println!("{channel} sent to {to}."),
        ExternalResult::NotFound => println!("{channel} not sent: recipient not found."),
        ExternalResult::InvalidInput(message) => println!("Error: {message}"),
        ExternalResult::ProviderError(message) => {
            println!("Error sending {}: {message}", channel.to_lowercase())
        }
    }
}
