//! Call front end: a one-shot `call` and the interactive `session` loop.
//!
//! Both drive a single [`CallTrigger`] and print every status transition it
//! publishes.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;

use dialer_core::{CallStatus, CallTrigger, DialerError, StatusChange, ValidationError};

use crate::output::{self, status_badge, supports_color, transition_line};

/// Run one dispatch and report every transition. Returns the final status.
pub async fn dispatch_and_report(
    trigger: &mut CallTrigger,
    changes: &mut broadcast::Receiver<StatusChange>,
) -> Result<CallStatus, DialerError> {
    if trigger.can_dispatch() {
        output::note_info("Starting...");
    }

    let result = trigger.request_dispatch().await;

    let color = supports_color();
    while let Ok(change) = changes.try_recv() {
        println!("{}", transition_line(&change, color));
    }

    match &result {
        Ok(_) => output::note_success("Agent dispatched"),
        Err(e @ DialerError::Validation(_)) => output::note_warn(&failure_message(e)),
        Err(e) => output::note_error(&failure_message(e)),
    }
    result
}

/// What the user is told when a dispatch does not go out or fails.
pub fn failure_message(err: &DialerError) -> String {
    match err {
        DialerError::Validation(ValidationError::NotIdle(status)) => {
            format!("A call is already in progress ({status}); reset first")
        }
        DialerError::Validation(e) => format!("Please provide phone number and server URL ({e})"),
        DialerError::Dispatch(e) => format!("Error starting call: {e}"),
    }
}

/// A line typed at the session prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Phone(String),
    Transfer(String),
    Server(String),
    Call,
    Reset,
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim().to_string()),
            None => (line, String::new()),
        };
        let cmd = match word.to_ascii_lowercase().as_str() {
            "phone" => Command::Phone(rest),
            "transfer" => Command::Transfer(rest),
            "server" => Command::Server(rest),
            "call" | "start" => Command::Call,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        };
        Some(cmd)
    }
}

const HELP: &str = "\
Commands:
  phone <number>     number to call
  transfer [number]  number to transfer to on request (blank clears)
  server <url>       LiveKit server URL
  call               start the outbound call
  reset              back to idle, clear numbers
  status             show current state
  quit               leave the session";

fn print_status(trigger: &CallTrigger) {
    let info = trigger.dial_info();
    println!(
        "Status: {}{}",
        status_badge(trigger.status(), supports_color()),
        if trigger.is_loading() { " (loading)" } else { "" }
    );
    println!("  server:   {}", display_or_dash(trigger.server_url()));
    println!("  phone:    {}", display_or_dash(&info.phone_number));
    println!("  transfer: {}", display_or_dash(&info.transfer_to));
    if let Some(err) = trigger.last_error() {
        println!("  last error: {err}");
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Interactive loop over stdin until `quit` or end of input.
pub async fn run_session(mut trigger: CallTrigger) -> Result<()> {
    let mut changes = trigger.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Voice Agent Trigger. Type `help` for commands.");
    loop {
        stdout.write_all(b"dialer> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("failed reading stdin")? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Phone(number) => trigger.set_phone_number(number),
            Command::Transfer(number) => trigger.set_transfer_to(number),
            Command::Server(url) => trigger.set_server_url(url),
            Command::Call => {
                // Failures are already reported and leave the session usable.
                let _ = dispatch_and_report(&mut trigger, &mut changes).await;
            }
            Command::Reset => {
                trigger.reset();
                while let Ok(change) = changes.try_recv() {
                    println!("{}", transition_line(&change, supports_color()));
                }
            }
            Command::Status => print_status(&trigger),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(word) => output::note_warn(&format!("unknown command `{word}`")),
        }
    }

    Ok(())
}
