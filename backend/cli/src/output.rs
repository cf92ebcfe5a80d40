//! Terminal output: status badges, notes and dispatch tables.

use dialer_core::{AgentDispatch, CallStatus, StatusChange};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

fn status_color(status: CallStatus) -> &'static str {
    match status {
        CallStatus::Idle => DIM,
        CallStatus::Dialing => YELLOW,
        CallStatus::Connected => GREEN,
        CallStatus::Ended => RED,
    }
}

/// "Connected", colored when the terminal allows it.
pub fn status_badge(status: CallStatus, color: bool) -> String {
    if color {
        format!("{}{BOLD}{}{RESET}", status_color(status), status.label())
    } else {
        status.label().to_string()
    }
}

pub fn transition_line(change: &StatusChange, color: bool) -> String {
    format!(
        "Status: {} -> {}",
        status_badge(change.from, color),
        status_badge(change.to, color)
    )
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Dispatch table
// ---------------------------------------------------------------------------

/// Render dispatches as an aligned table.
pub fn render_dispatches(dispatches: &[AgentDispatch]) -> String {
    let headers = ["ID", "Agent", "Room", "Created"];
    let rows: Vec<[String; 4]> = dispatches
        .iter()
        .map(|d| {
            [
                d.id.to_string(),
                d.agent_name.clone(),
                d.room.clone(),
                d.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let pad = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c:<width$}", width = widths[i]))
            .collect();
        format!("  {}\n", padded.join("  ").trim_end())
    };

    let mut out = pad(headers.to_vec());
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}\n", sep.join("  ")));
    for row in &rows {
        out.push_str(&pad(row.iter().map(String::as_str).collect()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialer_core::{DialInfo, DispatchRequest};

    /// Strip ANSI escape codes from a string.
    fn strip_ansi(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // Skip until 'm'
                for next in chars.by_ref() {
                    if next == 'm' {
                        break;
                    }
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn badge_without_color_is_label() {
        assert_eq!(status_badge(CallStatus::Dialing, false), "Dialing");
        assert_eq!(
            strip_ansi(&status_badge(CallStatus::Connected, true)),
            "Connected"
        );
    }

    #[test]
    fn formats_transition() {
        let change = StatusChange {
            from: CallStatus::Idle,
            to: CallStatus::Dialing,
        };
        assert_eq!(transition_line(&change, false), "Status: Idle -> Dialing");
    }

    #[test]
    fn renders_dispatch_table() {
        let req = DispatchRequest::new("outbound-call-1-abcdefghi", &DialInfo::new("+15551234567"));
        let dispatch = AgentDispatch::from_request(&req);
        let table = render_dispatches(&[dispatch.clone()]);
        assert!(table.contains("outbound-call-1-abcdefghi"));
        assert!(table.contains(&dispatch.id.to_string()));
        assert_eq!(table.lines().count(), 3);
    }
}
