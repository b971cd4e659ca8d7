//! Terminal input handling

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// A user action at the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Submit(String),
    Clear,
    /// Expand or collapse the tool payload of the message at this index
    ToggleExpand(usize),
    Quit,
}

/// Interpret one line of terminal input
pub fn parse_command(line: &str) -> UserCommand {
    let trimmed = line.trim();
    let lower = trimmed.to_ascii_lowercase();

    match lower.as_str() {
        "quit" | "exit" => return UserCommand::Quit,
        "clear" => return UserCommand::Clear,
        _ => {}
    }

    if let Some(arg) = lower.strip_prefix("/expand") {
        if let Ok(index) = arg.trim().parse() {
            return UserCommand::ToggleExpand(index);
        }
    }

    UserCommand::Submit(line.to_string())
}

/// Read stdin line by line until EOF, forwarding parsed commands.
/// EOF is reported as [`UserCommand::Quit`].
pub fn spawn_stdin_reader(tx: mpsc::Sender<UserCommand>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let command = match lines.next_line().await {
                Ok(Some(line)) => parse_command(&line),
                Ok(None) => UserCommand::Quit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    UserCommand::Quit
                }
            };
            let quit = command == UserCommand::Quit;
            if tx.send(command).await.is_err() || quit {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(parse_command("quit"), UserCommand::Quit);
        assert_eq!(parse_command("  EXIT "), UserCommand::Quit);
        assert_eq!(parse_command("Clear"), UserCommand::Clear);
        assert_eq!(parse_command("/expand 3"), UserCommand::ToggleExpand(3));
    }

    #[test]
    fn test_everything_else_is_submitted_verbatim() {
        assert_eq!(
            parse_command("  what is 2+2? "),
            UserCommand::Submit("  what is 2+2? ".to_string())
        );
        assert_eq!(
            parse_command("/expand later"),
            UserCommand::Submit("/expand later".to_string())
        );
        assert_eq!(parse_command(""), UserCommand::Submit(String::new()));
    }
}
