//! Command line parsing for the research desk client.

use std::fmt;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account and log in
    Register { username: String, email: String },
    /// Log in with an existing account
    Login { email: String },
    /// Forget the stored session
    Logout,
    /// Show the identity the server associates with the stored token
    WhoAmI,
    /// Search papers
    Search { query: String },
    /// Summarize one abstract
    Summarize { abstract_text: String },
    /// Generate a research report
    Report { query: String },
    /// Search and store the results in the inventory
    SaveSearch { query: String },
    /// List stored searches
    Inventory,
}

impl Command {
    /// Whether the command needs a stored session.
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. } | Command::Login { .. } | Command::Logout
        )
    }
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No command given.
    MissingCommand,
    /// Command is missing a required argument.
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    /// Command takes no arguments but some were given.
    UnexpectedArgument(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Use --help to see available commands"),
            Self::MissingArgument { command, argument } => {
                write!(f, "'{}' requires {} (e.g., '{} {}')", command, argument, command, argument)
            }
            Self::UnexpectedArgument(arg) => write!(f, "Unexpected argument '{}'", arg),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Use --help to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse the free arguments left after option parsing.
///
/// # Examples
///
/// ```
/// use rd_client::commands::{parse_command, Command};
///
/// let words: Vec<String> = ["search", "graph", "neural", "networks"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
///
/// assert_eq!(
///     parse_command(&words),
///     Ok(Command::Search { query: "graph neural networks".to_string() })
/// );
/// ```
pub fn parse_command(words: &[String]) -> Result<Command, ParseError> {
    let Some((command, rest)) = words.split_first() else {
        return Err(ParseError::MissingCommand);
    };

    match command.as_str() {
        "register" => match rest {
            [username, email] => Ok(Command::Register {
                username: username.clone(),
                email: email.clone(),
            }),
            [_, _, extra, ..] => Err(ParseError::UnexpectedArgument(extra.clone())),
            _ => Err(ParseError::MissingArgument {
                command: "register",
                argument: "USERNAME EMAIL",
            }),
        },
        "login" => match rest {
            [email] => Ok(Command::Login {
                email: email.clone(),
            }),
            [_, extra, ..] => Err(ParseError::UnexpectedArgument(extra.clone())),
            [] => Err(ParseError::MissingArgument {
                command: "login",
                argument: "EMAIL",
            }),
        },
        "logout" => no_arguments(rest, Command::Logout),
        "whoami" => no_arguments(rest, Command::WhoAmI),
        "inventory" => no_arguments(rest, Command::Inventory),
        "search" => joined(rest, "search", "QUERY").map(|query| Command::Search { query }),
        "summarize" => joined(rest, "summarize", "ABSTRACT")
            .map(|abstract_text| Command::Summarize { abstract_text }),
        "report" => joined(rest, "report", "QUERY").map(|query| Command::Report { query }),
        "save-search" => {
            joined(rest, "save-search", "QUERY").map(|query| Command::SaveSearch { query })
        }
        other => Err(ParseError::UnrecognizedCommand(other.to_string())),
    }
}

/// Remove the line terminator left by `read_line`, keeping all other
/// whitespace. Passwords are taken verbatim.
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn no_arguments(rest: &[String], command: Command) -> Result<Command, ParseError> {
    match rest.first() {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.clone())),
        None => Ok(command),
    }
}

/// Remaining words joined with single spaces; must not be blank.
fn joined(
    rest: &[String],
    command: &'static str,
    argument: &'static str,
) -> Result<String, ParseError> {
    let text = rest
        .iter()
        .flat_map(|word| word.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(text)
    }
}
