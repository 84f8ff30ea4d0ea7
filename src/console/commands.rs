// Parsing of console input lines into commands.

use thiserror::Error;

pub const HELP_TEXT: &str = "\
Commands:
  feed                      show the feed
  comment <post_id> <text>  comment on a post
  like <post_id>            like or unlike a post
  refresh                   reload posts and comments
  analyze <post_id>         classify any unchecked comments on a post
  help                      show this list
  quit                      exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Feed,
    Comment { post_id: u64, text: String },
    Like { post_id: u64 },
    Refresh,
    Analyze { post_id: u64 },
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Nothing entered. Type `help` for the command list.")]
    Empty,

    #[error("Unknown command `{0}`. Type `help` for the command list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("`{0}` is not a post id")]
    BadPostId(String),
}

/// Split off the first whitespace-separated word. The rest keeps its
/// inner spacing but loses the separator.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim_start()),
        None => (input, ""),
    }
}

fn parse_post_id(raw: &str, usage: &'static str) -> Result<u64, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    raw.parse()
        .map_err(|_| CommandError::BadPostId(raw.to_string()))
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let (name, rest) = split_word(line.trim_end());

    match name.to_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "feed" | "show" => Ok(ConsoleCommand::Feed),
        "refresh" => Ok(ConsoleCommand::Refresh),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "comment" => {
            const USAGE: &str = "comment <post_id> <text>";
            let (id, text) = split_word(rest);
            let post_id = parse_post_id(id, USAGE)?;
            // Blank text is passed through; the pipeline rejects it
            Ok(ConsoleCommand::Comment {
                post_id,
                text: text.to_string(),
            })
        }
        "like" => {
            let (id, _) = split_word(rest);
            Ok(ConsoleCommand::Like {
                post_id: parse_post_id(id, "like <post_id>")?,
            })
        }
        "analyze" | "analyse" => {
            let (id, _) = split_word(rest);
            Ok(ConsoleCommand::Analyze {
                post_id: parse_post_id(id, "analyze <post_id>")?,
            })
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
