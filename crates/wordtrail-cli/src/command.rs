//! Command parsing.

use thiserror::Error;

/// A malformed command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command \"{0}\"")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// One harness command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NewGame,
    Continue,
    Advance,
    /// Enter the pending quiz, or a specific challenge when given.
    Enter(Option<(String, u32)>),
    Answer(Vec<String>),
    Correct,
    Incorrect,
    Timeout,
    Heart,
    Tick(f64),
    Pause,
    Resume,
    Retry,
    ContinueQuiz,
    Summary,
    Save { index: usize, info: String },
    Load(usize),
    Delete(usize),
    Slots,
    Reset,
    State,
    Flush,
    Quit,
}

impl Command {
    /// Parses a line. Returns `Ok(None)` for blank lines and `#` comments.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("new", []) => Self::NewGame,
            ("continue", []) => Self::Continue,
            ("advance", []) => Self::Advance,
            ("enter", []) => Self::Enter(None),
            ("enter", [schema, index]) => Self::Enter(Some((
                (*schema).to_owned(),
                index.parse().map_err(|_| ParseError::Usage("enter [schema index]"))?,
            ))),
            ("enter", _) => return Err(ParseError::Usage("enter [schema index]")),
            ("answer", []) => return Err(ParseError::Usage("answer <glyph>...")),
            ("answer", glyphs) => Self::Answer(glyphs.iter().map(|g| (*g).to_owned()).collect()),
            ("correct", []) => Self::Correct,
            ("incorrect", []) => Self::Incorrect,
            ("timeout", []) => Self::Timeout,
            ("heart", []) => Self::Heart,
            ("tick", [seconds]) => Self::Tick(
                seconds
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite())
                    .ok_or(ParseError::Usage("tick <seconds>"))?,
            ),
            ("pause", []) => Self::Pause,
            ("resume", []) => Self::Resume,
            ("retry", []) => Self::Retry,
            ("continue-quiz", []) => Self::ContinueQuiz,
            ("summary", []) => Self::Summary,
            ("save", [index, info @ ..]) => Self::Save {
                index: parse_index(index, "save <index> [info]")?,
                info: info.join(" "),
            },
            ("load", [index]) => Self::Load(parse_index(index, "load <index>")?),
            ("delete", [index]) => Self::Delete(parse_index(index, "delete <index>")?),
            ("slots", []) => Self::Slots,
            ("reset", []) => Self::Reset,
            ("state", []) => Self::State,
            ("flush", []) => Self::Flush,
            ("quit" | "exit", []) => Self::Quit,
            (name, _) => return Err(usage_for(name)),
        };
        Ok(Some(command))
    }
}

fn parse_index(raw: &str, usage: &'static str) -> Result<usize, ParseError> {
    raw.parse().map_err(|_| ParseError::Usage(usage))
}

fn usage_for(name: &str) -> ParseError {
    let usage = match name {
        "new" => "new",
        "continue" => "continue",
        "advance" => "advance",
        "correct" => "correct",
        "incorrect" => "incorrect",
        "timeout" => "timeout",
        "heart" => "heart",
        "tick" => "tick <seconds>",
        "pause" => "pause",
        "resume" => "resume",
        "retry" => "retry",
        "continue-quiz" => "continue-quiz",
        "summary" => "summary",
        "save" => "save <index> [info]",
        "load" => "load <index>",
        "delete" => "delete <index>",
        "slots" => "slots",
        "reset" => "reset",
        "state" => "state",
        "flush" => "flush",
        "quit" | "exit" => "quit",
        other => return ParseError::Unknown(other.to_owned()),
    };
    ParseError::Usage(usage)
}
