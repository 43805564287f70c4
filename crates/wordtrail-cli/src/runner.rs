//! Executes commands against the session and renders JSON lines.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use wordtrail_core::content::DialogLine;
use wordtrail_core::progression::ProgressionState;
use wordtrail_quiz::CountdownEvent;
use wordtrail_session::{Checkpointed, QuizSession, QuizSummary};

use crate::command::Command;
use crate::error::{AppError, CommandError};
use crate::state::AppState;

/// Whether to keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A successful command's result.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The JSON result.
    pub result: Value,
    /// Set when the command's checkpoint did not reach storage.
    pub write_error: Option<String>,
    /// Whether to keep going.
    pub flow: Flow,
}

impl Outcome {
    fn of<T: Serialize>(value: &T) -> Result<Self, CommandError> {
        Ok(Self {
            result: serde_json::to_value(value)?,
            write_error: None,
            flow: Flow::Continue,
        })
    }

    fn checkpointed<T: Serialize>(value: &Checkpointed<T>) -> Result<Self, CommandError> {
        let mut outcome = Self::of(&value.value)?;
        outcome.write_error = value.write_error.as_ref().map(ToString::to_string);
        Ok(outcome)
    }
}

#[derive(Debug, Serialize)]
struct OkBody<'a> {
    ok: bool,
    result: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    write_error: Option<&'a str>,
}

/// Everything a surface needs to redraw.
#[derive(Debug, Serialize)]
struct StateView {
    phase: &'static str,
    state: ProgressionState,
    line: Option<DialogLine>,
    quiz: Option<QuizSession>,
    summary: Option<QuizSummary>,
    has_continue_data: bool,
    paused: bool,
}

#[derive(Debug, Serialize)]
struct TickView<T: Serialize, F: Serialize> {
    tick: T,
    timeout: Option<F>,
}

/// Runs one command.
///
/// # Errors
///
/// Returns `CommandError` if the session rejects the command.
pub fn execute(app: &mut AppState, command: Command) -> Result<Outcome, CommandError> {
    let c = &mut app.controller;
    match command {
        Command::NewGame => Outcome::checkpointed(&c.new_game()),
        Command::Continue => Outcome::checkpointed(&c.resume_from_auto_save()),
        Command::Advance => Outcome::checkpointed(&c.advance_dialog()?),
        Command::Enter(None) => Outcome::checkpointed(&c.enter_pending_quiz()?),
        Command::Enter(Some((schema, index))) => {
            Outcome::checkpointed(&c.enter_quiz(&schema, index)?)
        }
        Command::Answer(glyphs) => Outcome::checkpointed(&c.submit_answer(&glyphs)?),
        Command::Correct => Outcome::checkpointed(&c.on_answer(true)?),
        Command::Incorrect => Outcome::checkpointed(&c.on_answer(false)?),
        Command::Timeout => Outcome::checkpointed(&c.on_timeout()?),
        Command::Heart => Outcome::checkpointed(&c.award_heart()?),
        Command::Tick(seconds) => {
            let report = c.tick(seconds);
            if report.countdown != Some(CountdownEvent::Expired) {
                return Outcome::of(&TickView::<_, ()> {
                    tick: report,
                    timeout: None,
                });
            }
            info!("question countdown expired");
            let feedback = c.on_timeout()?;
            let mut outcome = Outcome::of(&TickView {
                tick: report,
                timeout: Some(&feedback.value),
            })?;
            outcome.write_error = feedback.write_error.as_ref().map(ToString::to_string);
            Ok(outcome)
        }
        Command::Pause => {
            c.pause();
            Outcome::of(&serde_json::json!({ "paused": c.is_paused() }))
        }
        Command::Resume => {
            c.resume();
            Outcome::of(&serde_json::json!({ "paused": c.is_paused() }))
        }
        Command::Retry => Outcome::checkpointed(&c.retry_last_quiz()?),
        Command::ContinueQuiz => Outcome::checkpointed(&c.continue_after_quiz()?),
        Command::Summary => Outcome::of(&c.show_summary()?),
        Command::Save { index, info } => Outcome::of(&c.save_to_slot(index, &info)?),
        Command::Load(index) => Outcome::checkpointed(&c.load_from_slot(index)?),
        Command::Delete(index) => {
            c.delete_slot(index)?;
            Outcome::of(&c.list_slots())
        }
        Command::Slots => Outcome::of(&c.list_slots()),
        Command::Reset => Outcome::of(&c.reset_all_progress()?),
        Command::State => Outcome::of(&StateView {
            phase: c.phase().as_str(),
            state: c.snapshot(),
            line: c.current_line(),
            quiz: c.quiz_session(),
            summary: c.summary(),
            has_continue_data: c.has_continue_data(),
            paused: c.is_paused(),
        }),
        Command::Flush => Outcome::of(&serde_json::json!({ "written": c.flush()? })),
        Command::Quit => Ok(Outcome {
            result: Value::Null,
            write_error: None,
            flow: Flow::Quit,
        }),
    }
}

/// Parses and runs one input line. Returns the response line, or `None` for
/// blank lines and comments.
///
/// # Errors
///
/// Returns `AppError::Serialization` if the response cannot be encoded.
pub fn handle_line(app: &mut AppState, line: &str) -> Result<Option<(String, Flow)>, AppError> {
    let parsed = Command::parse(line).map_err(CommandError::from);
    let outcome = match parsed {
        Ok(None) => return Ok(None),
        Ok(Some(command)) => {
            debug!(?command, "command received");
            execute(app, command)
        }
        Err(err) => Err(err),
    };
    match outcome {
        Ok(outcome) => {
            let body = OkBody {
                ok: true,
                result: &outcome.result,
                write_error: outcome.write_error.as_deref(),
            };
            Ok(Some((serde_json::to_string(&body)?, outcome.flow)))
        }
        Err(err) => {
            info!(code = err.code(), error = %err, "command rejected");
            Ok(Some((serde_json::to_string(&err.to_body())?, Flow::Continue)))
        }
    }
}

/// Reads commands from `input` until end of input or `quit`, writing one
/// response line per command to `output`.
///
/// # Errors
///
/// Returns `AppError::Io` if reading or writing fails.
pub fn run<R: BufRead, W: Write>(
    app: &mut AppState,
    input: R,
    mut output: W,
) -> Result<(), AppError> {
    for line in input.lines() {
        let line = line?;
        let Some((response, flow)) = handle_line(app, &line)? else {
            continue;
        };
        writeln!(output, "{response}")?;
        output.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}
