use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::render_model::{build_render_models, RenderModel};
use crate::tokenize::tokenize;

pub const MIN_WPM: u32 = 50;
pub const MAX_WPM: u32 = 1200;
pub const DEFAULT_WPM: u32 = 300;
/// Increment used by the WPM controls.
pub const WPM_STEP: u32 = 10;

/// Clamp any requested rate into `[MIN_WPM, MAX_WPM]`.
pub fn clamp_wpm(wpm: i64) -> u32 {
    wpm.clamp(MIN_WPM as i64, MAX_WPM as i64) as u32
}

/// Read a typed rate. Blank input counts as zero and fractions round, so
/// the result still needs [`clamp_wpm`]; `None` means "not a number" and
/// the current rate should stay.
pub fn parse_wpm(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Some(0);
    }
    let value: f64 = input.parse().ok()?;
    if value.is_nan() {
        return None;
    }
    // saturates for infinities and out-of-range values
    Some(value.round() as i64)
}

/// Time each word stays on screen: `60000 / wpm` milliseconds.
pub fn wpm_interval(wpm: u32) -> Duration {
    Duration::from_nanos(60_000_000_000 / u64::from(wpm.max(1)))
}

/// Clamp an index into `[0, len - 1]`; an empty sequence yields 0.
pub fn clamp_index(index: i64, len: usize) -> usize {
    let last = len.saturating_sub(1) as i64;
    index.clamp(0, last) as usize
}

/// Tokens and their render models, always of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    tokens: Vec<String>,
    models: Vec<RenderModel>,
}

impl Prepared {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let models = build_render_models(&tokens);
        Self { tokens, models }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn models(&self) -> &[RenderModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Tokenize `text` and build its render models.
///
/// Text without any words is reported as [`Error::NoText`] so the editing
/// screen can tell the user instead of opening an empty reader.
pub fn prepare(text: &str) -> Result<Prepared> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(Error::NoText);
    }
    Ok(Prepared::from_tokens(tokens))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Finished,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetText(String),
    SetWpm(i64),
    PrepareReading(Prepared),
    Seek(i64),
    StepForward,
    StepBack,
    Play,
    Pause,
    /// Autoplay advance. Only meaningful while playing.
    Tick,
    SetError(String),
    ClearError,
    ResetReader,
}

/// Everything the reader screens need: source text, the prepared token
/// sequence, the current position and rate, and the playback phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderState {
    pub text: String,
    pub prepared: Prepared,
    pub index: usize,
    pub wpm: u32,
    pub phase: Phase,
    pub error: Option<String>,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            text: String::new(),
            prepared: Prepared::default(),
            index: 0,
            wpm: DEFAULT_WPM,
            phase: Phase::Idle,
            error: None,
        }
    }
}

impl ReaderState {
    pub fn tokens(&self) -> &[String] {
        self.prepared.tokens()
    }

    pub fn models(&self) -> &[RenderModel] {
        self.prepared.models()
    }

    pub fn len(&self) -> usize {
        self.prepared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prepared.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current_model(&self) -> Option<&RenderModel> {
        self.models().get(self.index)
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.len()
    }

    /// Apply `action`. Returns `false` when the state is left untouched.
    pub fn apply(&mut self, action: Action) -> bool {
        let before = (self.index, self.phase, self.wpm);

        match action {
            Action::SetText(text) => {
                self.text = text;
                self.error = None;
                return true;
            }
            Action::SetWpm(wpm) => self.wpm = clamp_wpm(wpm),
            Action::PrepareReading(prepared) => {
                debug!(tokens = prepared.len(), "prepared reading");
                self.prepared = prepared;
                self.index = 0;
                self.phase = Phase::Idle;
                self.error = None;
                return true;
            }
            Action::Seek(index) => {
                self.phase = Phase::Idle;
                self.index = clamp_index(index, self.len());
            }
            Action::StepForward if !self.is_empty() => match self.phase {
                Phase::Finished => {}
                _ if self.is_last() => self.phase = Phase::Finished,
                _ => {
                    self.phase = Phase::Idle;
                    self.index += 1;
                }
            },
            Action::StepBack if !self.is_empty() => match self.phase {
                Phase::Finished => {
                    self.phase = Phase::Idle;
                    self.index = self.index.saturating_sub(1);
                }
                _ if self.index == 0 => self.phase = Phase::Idle,
                _ => {
                    self.phase = Phase::Idle;
                    self.index -= 1;
                }
            },
            Action::StepForward | Action::StepBack => {}
            Action::Play => {
                if self.phase == Phase::Idle && !self.is_empty() {
                    self.phase = Phase::Playing;
                }
            }
            Action::Pause => {
                if self.phase == Phase::Playing {
                    self.phase = Phase::Idle;
                }
            }
            Action::Tick => {
                if self.phase == Phase::Playing {
                    if self.is_last() {
                        self.phase = Phase::Finished;
                    } else {
                        self.index += 1;
                    }
                }
            }
            Action::SetError(message) => {
                self.error = Some(message);
                return true;
            }
            Action::ClearError => {
                return self.error.take().is_some();
            }
            Action::ResetReader => {
                *self = Self::default();
                return true;
            }
        }

        let changed = before != (self.index, self.phase, self.wpm);
        if changed && before.1 != self.phase {
            debug!(from = %before.1, to = %self.phase, index = self.index, "phase changed");
        }
        changed
    }
}
