use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Reader-screen controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Space went down (hold mode).
    PlayPressed,
    /// Space came up, or focus was lost while it was held (hold mode).
    PlayReleased,
    /// Space tapped (toggle mode).
    TogglePlay,
    StepBack,
    StepForward,
    WpmUp,
    WpmDown,
    SeekStart,
    SeekEnd,
    /// Open the prompt for typing a rate.
    EditWpm,
    /// Leave the reader for the editor.
    Back,
    Quit,
}

/// Editor-screen controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Insert(char),
    Newline,
    Backspace,
    Clear,
    LoadSample,
    Submit,
    Quit,
}

/// Keys while the rate prompt is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryCommand {
    Insert(char),
    Backspace,
    Confirm,
    Cancel,
}

/// How the spacebar drives playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PlayMode {
    /// Each press flips play/pause. Works on every terminal.
    #[default]
    Toggle,
    /// Read while space is held. Needs key release reporting.
    Hold,
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Turns raw key events into reader commands.
///
/// In hold mode it remembers whether space is down, so auto-repeat never
/// issues a second play and a lost focus still releases playback.
#[derive(Debug, Default)]
pub struct KeyTracker {
    mode: PlayMode,
    space_held: bool,
}

impl KeyTracker {
    pub fn new(mode: PlayMode) -> Self {
        Self {
            mode,
            space_held: false,
        }
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    pub fn reader_command(&mut self, key: KeyEvent) -> Option<Command> {
        if is_ctrl(&key, 'c') {
            return Some(Command::Quit);
        }

        if key.code == KeyCode::Char(' ') {
            return self.space(key.kind);
        }

        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => Some(Command::StepBack),
            KeyCode::Right | KeyCode::Char('l') => Some(Command::StepForward),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+') | KeyCode::Char('=') => {
                Some(Command::WpmUp)
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-') => Some(Command::WpmDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Command::SeekStart),
            KeyCode::End | KeyCode::Char('G') => Some(Command::SeekEnd),
            KeyCode::Char('w') => Some(Command::EditWpm),
            KeyCode::Esc => Some(Command::Back),
            KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        }
    }

    fn space(&mut self, kind: KeyEventKind) -> Option<Command> {
        match (self.mode, kind) {
            (PlayMode::Toggle, KeyEventKind::Press) => Some(Command::TogglePlay),
            (PlayMode::Toggle, _) => None,
            (PlayMode::Hold, KeyEventKind::Release) => {
                self.space_held = false;
                Some(Command::PlayReleased)
            }
            (PlayMode::Hold, _) if self.space_held => None,
            (PlayMode::Hold, _) => {
                self.space_held = true;
                Some(Command::PlayPressed)
            }
        }
    }

    /// Swallow space events that still belong to a hold begun on the
    /// reader, so they are not typed into the editor. The release ends it.
    pub fn absorb_held_space(&mut self, key: &KeyEvent) -> bool {
        if !self.space_held || key.code != KeyCode::Char(' ') {
            return false;
        }
        if key.kind == KeyEventKind::Release {
            self.space_held = false;
        }
        true
    }

    /// The terminal lost focus: a held space will never see its release.
    pub fn focus_lost(&mut self) -> Option<Command> {
        if self.space_held {
            self.space_held = false;
            Some(Command::PlayReleased)
        } else {
            None
        }
    }
}

pub fn entry_command(key: KeyEvent) -> Option<EntryCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(EntryCommand::Cancel);
    }

    match key.code {
        KeyCode::Enter => Some(EntryCommand::Confirm),
        KeyCode::Esc => Some(EntryCommand::Cancel),
        KeyCode::Backspace => Some(EntryCommand::Backspace),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(EntryCommand::Insert(c))
        }
        _ => None,
    }
}

pub fn editor_command(key: KeyEvent) -> Option<EditCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl(&key, 'c') {
        return Some(EditCommand::Quit);
    }
    if is_ctrl(&key, 'r') {
        return Some(EditCommand::Submit);
    }
    if is_ctrl(&key, 'u') {
        return Some(EditCommand::Clear);
    }
    if is_ctrl(&key, 'l') {
        return Some(EditCommand::LoadSample);
    }

    match key.code {
        KeyCode::F(5) => Some(EditCommand::Submit),
        KeyCode::Esc => Some(EditCommand::Quit),
        KeyCode::Enter => Some(EditCommand::Newline),
        KeyCode::Backspace => Some(EditCommand::Backspace),
        KeyCode::Tab => Some(EditCommand::Insert('\t')),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(EditCommand::Insert(c))
        }
        _ => None,
    }
}
