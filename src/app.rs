use std::cell::Cell;
use std::time::Duration;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::editor::Editor;
use crate::input::{
    editor_command, entry_command, Command, EditCommand, EntryCommand, KeyTracker, PlayMode,
};
use crate::presenter::Presenter;
use crate::progress::index_for_ratio;
use crate::runtime::ReaderEvent;
use crate::state::{clamp_wpm, parse_wpm, prepare, Action, ReaderState, DEFAULT_WPM, WPM_STEP};
use crate::store::{KeyValueStore, Stored, WPM_KEY};
use crate::timer::{Clock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Editor,
    Reader,
}

pub struct App<C: Clock = SystemClock> {
    pub screen: Screen,
    pub editor: Editor,
    pub presenter: Presenter<C>,
    pub keys: KeyTracker,
    store: Box<dyn KeyValueStore>,
    wpm: Stored<u32>,
    /// Text typed into the rate prompt while it is open.
    wpm_entry: Option<String>,
    /// Where the progress bar was last drawn, for pointer seeking.
    progress_area: Cell<Option<Rect>>,
    should_quit: bool,
}

impl App<SystemClock> {
    pub fn new(store: Box<dyn KeyValueStore>, mode: PlayMode) -> Self {
        Self::with_clock(SystemClock, store, mode)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(clock: C, store: Box<dyn KeyValueStore>, mode: PlayMode) -> Self {
        let wpm = Stored::load(store.as_ref(), WPM_KEY, DEFAULT_WPM);
        let state = ReaderState {
            wpm: clamp_wpm(i64::from(*wpm.get())),
            ..ReaderState::default()
        };

        Self {
            screen: Screen::Editor,
            editor: Editor::default(),
            presenter: Presenter::with_clock(clock, state),
            keys: KeyTracker::new(mode),
            store,
            wpm,
            wpm_entry: None,
            progress_area: Cell::new(None),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn wpm(&self) -> u32 {
        self.presenter.wpm()
    }

    pub fn error(&self) -> Option<String> {
        self.presenter.state().error.clone()
    }

    /// Change the rate, clamped, and remember it for the next session.
    pub fn set_wpm(&mut self, wpm: i64) -> u32 {
        let wpm = self.presenter.set_wpm(wpm);
        if *self.wpm.get() != wpm {
            self.wpm.set(self.store.as_ref(), wpm);
        }
        wpm
    }

    pub fn wpm_entry(&self) -> Option<&str> {
        self.wpm_entry.as_deref()
    }

    /// Apply a typed rate, clamped. Text that is not a number keeps the
    /// current rate.
    pub fn submit_wpm(&mut self, input: &str) -> u32 {
        match parse_wpm(input) {
            Some(wpm) => self.set_wpm(wpm),
            None => {
                debug!(input, "ignoring rate that is not a number");
                self.wpm()
            }
        }
    }

    /// Read the editor text. Blank text stays on the editor with a message.
    pub fn submit(&mut self) -> bool {
        self.presenter.dispatch(Action::ClearError);
        match prepare(self.editor.text()) {
            Ok(prepared) => {
                info!(tokens = prepared.len(), "starting reader");
                self.presenter
                    .dispatch(Action::SetText(self.editor.text().to_string()));
                self.presenter.load(prepared);
                self.screen = Screen::Reader;
                true
            }
            Err(e) => {
                self.presenter.dispatch(Action::SetError(e.to_string()));
                false
            }
        }
    }

    /// Drop the loaded reading, keeping the saved rate.
    pub fn reset_reader(&mut self) {
        self.presenter.dispatch(Action::ResetReader);
        self.presenter.set_wpm(i64::from(*self.wpm.get()));
    }

    pub fn back_to_editor(&mut self) {
        self.presenter.pause();
        self.wpm_entry = None;
        self.screen = Screen::Editor;
    }

    /// Keep the reader from showing an empty sequence.
    pub fn ensure_screen(&mut self) {
        if self.screen == Screen::Reader && self.presenter.is_empty() {
            self.screen = Screen::Editor;
        }
    }

    /// Time until the presenter's next tick, for the event loop's wait.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.presenter.next_fire_in()
    }

    /// Run a due tick, if any.
    pub fn on_timeout(&mut self) -> bool {
        self.presenter.poll()
    }

    pub fn handle_event(&mut self, event: ReaderEvent) {
        match (self.screen, event) {
            (_, ReaderEvent::Timeout) => {
                self.on_timeout();
            }
            (_, ReaderEvent::Resize) => {}
            (Screen::Editor, ReaderEvent::Key(key)) => {
                if self.keys.absorb_held_space(&key) {
                    return;
                }
                if let Some(cmd) = editor_command(key) {
                    self.handle_edit(cmd);
                }
            }
            (Screen::Editor, ReaderEvent::Paste(text)) => {
                self.editor.paste(&text);
                self.presenter.dispatch(Action::ClearError);
            }
            (Screen::Reader, ReaderEvent::Key(key))
                if self.wpm_entry.is_some() && !is_space_release(&key) =>
            {
                if let Some(cmd) = entry_command(key) {
                    self.handle_entry(cmd);
                }
            }
            (Screen::Reader, ReaderEvent::Key(key)) => {
                if let Some(cmd) = self.keys.reader_command(key) {
                    self.handle_command(cmd);
                }
            }
            (Screen::Reader, ReaderEvent::Mouse(mouse)) => self.on_mouse(mouse),
            (Screen::Reader, ReaderEvent::FocusLost) => {
                if let Some(cmd) = self.keys.focus_lost() {
                    self.handle_command(cmd);
                }
            }
            (Screen::Editor, ReaderEvent::FocusLost) => {
                // playback already stopped when the reader was left
                self.keys.focus_lost();
            }
            _ => {}
        }
        self.ensure_screen();
    }

    pub fn handle_edit(&mut self, cmd: EditCommand) {
        match cmd {
            EditCommand::Insert(c) => self.editor.insert(c),
            EditCommand::Newline => self.editor.newline(),
            EditCommand::Backspace => self.editor.backspace(),
            EditCommand::Clear => {
                self.editor.clear();
                self.reset_reader();
            }
            EditCommand::LoadSample => self.editor.load_sample(),
            EditCommand::Submit => {
                self.submit();
                return;
            }
            EditCommand::Quit => {
                self.should_quit = true;
                return;
            }
        }
        self.presenter.dispatch(Action::ClearError);
    }

    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::PlayPressed => {
                self.presenter.play();
            }
            Command::PlayReleased => {
                self.presenter.pause();
            }
            Command::TogglePlay => {
                self.presenter.toggle();
            }
            Command::StepBack => {
                self.presenter.step_back();
            }
            Command::StepForward => {
                self.presenter.step_forward();
            }
            Command::WpmUp => {
                self.set_wpm(i64::from(self.wpm()) + i64::from(WPM_STEP));
            }
            Command::WpmDown => {
                self.set_wpm(i64::from(self.wpm()) - i64::from(WPM_STEP));
            }
            Command::SeekStart => {
                self.presenter.seek(0);
            }
            Command::SeekEnd => {
                let last = self.presenter.len().saturating_sub(1);
                self.presenter.seek(last as i64);
            }
            Command::EditWpm => self.wpm_entry = Some(String::new()),
            Command::Back => self.back_to_editor(),
            Command::Quit => self.should_quit = true,
        }
    }

    pub fn handle_entry(&mut self, cmd: EntryCommand) {
        let Some(entry) = self.wpm_entry.as_mut() else {
            return;
        };
        match cmd {
            EntryCommand::Insert(c) => entry.push(c),
            EntryCommand::Backspace => {
                entry.pop();
            }
            EntryCommand::Confirm => {
                if let Some(input) = self.wpm_entry.take() {
                    self.submit_wpm(&input);
                }
            }
            EntryCommand::Cancel => self.wpm_entry = None,
        }
    }

    pub fn set_progress_area(&self, area: Rect) {
        self.progress_area.set(Some(area));
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let pressed = matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        );
        let Some(bar) = self.progress_area.get() else {
            return;
        };
        if !pressed || bar.width == 0 || mouse.row != bar.y {
            return;
        }

        let col = mouse.column.clamp(bar.x, bar.x + bar.width - 1) - bar.x;
        let ratio = if bar.width > 1 {
            f64::from(col) / f64::from(bar.width - 1)
        } else {
            0.0
        };
        let index = index_for_ratio(ratio, self.presenter.len());
        self.presenter.seek(index as i64);
    }
}

fn is_space_release(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char(' ') && key.kind == KeyEventKind::Release
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::state::Phase;
    use crate::store::MemoryStore;
    use crate::timer::ManualClock;
    use crossterm::event::KeyModifiers;
    use serde_json::json;

    fn new_app() -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let app = App::with_clock(clock.clone(), Box::new(MemoryStore::new()), PlayMode::Toggle);
        (app, clock)
    }

    fn type_text(app: &mut App<ManualClock>, text: &str) {
        app.editor.paste(text);
    }

    #[test]
    fn starts_on_editor_with_default_wpm() {
        let (app, _) = new_app();
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.wpm(), DEFAULT_WPM);
    }

    #[test]
    fn restores_saved_wpm() {
        let store = MemoryStore::new();
        store.set(WPM_KEY, json!(640)).unwrap();
        let app = App::with_clock(ManualClock::new(), Box::new(store), PlayMode::Toggle);
        assert_eq!(app.wpm(), 640);
    }

    #[test]
    fn out_of_range_saved_wpm_is_clamped() {
        let store = MemoryStore::new();
        store.set(WPM_KEY, json!(5000)).unwrap();
        let app = App::with_clock(ManualClock::new(), Box::new(store), PlayMode::Toggle);
        assert_eq!(app.wpm(), 1200);
    }

    #[test]
    fn blank_submit_shows_message() {
        let (mut app, _) = new_app();
        type_text(&mut app, "   \n ");
        assert!(!app.submit());
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.error(), Some(Error::NoText.to_string()));

        // editing clears the message
        app.handle_edit(EditCommand::Insert('x'));
        assert_eq!(app.error(), None);
    }

    #[test]
    fn submit_opens_reader() {
        let (mut app, _) = new_app();
        type_text(&mut app, "Hei, maailma!");
        assert!(app.submit());

        assert_eq!(app.screen, Screen::Reader);
        assert_eq!(app.presenter.len(), 2);
        assert_eq!(app.presenter.state().text, "Hei, maailma!");
        assert_eq!(app.error(), None);
    }

    #[test]
    fn wpm_controls_step_and_persist() {
        let (mut app, _) = new_app();
        app.handle_command(Command::WpmUp);
        assert_eq!(app.wpm(), DEFAULT_WPM + WPM_STEP);
        assert_eq!(app.store.get(WPM_KEY), Some(json!(DEFAULT_WPM + WPM_STEP)));

        assert_eq!(app.set_wpm(30), 50);
        app.handle_command(Command::WpmDown);
        assert_eq!(app.wpm(), 50);
        assert_eq!(app.store.get(WPM_KEY), Some(json!(50)));
    }

    #[test]
    fn back_pauses_and_keeps_text() {
        let (mut app, _) = new_app();
        type_text(&mut app, "one two three");
        app.submit();
        app.handle_command(Command::TogglePlay);
        assert!(app.presenter.is_playing());

        app.handle_command(Command::Back);
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.presenter.phase(), Phase::Idle);
        assert_eq!(app.editor.text(), "one two three");
    }

    #[test]
    fn empty_reader_redirects_to_editor() {
        let (mut app, _) = new_app();
        app.screen = Screen::Reader;
        app.handle_event(ReaderEvent::Resize);
        assert_eq!(app.screen, Screen::Editor);
    }

    #[test]
    fn seek_commands() {
        let (mut app, _) = new_app();
        type_text(&mut app, "a b c d");
        app.submit();

        app.handle_command(Command::SeekEnd);
        assert_eq!(app.presenter.index(), 3);
        app.handle_command(Command::SeekStart);
        assert_eq!(app.presenter.index(), 0);
    }

    #[test]
    fn clicking_the_progress_bar_seeks() {
        let (mut app, _) = new_app();
        type_text(&mut app, "a b c d e f g h i j k");
        app.submit();
        app.set_progress_area(Rect::new(10, 20, 11, 1));

        let click = |column| {
            ReaderEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row: 20,
                modifiers: KeyModifiers::NONE,
            })
        };

        app.handle_event(click(15));
        assert_eq!(app.presenter.index(), 5);
        app.handle_event(click(40));
        assert_eq!(app.presenter.index(), 10);
        app.handle_event(click(0));
        assert_eq!(app.presenter.index(), 0);
    }

    #[test]
    fn timeout_drives_playback() {
        let (mut app, clock) = new_app();
        app.set_wpm(600);
        type_text(&mut app, "a b c");
        app.submit();
        app.handle_command(Command::TogglePlay);

        assert_eq!(app.next_deadline(), Some(Duration::from_millis(100)));
        clock.advance(Duration::from_millis(100));
        app.handle_event(ReaderEvent::Timeout);
        assert_eq!(app.presenter.index(), 1);
    }

    fn hold_app() -> App<ManualClock> {
        App::with_clock(ManualClock::new(), Box::new(MemoryStore::new()), PlayMode::Hold)
    }

    fn space(kind: KeyEventKind) -> ReaderEvent {
        ReaderEvent::Key(KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind,
            state: crossterm::event::KeyEventState::NONE,
        })
    }

    fn press(code: KeyCode) -> ReaderEvent {
        ReaderEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl_r() -> ReaderEvent {
        ReaderEvent::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
    }

    #[test]
    fn space_released_on_editor_ends_the_hold() {
        let mut app = hold_app();
        type_text(&mut app, "one two three");
        app.submit();

        app.handle_event(space(KeyEventKind::Press));
        assert!(app.presenter.is_playing());
        app.handle_event(press(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.presenter.phase(), Phase::Idle);

        app.handle_event(space(KeyEventKind::Repeat));
        app.handle_event(space(KeyEventKind::Release));
        // the hold from the reader is not typed into the text
        assert_eq!(app.editor.text(), "one two three");

        app.handle_event(ctrl_r());
        assert_eq!(app.screen, Screen::Reader);
        app.handle_event(space(KeyEventKind::Press));
        assert!(app.presenter.is_playing());
    }

    #[test]
    fn focus_lost_on_editor_ends_the_hold() {
        let mut app = hold_app();
        type_text(&mut app, "one two three");
        app.submit();

        app.handle_event(space(KeyEventKind::Press));
        app.handle_event(press(KeyCode::Esc));
        app.handle_event(ReaderEvent::FocusLost);
        assert!(!app.keys.space_held());

        app.handle_event(ctrl_r());
        app.handle_event(space(KeyEventKind::Press));
        assert!(app.presenter.is_playing());

        // a fresh space on the editor still types
        app.handle_event(space(KeyEventKind::Release));
        app.handle_event(press(KeyCode::Esc));
        app.handle_event(space(KeyEventKind::Press));
        assert_eq!(app.editor.text(), "one two three ");
    }

    fn type_wpm(app: &mut App<ManualClock>, input: &str) {
        app.handle_event(press(KeyCode::Char('w')));
        assert_eq!(app.wpm_entry(), Some(""));
        for c in input.chars() {
            app.handle_event(press(KeyCode::Char(c)));
        }
        app.handle_event(press(KeyCode::Enter));
        assert_eq!(app.wpm_entry(), None);
    }

    #[test]
    fn typed_wpm_is_clamped_and_saved() {
        let (mut app, _) = new_app();
        type_text(&mut app, "a b c");
        app.submit();

        type_wpm(&mut app, "420");
        assert_eq!(app.wpm(), 420);
        assert_eq!(app.store.get(WPM_KEY), Some(json!(420)));

        type_wpm(&mut app, "9000");
        assert_eq!(app.wpm(), 1200);
        type_wpm(&mut app, "");
        assert_eq!(app.wpm(), 50);
    }

    #[test]
    fn non_numeric_wpm_keeps_the_rate() {
        let (mut app, _) = new_app();
        type_text(&mut app, "a b c");
        app.submit();

        type_wpm(&mut app, "fast");
        assert_eq!(app.wpm(), DEFAULT_WPM);
        assert_eq!(app.store.get(WPM_KEY), None);
        assert_eq!(app.submit_wpm("12x"), DEFAULT_WPM);
    }

    #[test]
    fn wpm_prompt_captures_keys_until_closed() {
        let (mut app, _) = new_app();
        type_text(&mut app, "a b c");
        app.submit();

        app.handle_event(press(KeyCode::Char('w')));
        app.handle_event(press(KeyCode::Char(' ')));
        app.handle_event(press(KeyCode::Char('q')));
        app.handle_event(press(KeyCode::Char('5')));
        app.handle_event(press(KeyCode::Backspace));
        assert!(!app.presenter.is_playing());
        assert!(!app.should_quit());
        assert_eq!(app.wpm_entry(), Some(" q"));

        app.handle_event(press(KeyCode::Esc));
        assert_eq!(app.wpm_entry(), None);
        assert_eq!(app.screen, Screen::Reader);
        assert_eq!(app.wpm(), DEFAULT_WPM);
    }

    #[test]
    fn clearing_the_editor_resets_the_reader() {
        let (mut app, _) = new_app();
        app.set_wpm(420);
        type_text(&mut app, "one two");
        app.submit();
        app.handle_command(Command::StepForward);
        app.handle_command(Command::Back);

        app.handle_edit(EditCommand::Clear);
        assert!(app.presenter.is_empty());
        assert_eq!(app.presenter.index(), 0);
        assert_eq!(app.presenter.state().text, "");
        assert_eq!(app.wpm(), 420);
    }

    #[test]
    fn quit_from_either_screen() {
        let (mut app, _) = new_app();
        app.handle_edit(EditCommand::Quit);
        assert!(app.should_quit());

        let (mut app, _) = new_app();
        type_text(&mut app, "word");
        app.submit();
        app.handle_command(Command::Quit);
        assert!(app.should_quit());
    }
}
