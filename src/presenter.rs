//! Playback driver: binds a [`ReaderState`] to a [`DriftTimer`].
//!
//! The state lives in a single shared slot that both the driver and the
//! timer's callbacks read at call time, so the timer always sees the current
//! position and rate without being rebuilt. While playing, only the tick
//! callback advances the index; every manual control first takes the state
//! out of `Playing`, which also cancels the timer.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::progress::progress_percent;
use crate::render_model::RenderModel;
use crate::state::{wpm_interval, Action, Phase, Prepared, ReaderState};
use crate::timer::{Clock, DriftTimer, SystemClock};

pub struct Presenter<C: Clock = SystemClock> {
    state: Rc<RefCell<ReaderState>>,
    timer: DriftTimer<C>,
}

impl Presenter<SystemClock> {
    pub fn new(state: ReaderState) -> Self {
        Self::with_clock(SystemClock, state)
    }
}

impl<C: Clock> Presenter<C> {
    pub fn with_clock(clock: C, state: ReaderState) -> Self {
        let state = Rc::new(RefCell::new(state));

        let tick_state = Rc::clone(&state);
        let rate_state = Rc::clone(&state);
        let timer = DriftTimer::new(
            clock,
            move || {
                let mut state = tick_state.borrow_mut();
                state.apply(Action::Tick);
                state.phase == Phase::Playing
            },
            move || wpm_interval(rate_state.borrow().wpm),
        );

        Self { state, timer }
    }

    /// Apply `action` and start or cancel the timer to match the new phase.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let changed = self.state.borrow_mut().apply(action);
        self.sync_timer();
        changed
    }

    fn sync_timer(&mut self) {
        let playing = self.phase() == Phase::Playing;
        if playing && !self.timer.is_running() {
            self.timer.start();
        } else if !playing {
            self.timer.stop();
        }
    }

    pub fn load(&mut self, prepared: Prepared) -> bool {
        self.dispatch(Action::PrepareReading(prepared))
    }

    pub fn play(&mut self) -> bool {
        self.dispatch(Action::Play)
    }

    pub fn pause(&mut self) -> bool {
        self.dispatch(Action::Pause)
    }

    pub fn toggle(&mut self) -> bool {
        match self.phase() {
            Phase::Playing => self.pause(),
            _ => self.play(),
        }
    }

    pub fn step_forward(&mut self) -> bool {
        self.dispatch(Action::StepForward)
    }

    pub fn step_back(&mut self) -> bool {
        self.dispatch(Action::StepBack)
    }

    pub fn seek(&mut self, index: i64) -> bool {
        self.dispatch(Action::Seek(index))
    }

    /// Set the rate, clamped. A running timer uses it from the next tick on.
    pub fn set_wpm(&mut self, wpm: i64) -> u32 {
        self.dispatch(Action::SetWpm(wpm));
        self.wpm()
    }

    /// Fire the timer if a tick is due. Returns `true` when a tick ran.
    pub fn poll(&mut self) -> bool {
        self.timer.poll()
    }

    /// Delay until the next tick, or `None` when not playing.
    pub fn next_fire_in(&self) -> Option<Duration> {
        self.timer.next_fire_in()
    }

    pub fn state(&self) -> Ref<'_, ReaderState> {
        self.state.borrow()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn index(&self) -> usize {
        self.state.borrow().index
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn wpm(&self) -> u32 {
        self.state.borrow().wpm
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == Phase::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.phase() == Phase::Finished
    }

    pub fn current_model(&self) -> Option<RenderModel> {
        self.state.borrow().current_model().cloned()
    }

    pub fn progress(&self) -> f64 {
        progress_percent(self.index(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::prepare;
    use crate::timer::ManualClock;

    fn presenter(text: &str, wpm: i64) -> (Presenter<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut p = Presenter::with_clock(clock.clone(), ReaderState::default());
        p.load(prepare(text).unwrap());
        p.set_wpm(wpm);
        (p, clock)
    }

    fn run_for(p: &mut Presenter<ManualClock>, clock: &ManualClock, total: Duration) {
        let step = Duration::from_millis(1);
        let mut spent = Duration::ZERO;
        while spent < total {
            clock.advance(step);
            spent += step;
            while p.poll() {}
        }
    }

    #[test]
    fn plays_through_to_finished() {
        // 600 wpm = 100ms per word
        let (mut p, clock) = presenter("one two three", 600);

        assert!(p.play());
        assert!(p.is_playing());
        assert_eq!(p.next_fire_in(), Some(Duration::from_millis(100)));

        run_for(&mut p, &clock, Duration::from_millis(100));
        assert_eq!(p.index(), 1);
        run_for(&mut p, &clock, Duration::from_millis(100));
        assert_eq!(p.index(), 2);

        run_for(&mut p, &clock, Duration::from_millis(100));
        assert_eq!(p.index(), 2);
        assert!(p.is_finished());
        assert_eq!(p.next_fire_in(), None);

        run_for(&mut p, &clock, Duration::from_millis(500));
        assert_eq!(p.index(), 2);
    }

    #[test]
    fn play_is_noop_when_finished() {
        let (mut p, _clock) = presenter("only", 600);
        p.step_forward();
        assert!(p.is_finished());

        assert!(!p.play());
        assert!(p.is_finished());
        assert_eq!(p.next_fire_in(), None);
    }

    #[test]
    fn pause_stops_the_timer() {
        let (mut p, clock) = presenter("a b c d", 600);
        p.play();
        run_for(&mut p, &clock, Duration::from_millis(100));
        assert!(p.pause());
        assert_eq!(p.phase(), Phase::Idle);

        run_for(&mut p, &clock, Duration::from_millis(500));
        assert_eq!(p.index(), 1);
    }

    #[test]
    fn toggle_flips_between_idle_and_playing() {
        let (mut p, _clock) = presenter("a b", 600);
        p.toggle();
        assert!(p.is_playing());
        p.toggle();
        assert_eq!(p.phase(), Phase::Idle);
    }

    #[test]
    fn wpm_change_applies_on_next_tick() {
        let (mut p, clock) = presenter("a b c d e f", 600);
        p.play();
        run_for(&mut p, &clock, Duration::from_millis(100));
        assert_eq!(p.index(), 1);

        // 300 wpm = 200ms, applies after the tick already scheduled at 200ms
        assert_eq!(p.set_wpm(300), 300);
        assert!(p.is_playing());
        run_for(&mut p, &clock, Duration::from_millis(100));
        assert_eq!(p.index(), 2);

        run_for(&mut p, &clock, Duration::from_millis(199));
        assert_eq!(p.index(), 2);
        run_for(&mut p, &clock, Duration::from_millis(1));
        assert_eq!(p.index(), 3);
    }

    #[test]
    fn seek_while_playing_stops_playback() {
        let (mut p, clock) = presenter("a b c d e", 600);
        p.play();
        run_for(&mut p, &clock, Duration::from_millis(100));

        p.seek(4);
        assert_eq!((p.index(), p.phase()), (4, Phase::Idle));
        assert_eq!(p.next_fire_in(), None);

        run_for(&mut p, &clock, Duration::from_millis(300));
        assert_eq!(p.index(), 4);
    }

    #[test]
    fn step_while_playing_stops_then_steps() {
        let (mut p, _clock) = presenter("a b c", 600);
        p.play();
        p.step_forward();
        assert_eq!((p.index(), p.phase()), (1, Phase::Idle));
        assert_eq!(p.next_fire_in(), None);
    }

    #[test]
    fn step_back_from_finished_resumes_idle() {
        let (mut p, clock) = presenter("a b", 600);
        p.play();
        run_for(&mut p, &clock, Duration::from_millis(300));
        assert!(p.is_finished());
        assert_eq!(p.index(), 1);

        p.step_back();
        assert_eq!((p.index(), p.phase()), (0, Phase::Idle));

        // playable again
        assert!(p.play());
    }

    #[test]
    fn load_replaces_sequence_and_stops() {
        let (mut p, clock) = presenter("a b c", 600);
        p.play();
        run_for(&mut p, &clock, Duration::from_millis(100));

        p.load(prepare("Hei, maailma!").unwrap());
        assert_eq!(p.index(), 0);
        assert_eq!(p.len(), 2);
        assert_eq!(p.phase(), Phase::Idle);
        assert_eq!(p.next_fire_in(), None);
        assert_eq!(
            p.current_model(),
            Some(RenderModel::new("H", "e", "i,"))
        );
    }

    #[test]
    fn progress_follows_index() {
        let (mut p, _clock) = presenter("a b c d e", 600);
        assert_eq!(p.progress(), 0.0);
        p.seek(2);
        assert_eq!(p.progress(), 50.0);
        p.seek(4);
        assert_eq!(p.progress(), 100.0);
    }

    #[test]
    fn empty_presenter_never_plays() {
        let clock = ManualClock::new();
        let mut p = Presenter::with_clock(clock, ReaderState::default());
        assert!(!p.play());
        assert!(!p.step_forward());
        assert_eq!(p.current_model(), None);
        assert_eq!(p.next_fire_in(), None);
    }
}
