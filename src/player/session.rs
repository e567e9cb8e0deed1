// Playback session
// Cursor, status and generation-counted tick tokens over any frame source

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::speed::Speed;
use crate::highlight::{project, HighlightOf, Project};
use crate::trace::{Family, Frame, Trace};

/// Anything a player can pull frames from, one at a time
pub trait FrameSource {
    type Family: Family;

    /// Produce the next frame, `None` once the terminal frame was produced
    fn next_frame(&mut self) -> Option<Frame<Self::Family>>;

    /// Go back to the first frame
    fn rewind(&mut self);

    /// Total number of frames when known up front
    fn len_hint(&self) -> Option<usize>;
}

/// Replays a pre-recorded trace
#[derive(Debug, Clone)]
pub struct TraceSource<F: Family> {
    trace: Trace<F>,
    next: usize,
}

impl<F: Family> TraceSource<F> {
    pub fn new(trace: Trace<F>) -> Self {
        TraceSource { trace, next: 0 }
    }

    pub fn trace(&self) -> &Trace<F> {
        &self.trace
    }
}

impl<F: Family> From<Trace<F>> for TraceSource<F> {
    fn from(trace: Trace<F>) -> Self {
        TraceSource::new(trace)
    }
}

impl<F: Family> FrameSource for TraceSource<F> {
    type Family = F;

    fn next_frame(&mut self) -> Option<Frame<F>> {
        let frame = self.trace.get(self.next).cloned()?;
        self.next += 1;
        Some(frame)
    }

    fn rewind(&mut self) {
        self.next = 0;
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.trace.len())
    }
}

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Transport misuse reported to callers that ask for strict checking
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Cannot {action} while {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: PlaybackStatus,
    },

    #[error("Speed cannot change while playing")]
    SpeedLocked,

    #[error("No playback session is loaded")]
    NoSession,
}

/// Handle for one scheduled tick. Only the most recently issued token is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickToken {
    generation: u64,
}

/// A tick the caller must deliver after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub token: TickToken,
    pub delay: Duration,
}

/// What a delivered tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cursor advanced; deliver the next tick as scheduled
    Advanced(Scheduled),

    /// Cursor reached the end of the source
    Completed,

    /// Token was cancelled or superseded; nothing changed
    Stale,
}

/// Serializable view of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub cursor: usize,
    pub status: PlaybackStatus,
    pub speed: Speed,
    pub len: Option<usize>,
}

/// Single-threaded transport over a frame source.
///
/// `cursor` counts frames consumed; the frame on screen is `cursor - 1`. The
/// player never sleeps itself: `play`/`resume` and each live tick return the
/// next `Scheduled` tick, which the caller delivers back through `tick`.
#[derive(Debug)]
pub struct Player<S: FrameSource> {
    source: S,
    cursor: usize,
    status: PlaybackStatus,
    speed: Speed,
    generation: u64,
    pending: Option<TickToken>,
    current: Option<Frame<S::Family>>,
    previous: Option<Frame<S::Family>>,
}

impl<S: FrameSource> Player<S> {
    /// Fresh session: cursor 0, Idle
    pub fn new(source: S, speed: Speed) -> Self {
        Player {
            source,
            cursor: 0,
            status: PlaybackStatus::Idle,
            speed,
            generation: 0,
            pending: None,
            current: None,
            previous: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Frame currently on screen, `None` before the first tick
    pub fn current_frame(&self) -> Option<&Frame<S::Family>> {
        self.current.as_ref()
    }

    /// Token of the tick currently awaited, if any
    pub fn pending(&self) -> Option<TickToken> {
        self.pending
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            cursor: self.cursor,
            status: self.status,
            speed: self.speed,
            len: self.source.len_hint(),
        }
    }

    /// Start or continue playback. Returns the tick to schedule, or `None`
    /// when already playing or completed.
    pub fn play(&mut self) -> Option<Scheduled> {
        match self.status {
            PlaybackStatus::Idle | PlaybackStatus::Paused => {
                log::debug!("Playback {:?} -> Playing at cursor {}", self.status, self.cursor);
                self.status = PlaybackStatus::Playing;
                Some(self.schedule())
            }
            PlaybackStatus::Playing | PlaybackStatus::Completed => None,
        }
    }

    /// Same transition as `play`; kept as its own verb for the transport controls
    pub fn resume(&mut self) -> Option<Scheduled> {
        self.play()
    }

    /// Stop at the current cursor and cancel the pending tick. Idempotent.
    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.cancel();
            self.status = PlaybackStatus::Paused;
            log::debug!("Playback paused at cursor {}", self.cursor);
        }
    }

    /// Back to a fresh Idle session on the same source. Allowed from any state.
    pub fn reset(&mut self) {
        self.cancel();
        self.source.rewind();
        self.cursor = 0;
        self.status = PlaybackStatus::Idle;
        self.current = None;
        self.previous = None;
        log::debug!("Playback reset");
    }

    /// Swap in a new source, cancelling whatever was in flight
    pub fn load(&mut self, source: S) -> S {
        self.cancel();
        let old = std::mem::replace(&mut self.source, source);
        self.reset();
        old
    }

    /// Give the source back, invalidating any pending tick
    pub fn into_source(mut self) -> S {
        self.cancel();
        self.source
    }

    /// Change speed. Ignored (returns false) while playing; takes effect on the
    /// next `play`/`resume`.
    pub fn set_speed(&mut self, value: i64) -> bool {
        if self.status == PlaybackStatus::Playing {
            log::warn!("Ignoring speed change to {} while playing", value);
            return false;
        }
        self.speed = Speed::new(value);
        true
    }

    /// Strict variant of `set_speed` for callers that surface the refusal
    pub fn try_set_speed(&mut self, value: i64) -> Result<Speed, PlaybackError> {
        if self.set_speed(value) {
            Ok(self.speed)
        } else {
            Err(PlaybackError::SpeedLocked)
        }
    }

    /// Deliver a scheduled tick
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if self.status != PlaybackStatus::Playing || self.pending != Some(token) {
            log::warn!("Dropping stale tick {:?}", token);
            return TickOutcome::Stale;
        }
        self.pending = None;

        let Some(frame) = self.source.next_frame() else {
            self.complete();
            return TickOutcome::Completed;
        };

        self.cursor += 1;
        let terminal = frame.is_terminal();
        self.previous = self.current.replace(frame);
        log::debug!("Tick advanced cursor to {}", self.cursor);

        if terminal {
            self.complete();
            TickOutcome::Completed
        } else {
            TickOutcome::Advanced(self.schedule())
        }
    }

    /// Advance immediately, ignoring the timer. Used by hosts that step manually.
    pub fn step(&mut self) -> TickOutcome {
        match self.status {
            PlaybackStatus::Playing => match self.pending {
                Some(token) => self.tick(token),
                None => TickOutcome::Stale,
            },
            PlaybackStatus::Idle | PlaybackStatus::Paused => {
                let previous = self.status;
                self.play();
                let outcome = match self.pending {
                    Some(token) => self.tick(token),
                    None => TickOutcome::Stale,
                };
                if outcome != TickOutcome::Completed {
                    self.cancel();
                    self.status = previous.after_manual_step();
                }
                outcome
            }
            PlaybackStatus::Completed => TickOutcome::Stale,
        }
    }

    fn schedule(&mut self) -> Scheduled {
        self.generation += 1;
        let token = TickToken {
            generation: self.generation,
        };
        self.pending = Some(token);
        Scheduled {
            token,
            delay: self.speed.delay(),
        }
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }

    fn complete(&mut self) {
        self.cancel();
        self.status = PlaybackStatus::Completed;
        log::info!("Playback completed after {} frames", self.cursor);
    }
}

impl<S> Player<S>
where
    S: FrameSource,
    S::Family: Project,
{
    /// Render hints for the frame on screen (empty before the first tick)
    pub fn highlight(&self) -> HighlightOf<S::Family> {
        match &self.current {
            Some(frame) => project(frame, self.previous.as_ref()),
            None => Default::default(),
        }
    }
}

impl<F: Family> Player<TraceSource<F>> {
    /// Session over a recorded trace
    pub fn for_trace(trace: Trace<F>, speed: Speed) -> Self {
        Player::new(TraceSource::new(trace), speed)
    }

    pub fn trace(&self) -> &Trace<F> {
        self.source.trace()
    }
}

impl PlaybackStatus {
    /// Manual stepping leaves a session paused rather than idle once it moved
    fn after_manual_step(self) -> Self {
        match self {
            PlaybackStatus::Idle => PlaybackStatus::Paused,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::builder::tests::{counting_trace, Counting, Tick};
    use proptest::prelude::*;

    fn player(steps: usize) -> Player<TraceSource<Counting>> {
        Player::for_trace(counting_trace(steps), Speed::new(50))
    }

    fn run_to_end(player: &mut Player<TraceSource<Counting>>) -> usize {
        let mut next = player.play();
        let mut ticks = 0;
        while let Some(scheduled) = next {
            ticks += 1;
            next = match player.tick(scheduled.token) {
                TickOutcome::Advanced(s) => Some(s),
                _ => None,
            };
        }
        ticks
    }

    #[test]
    fn test_fresh_session() {
        let p = player(2);
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.status(), PlaybackStatus::Idle);
        assert!(p.current_frame().is_none());
        assert_eq!(p.state().len, Some(3));
    }

    #[test]
    fn test_play_to_completion() {
        let mut p = player(2);
        assert_eq!(run_to_end(&mut p), 3);
        assert_eq!(p.status(), PlaybackStatus::Completed);
        assert_eq!(p.cursor(), 3);
        assert_eq!(p.current_frame().unwrap().kind, Tick::Done);
        assert!(p.pending().is_none());
    }

    #[test]
    fn test_play_schedules_with_speed_delay() {
        let mut p = Player::for_trace(counting_trace(1), Speed::new(100));
        let scheduled = p.play().unwrap();
        assert_eq!(scheduled.delay, Duration::from_millis(100));
        assert!(p.play().is_none());
    }

    #[test]
    fn test_pause_cancels_pending_tick() {
        let mut p = player(3);
        let first = p.play().unwrap();
        p.pause();
        assert_eq!(p.status(), PlaybackStatus::Paused);
        assert_eq!(p.tick(first.token), TickOutcome::Stale);
        assert_eq!(p.cursor(), 0);

        // Idempotent
        p.pause();
        assert_eq!(p.status(), PlaybackStatus::Paused);

        let resumed = p.resume().unwrap();
        assert_ne!(resumed.token, first.token);
        assert!(matches!(p.tick(resumed.token), TickOutcome::Advanced(_)));
        assert_eq!(p.cursor(), 1);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut p = player(2);
        run_to_end(&mut p);
        p.reset();
        assert_eq!(p.status(), PlaybackStatus::Idle);
        assert_eq!(p.cursor(), 0);
        assert!(p.current_frame().is_none());

        p.reset();
        assert_eq!(p.status(), PlaybackStatus::Idle);

        let scheduled = p.play().unwrap();
        p.reset();
        assert_eq!(p.tick(scheduled.token), TickOutcome::Stale);
        assert_eq!(run_to_end(&mut p), 3);
    }

    #[test]
    fn test_speed_change_ignored_while_playing() {
        let mut p = player(2);
        p.play();
        assert!(!p.set_speed(90));
        assert_eq!(p.try_set_speed(90), Err(PlaybackError::SpeedLocked));
        assert_eq!(p.speed().get(), 50);

        p.pause();
        assert!(p.set_speed(150));
        assert_eq!(p.speed().get(), 100);
        assert_eq!(p.resume().unwrap().delay, Duration::from_millis(100));
    }

    #[test]
    fn test_play_after_completion_is_noop() {
        let mut p = player(0);
        run_to_end(&mut p);
        assert!(p.play().is_none());
        assert_eq!(p.status(), PlaybackStatus::Completed);
    }

    #[test]
    fn test_load_cancels_in_flight_tick() {
        let mut p = player(4);
        let scheduled = p.play().unwrap();
        p.load(TraceSource::new(counting_trace(1)));
        assert_eq!(p.tick(scheduled.token), TickOutcome::Stale);
        assert_eq!(p.status(), PlaybackStatus::Idle);
        assert_eq!(p.state().len, Some(2));
    }

    #[test]
    fn test_manual_step_leaves_session_paused() {
        let mut p = player(2);
        assert!(matches!(p.step(), TickOutcome::Advanced(_)));
        assert_eq!(p.status(), PlaybackStatus::Paused);
        assert_eq!(p.cursor(), 1);
        assert!(p.pending().is_none());
        p.step();
        assert_eq!(p.step(), TickOutcome::Completed);
        assert_eq!(p.status(), PlaybackStatus::Completed);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Play,
        Pause,
        Tick,
        StaleTick,
        Speed(i64),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Play),
            Just(Action::Pause),
            Just(Action::Tick),
            Just(Action::Tick),
            Just(Action::StaleTick),
            (-10i64..200).prop_map(Action::Speed),
        ]
    }

    proptest! {
        #[test]
        fn prop_cursor_monotonic_and_bounded(
            steps in 0usize..12,
            actions in prop::collection::vec(action(), 0..80),
        ) {
            let mut p = player(steps);
            let len = steps + 1;
            let mut last_cursor = 0;
            let mut stale = None;

            for action in actions {
                match action {
                    Action::Play => {
                        p.play();
                    }
                    Action::Pause => p.pause(),
                    Action::Tick => {
                        if let Some(token) = p.pending() {
                            stale = Some(token);
                            p.tick(token);
                        }
                    }
                    Action::StaleTick => {
                        if let Some(token) = stale {
                            prop_assert_eq!(p.tick(token), TickOutcome::Stale);
                        }
                    }
                    Action::Speed(n) => {
                        p.set_speed(n);
                    }
                }

                prop_assert!(p.cursor() >= last_cursor);
                prop_assert!(p.cursor() <= len);
                prop_assert_eq!(p.status() == PlaybackStatus::Completed, p.cursor() == len);
                prop_assert!((1..=100).contains(&p.speed().get()));
                last_cursor = p.cursor();
            }
        }
    }
}
