// Playback driver
// Runs a Player on a tokio task: commands in, frame events out, one pending tick at a time

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::session::{FrameSource, PlaybackError, PlaybackStatus, Player, TickOutcome, TickToken};
use crate::highlight::{HighlightOf, Project};
use crate::trace::FrameKind;

/// Transport commands accepted by the driver task
#[derive(Debug)]
pub enum PlaybackCommand<S> {
    Play,
    Pause,
    Resume,
    Reset,
    SetSpeed(i64),

    /// Replace the source, cancelling any pending tick
    Load(S),

    Shutdown,
}

/// What the view hears from a running driver
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case", bound = "")]
pub enum PlaybackEvent<F: Project> {
    /// A new frame is on screen
    Advanced {
        cursor: usize,
        label: &'static str,
        highlight: HighlightOf<F>,
    },

    StatusChanged {
        status: PlaybackStatus,
        cursor: usize,
    },

    /// The terminal frame was shown
    Completed { cursor: usize },
}

/// Handle to a player running on its own task. Dropping it cancels playback.
#[derive(Debug)]
pub struct PlaybackDriver<S: FrameSource> {
    commands: UnboundedSender<PlaybackCommand<S>>,
    task: JoinHandle<Player<S>>,
}

impl<S> PlaybackDriver<S>
where
    S: FrameSource + Send + 'static,
    S::Family: Project,
{
    /// Move `player` onto a new task. Must be called inside a tokio runtime.
    pub fn spawn(player: Player<S>) -> (Self, UnboundedReceiver<PlaybackEvent<S::Family>>) {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (events, outbox) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(player, inbox, events));

        (PlaybackDriver { commands, task }, outbox)
    }

    pub fn play(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Play)
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Resume)
    }

    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Reset)
    }

    pub fn set_speed(&self, speed: i64) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::SetSpeed(speed))
    }

    pub fn load(&self, source: S) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Load(source))
    }

    /// Stop the task and hand the player back
    pub async fn shutdown(self) -> Option<Player<S>> {
        let _ = self.commands.send(PlaybackCommand::Shutdown);
        self.task.await.ok()
    }

    fn send(&self, command: PlaybackCommand<S>) -> Result<(), PlaybackError> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::NoSession)
    }
}

/// Driver loop: exactly one deadline armed at a time
async fn run<S>(
    mut player: Player<S>,
    mut commands: UnboundedReceiver<PlaybackCommand<S>>,
    events: UnboundedSender<PlaybackEvent<S::Family>>,
) -> Player<S>
where
    S: FrameSource,
    S::Family: Project,
{
    let mut deadline: Option<(TickToken, Instant)> = None;

    loop {
        let wake = deadline.map(|(_, at)| at);
        let timer = async move {
            match wake {
                Some(at) => sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    log::debug!("Playback handle dropped, stopping driver");
                    break;
                };
                let before = player.status();

                match command {
                    PlaybackCommand::Play | PlaybackCommand::Resume => {
                        if let Some(scheduled) = player.play() {
                            deadline = Some((scheduled.token, Instant::now() + scheduled.delay));
                        }
                    }
                    PlaybackCommand::Pause => {
                        player.pause();
                        deadline = None;
                    }
                    PlaybackCommand::Reset => {
                        player.reset();
                        deadline = None;
                    }
                    PlaybackCommand::SetSpeed(speed) => {
                        player.set_speed(speed);
                    }
                    PlaybackCommand::Load(source) => {
                        player.load(source);
                        deadline = None;
                    }
                    PlaybackCommand::Shutdown => break,
                }

                if player.status() != before {
                    let _ = events.send(PlaybackEvent::StatusChanged {
                        status: player.status(),
                        cursor: player.cursor(),
                    });
                }
            }
            _ = timer => {
                let Some((token, _)) = deadline.take() else {
                    continue;
                };

                let outcome = player.tick(token);
                if outcome == TickOutcome::Stale {
                    continue;
                }

                if let Some(frame) = player.current_frame() {
                    let _ = events.send(PlaybackEvent::Advanced {
                        cursor: player.cursor(),
                        label: frame.kind.label(),
                        highlight: player.highlight(),
                    });
                }

                match outcome {
                    TickOutcome::Advanced(scheduled) => {
                        deadline = Some((scheduled.token, Instant::now() + scheduled.delay));
                    }
                    TickOutcome::Completed => {
                        let _ = events.send(PlaybackEvent::Completed {
                            cursor: player.cursor(),
                        });
                        let _ = events.send(PlaybackEvent::StatusChanged {
                            status: player.status(),
                            cursor: player.cursor(),
                        });
                    }
                    TickOutcome::Stale => {}
                }
            }
        }
    }

    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Highlight;
    use crate::player::{Speed, TraceSource};
    use crate::trace::builder::tests::{counting_trace, Counting};
    use crate::trace::Frame;
    use std::time::Duration;

    impl Project for Counting {
        fn project(frame: &Frame<Self>, _previous: Option<&Frame<Self>>) -> HighlightOf<Self> {
            Highlight {
                active: frame.subjects(),
                ..Default::default()
            }
        }
    }

    fn spawn(
        steps: usize,
        speed: i64,
    ) -> (
        PlaybackDriver<TraceSource<Counting>>,
        UnboundedReceiver<PlaybackEvent<Counting>>,
    ) {
        PlaybackDriver::spawn(Player::for_trace(counting_trace(steps), Speed::new(speed)))
    }

    fn drain(events: &mut UnboundedReceiver<PlaybackEvent<Counting>>) -> Vec<PlaybackEvent<Counting>> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn advanced_cursors(events: &[PlaybackEvent<Counting>]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::Advanced { cursor, .. } => Some(*cursor),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_completion_at_speed() {
        let (driver, mut events) = spawn(2, 100);
        let started = Instant::now();
        driver.play().unwrap();

        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            let done = matches!(event, PlaybackEvent::Completed { .. });
            seen.push(event);
            if done {
                break;
            }
        }

        assert_eq!(advanced_cursors(&seen), vec![1, 2, 3]);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(
            seen[0],
            PlaybackEvent::StatusChanged {
                status: PlaybackStatus::Playing,
                cursor: 0
            }
        );

        let player = driver.shutdown().await.unwrap();
        assert_eq!(player.status(), PlaybackStatus::Completed);
        assert_eq!(player.cursor(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticks() {
        let (driver, mut events) = spawn(5, 50);
        driver.play().unwrap();

        loop {
            if let Some(PlaybackEvent::Advanced { .. }) = events.recv().await {
                break;
            }
        }
        driver.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let after = drain(&mut events);
        assert!(advanced_cursors(&after).is_empty());
        assert!(after.contains(&PlaybackEvent::StatusChanged {
            status: PlaybackStatus::Paused,
            cursor: 1
        }));

        driver.resume().unwrap();
        tokio::time::sleep(Duration::from_millis(560)).await;
        assert_eq!(advanced_cursors(&drain(&mut events)), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_cancels_pending_tick() {
        let (driver, mut events) = spawn(5, 100);
        driver.play().unwrap();
        loop {
            if let Some(PlaybackEvent::Advanced { .. }) = events.recv().await {
                break;
            }
        }

        driver.load(TraceSource::new(counting_trace(0))).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        let after = drain(&mut events);
        assert!(advanced_cursors(&after).is_empty());
        assert!(after.contains(&PlaybackEvent::StatusChanged {
            status: PlaybackStatus::Idle,
            cursor: 0
        }));

        driver.play().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let replay = drain(&mut events);
        assert_eq!(advanced_cursors(&replay), vec![1]);
        assert!(replay.contains(&PlaybackEvent::Completed { cursor: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let (driver, mut events) = spawn(50, 1);
        driver.play().unwrap();
        drop(driver);

        // Channel closes once the task exits; at most the Playing status precedes it
        let mut remaining = Vec::new();
        while let Some(event) = events.recv().await {
            remaining.push(event);
        }
        assert!(advanced_cursors(&remaining).is_empty());
    }
}
