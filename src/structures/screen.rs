// Screen
// One live structure plus at most one playback session over it

use super::source::{MutationSource, Operation};
use crate::input::InputResult;
use crate::player::{PlaybackStatus, Player, Speed};

/// Owns a structure and the session animating the current operation on it.
///
/// The structure lives inside the session while an operation plays. Starting a
/// new operation cancels the old session first and keeps whatever the user has
/// already seen applied.
#[derive(Debug)]
pub struct Screen<O: Operation> {
    structure: O::Target,
    session: Option<Player<MutationSource<O>>>,
    speed: Speed,
}

impl<O: Operation> Screen<O> {
    pub fn new(structure: O::Target, speed: Speed) -> Self {
        Screen {
            structure,
            session: None,
            speed,
        }
    }

    /// Structure as currently shown
    pub fn structure(&self) -> &O::Target {
        match &self.session {
            Some(player) => player.source().target(),
            None => &self.structure,
        }
    }

    pub fn session(&self) -> Option<&Player<MutationSource<O>>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Player<MutationSource<O>>> {
        self.session.as_mut()
    }

    /// Whether an operation is still being animated
    pub fn is_busy(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|p| p.status() != PlaybackStatus::Completed)
    }

    /// Start a new operation built against the current structure.
    ///
    /// `build` sees the structure as currently shown. If it refuses the input
    /// the previous session keeps playing untouched.
    pub fn begin<B>(&mut self, build: B) -> InputResult<&mut Player<MutationSource<O>>>
    where
        B: FnOnce(&O::Target) -> InputResult<O>,
    {
        let op = build(self.structure()).inspect_err(|e| log::warn!("Refused operation: {}", e))?;
        self.close();

        let source = MutationSource::new(self.structure.clone(), op);
        Ok(self.session.insert(Player::new(source, self.speed)))
    }

    /// Cancel the current session, keeping the structure as last shown
    pub fn close(&mut self) {
        if let Some(player) = self.session.take() {
            if player.status() == PlaybackStatus::Playing {
                log::debug!("Cancelling in-flight operation at cursor {}", player.cursor());
            }
            self.speed = player.speed();
            self.structure = player.into_source().into_target();
        }
    }

    pub fn speed(&self) -> Speed {
        self.session.as_ref().map_or(self.speed, |p| p.speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::TickOutcome;
    use crate::structures::{Array, ArrayOp, Stack, StackOp};

    fn finish<O: Operation>(player: &mut Player<MutationSource<O>>) {
        while player.step() != TickOutcome::Completed {}
    }

    #[test]
    fn test_operations_chain_on_live_structure() {
        let array = Array::from_values(vec![1, 2], 8).unwrap();
        let mut screen: Screen<ArrayOp> = Screen::new(array, Speed::default());

        let player = screen.begin(|a| ArrayOp::insert_at(a, 2, 3)).unwrap();
        finish(player);
        assert_eq!(screen.structure().values(), &[1, 2, 3]);

        let player = screen.begin(|a| ArrayOp::remove_at(a, 0)).unwrap();
        finish(player);
        assert_eq!(screen.structure().values(), &[2, 3]);
        assert!(!screen.is_busy());
    }

    #[test]
    fn test_begin_cancels_in_flight_operation() {
        let array = Array::from_values(vec![1, 2, 3], 8).unwrap();
        let mut screen: Screen<ArrayOp> = Screen::new(array, Speed::new(90));

        let player = screen.begin(|a| ArrayOp::insert_at(a, 3, 4)).unwrap();
        let scheduled = player.play().unwrap();
        assert!(matches!(player.tick(scheduled.token), TickOutcome::Advanced(_)));
        assert!(screen.is_busy());

        // Insert was never shown, so it is never applied
        let player = screen.begin(|a| ArrayOp::remove_at(a, 0)).unwrap();
        assert_eq!(player.cursor(), 0);
        assert_eq!(player.status(), PlaybackStatus::Idle);
        finish(player);
        assert_eq!(screen.structure().values(), &[2, 3]);
        assert_eq!(screen.speed(), Speed::new(90));
    }

    #[test]
    fn test_refused_operation_on_idle_screen() {
        let mut screen: Screen<StackOp> = Screen::new(Stack::new(4), Speed::default());
        assert!(screen.begin(StackOp::pop).is_err());
        assert!(screen.session().is_none());
        assert!(screen.structure().is_empty());
    }

    #[test]
    fn test_refused_operation_keeps_in_flight_session() {
        let array = Array::from_values(vec![1, 2, 3], 8).unwrap();
        let mut screen: Screen<ArrayOp> = Screen::new(array, Speed::new(90));

        let player = screen.begin(|a| ArrayOp::insert_at(a, 3, 4)).unwrap();
        let scheduled = player.play().unwrap();
        assert!(matches!(player.tick(scheduled.token), TickOutcome::Advanced(_)));
        let cursor = player.cursor();

        assert!(screen.begin(|a| ArrayOp::remove_at(a, 7)).is_err());

        let player = screen.session_mut().unwrap();
        assert_eq!(player.status(), PlaybackStatus::Playing);
        assert_eq!(player.cursor(), cursor);
        finish(player);
        assert_eq!(screen.structure().values(), &[1, 2, 3, 4]);
    }
}
