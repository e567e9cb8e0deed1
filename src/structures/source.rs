// Lazy mutation source
// Feeds a Player frames synthesized on demand while applying each mutation in step with its frame

use crate::player::FrameSource;
use crate::trace::{Family, Frame};

/// One user-requested operation against a live structure.
///
/// `advance` is called once per frame. It must apply a structural change only in
/// the call that returns the frame showing it, and must end with a terminal frame.
pub trait Operation: Clone {
    type Target: Clone;
    type Family: Family;

    fn advance(&mut self, target: &mut Self::Target) -> Frame<Self::Family>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Frame source that owns the structure while its operation plays.
///
/// Rewinding restores the structure as it was when the operation started, so a
/// reset session never shows a change the user has not watched happen.
#[derive(Debug, Clone)]
pub struct MutationSource<O: Operation> {
    origin: O::Target,
    live: O::Target,
    plan: O,
    op: O,
    produced: usize,
    done: bool,
}

impl<O: Operation> MutationSource<O> {
    pub fn new(target: O::Target, op: O) -> Self {
        log::debug!("Starting {} operation", op.name());
        MutationSource {
            origin: target.clone(),
            live: target,
            plan: op.clone(),
            op,
            produced: 0,
            done: false,
        }
    }

    /// Structure as of the last frame produced
    pub fn target(&self) -> &O::Target {
        &self.live
    }

    pub fn into_target(self) -> O::Target {
        self.live
    }

    /// Frames produced since the last rewind
    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<O: Operation> FrameSource for MutationSource<O> {
    type Family = O::Family;

    fn next_frame(&mut self) -> Option<Frame<O::Family>> {
        if self.done {
            return None;
        }

        let frame = self.op.advance(&mut self.live);
        self.produced += 1;
        if frame.is_terminal() {
            self.done = true;
            log::info!("{} operation finished after {} frames", self.op.name(), self.produced);
        }
        Some(frame)
    }

    fn rewind(&mut self) {
        self.live = self.origin.clone();
        self.op = self.plan.clone();
        self.produced = 0;
        self.done = false;
    }

    /// Unknown: frames are synthesized one at a time
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{PlaybackStatus, Player, Speed, TickOutcome};
    use crate::structures::{Array, ArrayOp};

    #[test]
    fn test_mutation_applies_with_its_frame() {
        let array = Array::from_values(vec![1, 2, 3], 8).unwrap();
        let op = ArrayOp::insert_at(&array, 2, 9).unwrap();
        let mut source = MutationSource::new(array, op);

        // Two probes, nothing changed yet
        source.next_frame().unwrap();
        source.next_frame().unwrap();
        assert_eq!(source.target().values(), &[1, 2, 3]);

        let insert = source.next_frame().unwrap();
        assert_eq!(insert.snapshot, vec![1, 2, 9, 3]);
        assert_eq!(source.target().values(), &[1, 2, 9, 3]);

        assert!(source.next_frame().unwrap().is_terminal());
        assert!(source.next_frame().is_none());
        assert!(source.is_done());
    }

    #[test]
    fn test_rewind_restores_origin() {
        let array = Array::from_values(vec![4, 5], 8).unwrap();
        let op = ArrayOp::remove_at(&array, 0).unwrap();
        let mut source = MutationSource::new(array, op);

        while source.next_frame().is_some() {}
        assert_eq!(source.target().values(), &[5]);

        source.rewind();
        assert_eq!(source.target().values(), &[4, 5]);
        assert_eq!(source.produced(), 0);
        assert!(source.next_frame().is_some());
    }

    #[test]
    fn test_paused_player_never_shows_unseen_mutation() {
        let array = Array::from_values(vec![1, 2, 3], 8).unwrap();
        let op = ArrayOp::insert_at(&array, 1, 7).unwrap();
        let mut player = Player::new(MutationSource::new(array, op), Speed::new(80));

        let scheduled = player.play().unwrap();
        assert!(matches!(player.tick(scheduled.token), TickOutcome::Advanced(_)));
        player.pause();

        assert_eq!(player.status(), PlaybackStatus::Paused);
        assert_eq!(player.source().target().values(), &[1, 2, 3]);
        assert_eq!(player.state().len, None);
    }
}
