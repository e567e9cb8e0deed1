// Queue mutator
// FIFO enqueue at the rear, dequeue from the front at position 0

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::source::Operation;
use super::{linear_frame, Linear, LinearStep};
use crate::input::{InputError, InputResult};
use crate::trace::Frame;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    items: VecDeque<i64>,
    capacity: usize,
}

impl Queue {
    pub fn new(capacity: usize) -> Self {
        Queue {
            items: VecDeque::new(),
            capacity,
        }
    }

    pub fn from_values(values: &[i64], capacity: usize) -> InputResult<Self> {
        if values.len() > capacity {
            return Err(InputError::Full {
                what: "Queue",
                max: capacity,
            });
        }
        Ok(Queue {
            items: values.iter().copied().collect(),
            capacity,
        })
    }

    /// Front to rear
    pub fn values(&self) -> Vec<i64> {
        self.items.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<i64> {
        self.items.front().copied()
    }

    pub fn rear(&self) -> Option<i64> {
        self.items.back().copied()
    }

    fn require_items(&self) -> InputResult<()> {
        if self.items.is_empty() {
            return Err(InputError::Empty("Queue"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueAction {
    Enqueue(i64),
    Dequeue,
    Front,
    Rear(usize),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOp {
    action: QueueAction,
    step: usize,
}

impl QueueOp {
    fn new(action: QueueAction) -> Self {
        QueueOp { action, step: 0 }
    }

    pub fn enqueue(queue: &Queue, value: i64) -> InputResult<Self> {
        if queue.len() >= queue.capacity {
            return Err(InputError::Full {
                what: "Queue",
                max: queue.capacity,
            });
        }
        Ok(QueueOp::new(QueueAction::Enqueue(value)))
    }

    pub fn dequeue(queue: &Queue) -> InputResult<Self> {
        queue.require_items()?;
        Ok(QueueOp::new(QueueAction::Dequeue))
    }

    pub fn front(queue: &Queue) -> InputResult<Self> {
        queue.require_items()?;
        Ok(QueueOp::new(QueueAction::Front))
    }

    pub fn rear(queue: &Queue) -> InputResult<Self> {
        queue.require_items()?;
        Ok(QueueOp::new(QueueAction::Rear(queue.len() - 1)))
    }

    pub fn clear() -> Self {
        QueueOp::new(QueueAction::Clear)
    }
}

impl Operation for QueueOp {
    type Target = Queue;
    type Family = Linear;

    fn advance(&mut self, queue: &mut Queue) -> Frame<Linear> {
        let step = self.step;
        self.step += 1;

        let (kind, value) = match (self.action, step) {
            (QueueAction::Enqueue(value), 0) => {
                queue.items.push_back(value);
                (LinearStep::Insert { i: queue.len() - 1 }, Some(value))
            }
            (QueueAction::Dequeue, 0) => (LinearStep::Peek { i: 0 }, queue.front()),
            (QueueAction::Dequeue, 1) => (LinearStep::Remove { i: 0 }, queue.items.pop_front()),
            (QueueAction::Front, 0) => (LinearStep::Peek { i: 0 }, queue.front()),
            (QueueAction::Front, _) => (LinearStep::Found { i: 0 }, queue.front()),
            (QueueAction::Rear(last), 0) => (LinearStep::Peek { i: last }, queue.rear()),
            (QueueAction::Rear(last), _) => (LinearStep::Found { i: last }, queue.rear()),
            (QueueAction::Clear, 0) => {
                queue.items.clear();
                (LinearStep::Clear, None)
            }
            _ => (LinearStep::Complete, None),
        };

        linear_frame(kind, queue.values(), value)
    }

    fn name(&self) -> &'static str {
        match self.action {
            QueueAction::Enqueue(_) => "enqueue",
            QueueAction::Dequeue => "dequeue",
            QueueAction::Front => "front",
            QueueAction::Rear(_) => "rear",
            QueueAction::Clear => "queue clear",
        }
    }
}
