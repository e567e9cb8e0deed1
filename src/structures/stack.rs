// Stack mutator
// LIFO push/pop/peek; the top of the stack is the last position in snapshots

use serde::{Deserialize, Serialize};

use super::source::Operation;
use super::{linear_frame, Linear, LinearStep};
use crate::input::{InputError, InputResult};
use crate::trace::Frame;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    items: Vec<i64>,
    capacity: usize,
}

impl Stack {
    pub fn new(capacity: usize) -> Self {
        Stack {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn from_values(values: &[i64], capacity: usize) -> InputResult<Self> {
        if values.len() > capacity {
            return Err(InputError::Full {
                what: "Stack",
                max: capacity,
            });
        }
        Ok(Stack {
            items: values.to_vec(),
            capacity,
        })
    }

    /// Bottom to top
    pub fn values(&self) -> &[i64] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn top(&self) -> Option<i64> {
        self.items.last().copied()
    }

    fn top_index(&self) -> InputResult<usize> {
        self.items
            .len()
            .checked_sub(1)
            .ok_or(InputError::Empty("Stack"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackAction {
    Push(i64),
    Pop(usize),
    Peek(usize),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOp {
    action: StackAction,
    step: usize,
}

impl StackOp {
    fn new(action: StackAction) -> Self {
        StackOp { action, step: 0 }
    }

    pub fn push(stack: &Stack, value: i64) -> InputResult<Self> {
        if stack.len() >= stack.capacity {
            return Err(InputError::Full {
                what: "Stack",
                max: stack.capacity,
            });
        }
        Ok(StackOp::new(StackAction::Push(value)))
    }

    pub fn pop(stack: &Stack) -> InputResult<Self> {
        Ok(StackOp::new(StackAction::Pop(stack.top_index()?)))
    }

    pub fn peek(stack: &Stack) -> InputResult<Self> {
        Ok(StackOp::new(StackAction::Peek(stack.top_index()?)))
    }

    pub fn clear() -> Self {
        StackOp::new(StackAction::Clear)
    }
}

impl Operation for StackOp {
    type Target = Stack;
    type Family = Linear;

    fn advance(&mut self, stack: &mut Stack) -> Frame<Linear> {
        let step = self.step;
        self.step += 1;

        let (kind, value) = match (self.action, step) {
            (StackAction::Push(value), 0) => {
                stack.items.push(value);
                (LinearStep::Insert { i: stack.len() - 1 }, Some(value))
            }
            (StackAction::Pop(top), 0) => (LinearStep::Peek { i: top }, stack.top()),
            (StackAction::Pop(top), 1) => (LinearStep::Remove { i: top }, stack.items.pop()),
            (StackAction::Peek(top), 0) => (LinearStep::Peek { i: top }, stack.top()),
            (StackAction::Peek(top), _) => (LinearStep::Found { i: top }, stack.top()),
            (StackAction::Clear, 0) => {
                stack.items.clear();
                (LinearStep::Clear, None)
            }
            _ => (LinearStep::Complete, None),
        };

        linear_frame(kind, stack.items.clone(), value)
    }

    fn name(&self) -> &'static str {
        match self.action {
            StackAction::Push(_) => "push",
            StackAction::Pop(_) => "pop",
            StackAction::Peek(_) => "peek",
            StackAction::Clear => "stack clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::tests::{labels, run_op};

    fn stack(values: &[i64]) -> Stack {
        Stack {
            items: values.to_vec(),
            capacity: 4,
        }
    }

    #[test]
    fn test_push_then_pop() {
        let s = stack(&[1, 2]);
        let (frames, s) = run_op(s.clone(), StackOp::push(&s, 3).unwrap());
        assert_eq!(labels(&frames), vec!["insert", "complete"]);
        assert_eq!(frames[0].kind, LinearStep::Insert { i: 2 });
        assert_eq!(s.top(), Some(3));

        let (frames, s) = run_op(s.clone(), StackOp::pop(&s).unwrap());
        assert_eq!(labels(&frames), vec!["peek", "remove", "complete"]);
        assert_eq!(frames[0].snapshot, vec![1, 2, 3]);
        assert_eq!(frames[1].aux.value, Some(3));
        assert_eq!(s.values(), &[1, 2]);
    }

    #[test]
    fn test_peek_leaves_stack_alone() {
        let s = stack(&[5, 6]);
        let (frames, after) = run_op(s.clone(), StackOp::peek(&s).unwrap());
        assert_eq!(frames[1].kind, LinearStep::Found { i: 1 });
        assert_eq!(frames[1].aux.value, Some(6));
        assert_eq!(after, s);
    }

    #[test]
    fn test_clear() {
        let (frames, s) = run_op(stack(&[1, 2, 3]), StackOp::clear());
        assert_eq!(labels(&frames), vec!["clear", "complete"]);
        assert!(frames[0].snapshot.is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn test_empty_and_full_are_refused() {
        let empty = Stack::new(4);
        assert_eq!(StackOp::pop(&empty).unwrap_err(), InputError::Empty("Stack"));
        assert_eq!(StackOp::peek(&empty).unwrap_err(), InputError::Empty("Stack"));
        assert!(matches!(
            StackOp::push(&stack(&[1, 2, 3, 4]), 5),
            Err(InputError::Full { .. })
        ));
    }
}
