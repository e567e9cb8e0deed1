// Array mutator
// Indexed insert, remove and linear search over a bounded value array

use serde::{Deserialize, Serialize};

use super::source::Operation;
use super::{linear_frame, Linear, LinearStep};
use crate::input::{InputError, InputResult};
use crate::trace::Frame;

/// Fixed-capacity array of integers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Array {
    values: Vec<i64>,
    capacity: usize,
}

impl Array {
    pub fn new(capacity: usize) -> Self {
        Array {
            values: Vec::new(),
            capacity,
        }
    }

    /// Create from explicit values, refusing more than `capacity` of them
    pub fn from_values(values: Vec<i64>, capacity: usize) -> InputResult<Self> {
        if values.len() > capacity {
            return Err(InputError::Full {
                what: "Array",
                max: capacity,
            });
        }
        Ok(Array { values, capacity })
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayAction {
    InsertAt { index: usize, value: i64 },
    RemoveAt { index: usize },
    Search { value: i64 },
}

/// Animated array operation; build with the validating constructors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayOp {
    action: ArrayAction,
    step: usize,
    matched: bool,
}

impl ArrayOp {
    fn new(action: ArrayAction) -> Self {
        ArrayOp {
            action,
            step: 0,
            matched: false,
        }
    }

    /// Walk indices `0..index`, then insert. Valid for `0..=len`.
    pub fn insert_at(array: &Array, index: usize, value: i64) -> InputResult<Self> {
        if array.len() >= array.capacity {
            return Err(InputError::Full {
                what: "Array",
                max: array.capacity,
            });
        }
        if index > array.len() {
            return Err(InputError::IndexOutOfBounds {
                index: index as i64,
                max: array.len(),
            });
        }
        Ok(ArrayOp::new(ArrayAction::InsertAt { index, value }))
    }

    /// Highlight `index`, then remove it. Valid for `0..len`.
    pub fn remove_at(array: &Array, index: usize) -> InputResult<Self> {
        if array.is_empty() {
            return Err(InputError::Empty("Array"));
        }
        if index >= array.len() {
            return Err(InputError::IndexOutOfBounds {
                index: index as i64,
                max: array.len() - 1,
            });
        }
        Ok(ArrayOp::new(ArrayAction::RemoveAt { index }))
    }

    /// Probe each index in turn until `value` turns up
    pub fn search(value: i64) -> Self {
        ArrayOp::new(ArrayAction::Search { value })
    }
}

impl Operation for ArrayOp {
    type Target = Array;
    type Family = Linear;

    fn advance(&mut self, array: &mut Array) -> Frame<Linear> {
        let step = self.step;
        self.step += 1;

        let (kind, value) = match self.action {
            ArrayAction::InsertAt { index, value } => {
                if step < index {
                    (LinearStep::Probe { i: step }, Some(value))
                } else if step == index {
                    array.values.insert(index, value);
                    (LinearStep::Insert { i: index }, Some(value))
                } else {
                    (LinearStep::Complete, Some(value))
                }
            }
            ArrayAction::RemoveAt { index } => match step {
                0 => (LinearStep::Peek { i: index }, array.values.get(index).copied()),
                1 => {
                    let removed = array.values.remove(index);
                    (LinearStep::Remove { i: index }, Some(removed))
                }
                _ => (LinearStep::Complete, None),
            },
            ArrayAction::Search { value } => {
                if self.matched {
                    (LinearStep::Found { i: step - 1 }, Some(value))
                } else if step < array.len() {
                    self.matched = array.values[step] == value;
                    (LinearStep::Probe { i: step }, Some(value))
                } else {
                    (LinearStep::NotFound, Some(value))
                }
            }
        };

        linear_frame(kind, array.values.clone(), value)
    }

    fn name(&self) -> &'static str {
        match self.action {
            ArrayAction::InsertAt { .. } => "array insert",
            ArrayAction::RemoveAt { .. } => "array remove",
            ArrayAction::Search { .. } => "array search",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::tests::{labels, run_op};

    fn array(values: &[i64]) -> Array {
        Array::from_values(values.to_vec(), 8).unwrap()
    }

    #[test]
    fn test_insert_probes_then_inserts() {
        let a = array(&[10, 20, 30]);
        let op = ArrayOp::insert_at(&a, 2, 99).unwrap();
        let (frames, result) = run_op(a, op);

        assert_eq!(labels(&frames), vec!["probe", "probe", "insert", "complete"]);
        assert_eq!(frames[1].snapshot, vec![10, 20, 30]);
        assert_eq!(frames[2].snapshot, vec![10, 20, 99, 30]);
        assert_eq!(result.values(), &[10, 20, 99, 30]);
    }

    #[test]
    fn test_insert_at_end_and_front() {
        let a = array(&[1]);
        let (frames, result) = run_op(a.clone(), ArrayOp::insert_at(&a, 1, 2).unwrap());
        assert_eq!(labels(&frames), vec!["probe", "insert", "complete"]);
        assert_eq!(result.values(), &[1, 2]);

        let (frames, result) = run_op(a.clone(), ArrayOp::insert_at(&a, 0, 0).unwrap());
        assert_eq!(labels(&frames), vec!["insert", "complete"]);
        assert_eq!(result.values(), &[0, 1]);
    }

    #[test]
    fn test_remove_highlights_before_removing() {
        let a = array(&[5, 6, 7]);
        let (frames, result) = run_op(a.clone(), ArrayOp::remove_at(&a, 1).unwrap());
        assert_eq!(labels(&frames), vec!["peek", "remove", "complete"]);
        assert_eq!(frames[0].snapshot, vec![5, 6, 7]);
        assert_eq!(frames[1].aux.value, Some(6));
        assert_eq!(result.values(), &[5, 7]);
    }

    #[test]
    fn test_search() {
        let a = array(&[3, 1, 4]);
        let (frames, _) = run_op(a.clone(), ArrayOp::search(1));
        assert_eq!(labels(&frames), vec!["probe", "probe", "found"]);
        assert_eq!(frames[2].kind, LinearStep::Found { i: 1 });

        let (frames, _) = run_op(a, ArrayOp::search(8));
        assert_eq!(labels(&frames), vec!["probe", "probe", "probe", "not_found"]);
    }

    #[test]
    fn test_invalid_operations_are_refused() {
        let a = array(&[1, 2]);
        assert_eq!(
            ArrayOp::insert_at(&a, 3, 0).unwrap_err(),
            InputError::IndexOutOfBounds { index: 3, max: 2 }
        );
        assert_eq!(
            ArrayOp::remove_at(&a, 2).unwrap_err(),
            InputError::IndexOutOfBounds { index: 2, max: 1 }
        );
        assert_eq!(
            ArrayOp::remove_at(&Array::new(4), 0).unwrap_err(),
            InputError::Empty("Array")
        );

        let full = Array::from_values(vec![1, 2], 2).unwrap();
        assert!(matches!(
            ArrayOp::insert_at(&full, 0, 3),
            Err(InputError::Full { .. })
        ));
        assert!(Array::from_values(vec![1, 2, 3], 2).is_err());
    }
}
