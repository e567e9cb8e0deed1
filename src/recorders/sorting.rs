// Sorting recorders
// Bubble, selection, insertion, merge and quick sort, each emitting one frame per observable step

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::catalog::AlgorithmInfo;
use crate::input::InputError;
use crate::trace::{Family, FrameKind, Trace, TraceBuilder};

/// Observable sorting steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SortStep {
    /// Two values are being compared
    Compare { i: usize, j: usize },

    /// Two values were exchanged
    Swap { i: usize, j: usize },

    /// A value was written into slot `i` (merge placement, insertion shift)
    Insert { i: usize },

    /// Quicksort chose the value at `i` as its pivot
    Pivot { i: usize },

    /// Mergesort split `lo..=hi` at `mid`
    Divide { lo: usize, mid: usize, hi: usize },

    /// Current slot of the outer loop (selection/insertion)
    Position { i: usize },

    /// These indices now hold their final values
    Sorted { indices: Vec<usize> },

    Complete,
}

impl FrameKind for SortStep {
    type Subject = usize;

    fn is_terminal(&self) -> bool {
        matches!(self, SortStep::Complete)
    }

    fn subjects(&self) -> Vec<usize> {
        match self {
            SortStep::Compare { i, j } | SortStep::Swap { i, j } => vec![*i, *j],
            SortStep::Insert { i } | SortStep::Pivot { i } | SortStep::Position { i } => vec![*i],
            SortStep::Divide { lo, mid, hi } => vec![*lo, *mid, *hi],
            SortStep::Sorted { indices } => indices.clone(),
            SortStep::Complete => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SortStep::Compare { .. } => "compare",
            SortStep::Swap { .. } => "swap",
            SortStep::Insert { .. } => "insert",
            SortStep::Pivot { .. } => "pivot",
            SortStep::Divide { .. } => "divide",
            SortStep::Position { .. } => "position",
            SortStep::Sorted { .. } => "sorted",
            SortStep::Complete => "complete",
        }
    }
}

/// Indices settled so far, in the order they became final
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortAux {
    pub settled: Vec<usize>,
}

/// Sorting family: snapshots are the full array after each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorting;

impl Family for Sorting {
    type Kind = SortStep;
    type Snapshot = Vec<i64>;
    type Aux = SortAux;
    const NAME: &'static str = "sorting";
}

/// Available sorting algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 5] = [
        SortAlgorithm::Bubble,
        SortAlgorithm::Selection,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
    ];

    pub fn info(&self) -> AlgorithmInfo {
        match self {
            SortAlgorithm::Bubble => AlgorithmInfo::new(
                "bubble_sort",
                "Bubble Sort",
                "Repeatedly steps through the list, compares adjacent elements and swaps them if they are out of order.",
                ["O(n)", "O(n²)", "O(n²)", "O(1)"],
            ),
            SortAlgorithm::Selection => AlgorithmInfo::new(
                "selection_sort",
                "Selection Sort",
                "Repeatedly selects the smallest element of the unsorted region and moves it to the end of the sorted region.",
                ["O(n²)", "O(n²)", "O(n²)", "O(1)"],
            ),
            SortAlgorithm::Insertion => AlgorithmInfo::new(
                "insertion_sort",
                "Insertion Sort",
                "Builds the sorted array one item at a time by inserting each element into its place among the ones before it.",
                ["O(n)", "O(n²)", "O(n²)", "O(1)"],
            ),
            SortAlgorithm::Merge => AlgorithmInfo::new(
                "merge_sort",
                "Merge Sort",
                "Divide and conquer: splits the array in halves, sorts each half recursively, then merges them.",
                ["O(n log n)", "O(n log n)", "O(n log n)", "O(n)"],
            ),
            SortAlgorithm::Quick => AlgorithmInfo::new(
                "quick_sort",
                "Quick Sort",
                "Divide and conquer: partitions the array around a pivot so smaller values sit left of it and larger ones right.",
                ["O(n log n)", "O(n log n)", "O(n²)", "O(log n)"],
            ),
        }
    }
}

impl FromStr for SortAlgorithm {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bubble_sort" | "bubble" | "bubbleSort" => Ok(SortAlgorithm::Bubble),
            "selection_sort" | "selection" | "selectionSort" => Ok(SortAlgorithm::Selection),
            "insertion_sort" | "insertion" | "insertionSort" => Ok(SortAlgorithm::Insertion),
            "merge_sort" | "merge" | "mergeSort" => Ok(SortAlgorithm::Merge),
            "quick_sort" | "quick" | "quickSort" => Ok(SortAlgorithm::Quick),
            _ => Err(InputError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Run `algorithm` over a copy of `values` and record every step
pub fn record(algorithm: SortAlgorithm, values: &[i64]) -> Trace<Sorting> {
    let mut rec = SortRecorder::new(algorithm, values);
    let n = values.len();

    if n > 0 {
        match algorithm {
            SortAlgorithm::Bubble => rec.bubble(),
            SortAlgorithm::Selection => rec.selection(),
            SortAlgorithm::Insertion => rec.insertion(),
            SortAlgorithm::Merge => {
                rec.merge_sort(0, n - 1);
                rec.settle((0..n).collect());
            }
            SortAlgorithm::Quick => rec.quick_sort(0, n - 1),
        }
    }

    rec.finish()
}

/// Working state for one sorting run
struct SortRecorder {
    builder: TraceBuilder<Sorting>,
    values: Vec<i64>,
    settled: Vec<usize>,
}

impl SortRecorder {
    fn new(algorithm: SortAlgorithm, values: &[i64]) -> Self {
        SortRecorder {
            builder: TraceBuilder::new(algorithm.info().key),
            values: values.to_vec(),
            settled: Vec::new(),
        }
    }

    fn emit(&mut self, step: SortStep) {
        let aux = SortAux {
            settled: self.settled.clone(),
        };
        self.builder.push(step, self.values.clone(), aux);
    }

    fn compare(&mut self, i: usize, j: usize) {
        self.emit(SortStep::Compare { i, j });
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
        self.emit(SortStep::Swap { i, j });
    }

    fn write(&mut self, i: usize, value: i64) {
        self.values[i] = value;
        self.emit(SortStep::Insert { i });
    }

    fn settle(&mut self, indices: Vec<usize>) {
        self.settled.extend(indices.iter().copied());
        self.emit(SortStep::Sorted { indices });
    }

    fn finish(mut self) -> Trace<Sorting> {
        self.emit(SortStep::Complete);
        self.builder.seal()
    }

    fn bubble(&mut self) {
        let n = self.values.len();

        for i in 0..n - 1 {
            for j in 0..n - i - 1 {
                self.compare(j, j + 1);
                if self.values[j] > self.values[j + 1] {
                    self.swap(j, j + 1);
                }
            }
            self.settle(vec![n - i - 1]);
        }

        self.settle(vec![0]);
    }

    fn selection(&mut self) {
        let n = self.values.len();

        for i in 0..n - 1 {
            self.emit(SortStep::Position { i });

            let mut min_index = i;
            for j in i + 1..n {
                self.compare(min_index, j);
                if self.values[j] < self.values[min_index] {
                    min_index = j;
                }
            }

            if min_index != i {
                self.swap(i, min_index);
            }
            self.settle(vec![i]);
        }

        self.settle(vec![n - 1]);
    }

    fn insertion(&mut self) {
        let n = self.values.len();

        for i in 1..n {
            self.emit(SortStep::Position { i });

            let key = self.values[i];
            let mut slot = i;
            while slot > 0 && self.values[slot - 1] > key {
                self.compare(slot - 1, slot);
                let shifted = self.values[slot - 1];
                self.write(slot, shifted);
                slot -= 1;
            }

            self.write(slot, key);
        }

        // Nothing is final until the last key lands
        self.settle((0..n).collect());
    }

    fn merge_sort(&mut self, lo: usize, hi: usize) {
        if lo >= hi {
            return;
        }

        let mid = lo + (hi - lo) / 2;
        self.emit(SortStep::Divide { lo, mid, hi });

        self.merge_sort(lo, mid);
        self.merge_sort(mid + 1, hi);
        self.merge(lo, mid, hi);
    }

    fn merge(&mut self, lo: usize, mid: usize, hi: usize) {
        let left = self.values[lo..=mid].to_vec();
        let right = self.values[mid + 1..=hi].to_vec();

        let (mut i, mut j, mut k) = (0, 0, lo);
        while i < left.len() && j < right.len() {
            self.compare(lo + i, mid + 1 + j);
            if left[i] <= right[j] {
                self.write(k, left[i]);
                i += 1;
            } else {
                self.write(k, right[j]);
                j += 1;
            }
            k += 1;
        }

        for &value in left[i..].iter().chain(right[j..].iter()) {
            self.write(k, value);
            k += 1;
        }
    }

    /// Sort `lo..=hi`; callers guarantee `lo <= hi`
    fn quick_sort(&mut self, lo: usize, hi: usize) {
        if lo == hi {
            self.settle(vec![lo]);
            return;
        }

        let pivot = self.partition(lo, hi);
        if pivot > lo {
            self.quick_sort(lo, pivot - 1);
        }
        if pivot < hi {
            self.quick_sort(pivot + 1, hi);
        }
    }

    /// Lomuto partition around `values[hi]`, returns the pivot's final index
    fn partition(&mut self, lo: usize, hi: usize) -> usize {
        let pivot = self.values[hi];
        self.emit(SortStep::Pivot { i: hi });

        // Next slot for a value smaller than the pivot
        let mut store = lo;
        for j in lo..hi {
            self.compare(j, hi);
            if self.values[j] < pivot {
                if store != j {
                    self.swap(store, j);
                }
                store += 1;
            }
        }

        if store != hi {
            self.swap(store, hi);
        }
        self.settle(vec![store]);
        store
    }
}
