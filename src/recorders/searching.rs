// Searching recorders
// Linear, binary, jump and interpolation search over a value array

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::catalog::AlgorithmInfo;
use crate::input::InputError;
use crate::trace::{Family, FrameKind, Trace, TraceBuilder};

/// Observable searching steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchStep {
    /// The value at `i` is being compared with the target
    Compare { i: usize },

    /// Current binary search window, emitted before probing `mid`
    Range { lo: usize, mid: usize, hi: usize },

    Found { i: usize },

    NotFound,
}

impl FrameKind for SearchStep {
    type Subject = usize;

    fn is_terminal(&self) -> bool {
        matches!(self, SearchStep::Found { .. } | SearchStep::NotFound)
    }

    fn subjects(&self) -> Vec<usize> {
        match self {
            SearchStep::Compare { i } | SearchStep::Found { i } => vec![*i],
            SearchStep::Range { lo, mid, hi } => vec![*lo, *mid, *hi],
            SearchStep::NotFound => Vec::new(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SearchStep::Compare { .. } => "compare",
            SearchStep::Range { .. } => "range",
            SearchStep::Found { .. } => "found",
            SearchStep::NotFound => "not_found",
        }
    }
}

/// Inclusive search window with its probe index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub lo: usize,
    pub mid: usize,
    pub hi: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchAux {
    /// Narrowing window for binary and interpolation search
    pub window: Option<Window>,
}

/// Searching family: snapshots are the (unchanged) searched array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Searching;

impl Family for Searching {
    type Kind = SearchStep;
    type Snapshot = Vec<i64>;
    type Aux = SearchAux;
    const NAME: &'static str = "searching";
}

/// Available searching algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchAlgorithm {
    Linear,
    Binary,
    Jump,
    Interpolation,
}

impl SearchAlgorithm {
    pub const ALL: [SearchAlgorithm; 4] = [
        SearchAlgorithm::Linear,
        SearchAlgorithm::Binary,
        SearchAlgorithm::Jump,
        SearchAlgorithm::Interpolation,
    ];

    pub fn info(&self) -> AlgorithmInfo {
        match self {
            SearchAlgorithm::Linear => AlgorithmInfo::new(
                "linear_search",
                "Linear Search",
                "Checks each element in the list one by one until it finds the target or reaches the end.",
                ["O(1)", "O(n)", "O(n)", "O(1)"],
            ),
            SearchAlgorithm::Binary => AlgorithmInfo::new(
                "binary_search",
                "Binary Search",
                "Works on sorted arrays by repeatedly dividing the search interval in half.",
                ["O(1)", "O(log n)", "O(log n)", "O(1)"],
            ),
            SearchAlgorithm::Jump => AlgorithmInfo::new(
                "jump_search",
                "Jump Search",
                "Works on sorted arrays by jumping ahead in fixed blocks, then scanning the block linearly.",
                ["O(1)", "O(√n)", "O(√n)", "O(1)"],
            ),
            SearchAlgorithm::Interpolation => AlgorithmInfo::new(
                "interpolation_search",
                "Interpolation Search",
                "Variant of binary search for uniformly distributed sorted arrays that estimates the target position from its value.",
                ["O(1)", "O(log log n)", "O(n)", "O(1)"],
            ),
        }
    }

    /// Whether the algorithm assumes ascending input
    pub fn requires_sorted(&self) -> bool {
        !matches!(self, SearchAlgorithm::Linear)
    }
}

impl FromStr for SearchAlgorithm {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_search" | "linear" | "linearSearch" => Ok(SearchAlgorithm::Linear),
            "binary_search" | "binary" | "binarySearch" => Ok(SearchAlgorithm::Binary),
            "jump_search" | "jump" | "jumpSearch" => Ok(SearchAlgorithm::Jump),
            "interpolation_search" | "interpolation" | "interpolationSearch" => {
                Ok(SearchAlgorithm::Interpolation)
            }
            _ => Err(InputError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Run `algorithm` for `target` over `values` and record every probe
pub fn record(algorithm: SearchAlgorithm, values: &[i64], target: i64) -> Trace<Searching> {
    let mut rec = SearchRecorder {
        builder: TraceBuilder::new(algorithm.info().key),
        values,
        target,
    };

    let found = match algorithm {
        SearchAlgorithm::Linear => rec.linear(),
        SearchAlgorithm::Binary => rec.binary(),
        SearchAlgorithm::Jump => rec.jump(),
        SearchAlgorithm::Interpolation => rec.interpolation(),
    };

    rec.finish(found)
}

/// Index reported by a finished search trace, if any
pub fn found_index(trace: &Trace<Searching>) -> Option<usize> {
    match trace.terminal().kind {
        SearchStep::Found { i } => Some(i),
        _ => None,
    }
}

struct SearchRecorder<'a> {
    builder: TraceBuilder<Searching>,
    values: &'a [i64],
    target: i64,
}

impl SearchRecorder<'_> {
    fn emit(&mut self, step: SearchStep, window: Option<Window>) {
        self.builder
            .push(step, self.values.to_vec(), SearchAux { window });
    }

    fn compare(&mut self, i: usize) {
        self.emit(SearchStep::Compare { i }, None);
    }

    fn finish(mut self, found: Option<usize>) -> Trace<Searching> {
        match found {
            Some(i) => self.emit(SearchStep::Found { i }, None),
            None => self.emit(SearchStep::NotFound, None),
        }
        self.builder.seal()
    }

    /// Bounding probes for the sorted-input algorithms. False when the target
    /// cannot be present (empty input or outside `[first, last]`).
    fn within_bounds(&mut self) -> bool {
        let n = self.values.len();
        if n == 0 {
            return false;
        }

        if self.target < self.values[0] || self.target > self.values[n - 1] {
            self.compare(0);
            self.compare(n - 1);
            return false;
        }

        true
    }

    fn linear(&mut self) -> Option<usize> {
        for i in 0..self.values.len() {
            self.compare(i);
            if self.values[i] == self.target {
                return Some(i);
            }
        }
        None
    }

    fn binary(&mut self) -> Option<usize> {
        if !self.within_bounds() {
            return None;
        }

        let (mut lo, mut hi) = (0, self.values.len() - 1);
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let window = Some(Window { lo, mid, hi });
            self.emit(SearchStep::Range { lo, mid, hi }, window);
            self.emit(SearchStep::Compare { i: mid }, window);

            if self.values[mid] == self.target {
                return Some(mid);
            }

            if self.values[mid] < self.target {
                lo = mid + 1;
            } else {
                match mid.checked_sub(1) {
                    Some(next) => hi = next,
                    None => break,
                }
            }
        }

        None
    }

    fn jump(&mut self) -> Option<usize> {
        if !self.within_bounds() {
            return None;
        }

        let n = self.values.len();
        let jump = ((n as f64).sqrt() as usize).max(1);

        // Find the first block whose last value is not below the target
        let mut prev = 0;
        let mut end = jump.min(n);
        loop {
            self.compare(end - 1);
            if self.values[end - 1] >= self.target {
                break;
            }
            prev = end;
            if prev >= n {
                return None;
            }
            end = (end + jump).min(n);
        }

        for i in prev..end {
            self.compare(i);
            if self.values[i] == self.target {
                return Some(i);
            }
            if self.values[i] > self.target {
                return None;
            }
        }

        None
    }

    fn interpolation(&mut self) -> Option<usize> {
        if !self.within_bounds() {
            return None;
        }

        let target = self.target;
        let (mut lo, mut hi) = (0, self.values.len() - 1);

        while lo <= hi && target >= self.values[lo] && target <= self.values[hi] {
            if lo == hi || self.values[hi] == self.values[lo] {
                // Flat window: the estimate would divide by zero, test `lo` directly
                self.emit(SearchStep::Compare { i: lo }, Some(Window { lo, mid: lo, hi }));
                return (self.values[lo] == target).then_some(lo);
            }

            let pos = self.estimate(lo, hi);
            self.emit(SearchStep::Compare { i: pos }, Some(Window { lo, mid: pos, hi }));

            if self.values[pos] == target {
                return Some(pos);
            }

            // The loop guard keeps these away from the window edges
            if self.values[pos] < target {
                lo = pos + 1;
            } else {
                hi = pos - 1;
            }
        }

        None
    }

    /// Linear position estimate inside `lo..=hi`, computed exactly in i128
    fn estimate(&self, lo: usize, hi: usize) -> usize {
        let span = (hi - lo) as i128;
        let rise = self.values[hi] as i128 - self.values[lo] as i128;
        let offset = self.target as i128 - self.values[lo] as i128;

        let pos = lo as i128 + (span * offset).div_euclid(rise);
        pos.clamp(lo as i128, hi as i128) as usize
    }
}
