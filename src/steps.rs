//! Lazy step generation for the animated sorting algorithms.
//!
//! A [`StepEmitter`] runs one algorithm with an explicit yield point after
//! every visually meaningful mutation and hands out a fresh
//! [`ArraySnapshot`] for each. It never sleeps or performs I/O; timing is
//! the playback controller's job.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use crate::{ArraySnapshot, Bar, BarState};

/// Sorting algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    /// Insertion sort, walking each key left by adjacent swaps
    #[default]
    Insertion,
    /// Bubble sort with a shrinking unsorted suffix
    Bubble,
}

impl Algorithm {
    /// Lowercase identifier used in filenames and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Insertion => "insertion",
            Algorithm::Bubble => "bubble",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" => Ok(Algorithm::Insertion),
            "bubble" => Ok(Algorithm::Bubble),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Returned when parsing an algorithm name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sorting algorithm: {0:?}")]
pub struct UnknownAlgorithm(pub String);

/// Category of the atomic operation a step represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// A key was highlighted
    MarkActive,
    /// One or two bars were highlighted for comparison
    Compare,
    /// An adjacent pair was exchanged
    Swap,
    /// One or more bars were marked sorted
    MarkSorted,
}

/// One visible state after one atomic operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// What happened
    pub kind: StepKind,
    /// Array state right after it happened
    pub snapshot: ArraySnapshot,
}

/// Lazy, finite, single-use sequence of sorting steps.
///
/// ## Example
///
/// ```rust
/// use sortviz_core::{Algorithm, ArraySnapshot, StepEmitter};
///
/// let initial = ArraySnapshot::from_values(&[5, 3, 4, 1]);
/// let last = StepEmitter::new(Algorithm::Insertion, &initial).last().unwrap();
/// assert_eq!(last.snapshot.values(), vec![1, 3, 4, 5]);
/// ```
#[derive(Clone, Debug)]
pub struct StepEmitter {
    algorithm: Algorithm,
    inner: Emitter,
}

#[derive(Clone, Debug)]
enum Emitter {
    Insertion(InsertionSteps),
    Bubble(BubbleSteps),
}

impl StepEmitter {
    /// Prepare to sort a copy of `initial` with `algorithm`.
    pub fn new(algorithm: Algorithm, initial: &ArraySnapshot) -> Self {
        let bars = initial.clone().into_bars();
        let inner = match algorithm {
            Algorithm::Insertion => Emitter::Insertion(InsertionSteps::new(bars)),
            Algorithm::Bubble => Emitter::Bubble(BubbleSteps::new(bars)),
        };
        Self { algorithm, inner }
    }

    /// The algorithm being run.
    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Outer-loop position as `(current, total)`.
    ///
    /// `current` is the insertion key index or the bubble pass number;
    /// `total` is the array length. Reaches `(total, total)` once exhausted.
    pub fn progress(&self) -> (usize, usize) {
        match &self.inner {
            Emitter::Insertion(s) => s.progress(),
            Emitter::Bubble(s) => s.progress(),
        }
    }

    /// Progress as a rounded percentage (0-100).
    pub fn percent(&self) -> u8 {
        let (current, total) = self.progress();
        if total == 0 {
            return 100;
        }
        ((current as f64 / total as f64) * 100.0).round().min(100.0) as u8
    }
}

impl Iterator for StepEmitter {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        match &mut self.inner {
            Emitter::Insertion(s) => s.next_step(),
            Emitter::Bubble(s) => s.next_step(),
        }
    }
}

impl FusedIterator for StepEmitter {}

fn emit(bars: &[Bar], kind: StepKind) -> Option<Step> {
    Some(Step {
        kind,
        snapshot: ArraySnapshot::from_bars(bars.to_vec()),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InsertionPhase {
    Boundary,
    Key,
    Scan,
    Swap,
    Settle,
    Done,
}

#[derive(Clone, Debug)]
struct InsertionSteps {
    bars: Vec<Bar>,
    i: usize,
    j: usize,
    phase: InsertionPhase,
}

impl InsertionSteps {
    fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            i: 1,
            j: 1,
            phase: InsertionPhase::Boundary,
        }
    }

    fn progress(&self) -> (usize, usize) {
        let n = self.bars.len();
        match self.phase {
            InsertionPhase::Boundary => (0, n),
            InsertionPhase::Done => (n, n),
            _ => (self.i.min(n), n),
        }
    }

    fn next_step(&mut self) -> Option<Step> {
        let n = self.bars.len();
        loop {
            match self.phase {
                InsertionPhase::Boundary => {
                    if n == 0 {
                        self.phase = InsertionPhase::Done;
                        continue;
                    }
                    self.bars[0].state = BarState::Sorted;
                    self.phase = InsertionPhase::Key;
                    return emit(&self.bars, StepKind::MarkSorted);
                }
                InsertionPhase::Key => {
                    if self.i >= n {
                        self.phase = InsertionPhase::Done;
                        continue;
                    }
                    self.bars[self.i].state = BarState::Active;
                    self.j = self.i;
                    self.phase = InsertionPhase::Scan;
                    return emit(&self.bars, StepKind::MarkActive);
                }
                InsertionPhase::Scan => {
                    let j = self.j;
                    // Strict comparison keeps equal keys in order.
                    if j > 0 && self.bars[j - 1].value > self.bars[j].value {
                        self.bars[j - 1].state = BarState::Compare;
                        self.phase = InsertionPhase::Swap;
                        return emit(&self.bars, StepKind::Compare);
                    }
                    self.phase = InsertionPhase::Settle;
                }
                InsertionPhase::Swap => {
                    let j = self.j;
                    assert!(
                        self.bars[j - 1].value > self.bars[j].value,
                        "insertion swap on an ordered pair at {j}"
                    );
                    self.bars.swap(j - 1, j);
                    self.bars[j].state = BarState::Sorted;
                    self.bars[j - 1].state = BarState::Active;
                    self.j -= 1;
                    self.phase = InsertionPhase::Scan;
                    return emit(&self.bars, StepKind::Swap);
                }
                InsertionPhase::Settle => {
                    self.bars[self.j].state = BarState::Sorted;
                    for bar in &mut self.bars[..self.i] {
                        bar.state = BarState::Sorted;
                    }
                    self.i += 1;
                    self.phase = InsertionPhase::Key;
                    return emit(&self.bars, StepKind::MarkSorted);
                }
                InsertionPhase::Done => return None,
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BubblePhase {
    Compare,
    Resolve,
    Release,
    PassEnd,
    EarlyExit,
    Done,
}

#[derive(Clone, Debug)]
struct BubbleSteps {
    bars: Vec<Bar>,
    pass: usize,
    j: usize,
    swapped: bool,
    phase: BubblePhase,
}

impl BubbleSteps {
    fn new(bars: Vec<Bar>) -> Self {
        let phase = if bars.is_empty() {
            BubblePhase::Done
        } else {
            BubblePhase::Compare
        };
        Self {
            bars,
            pass: 0,
            j: 0,
            swapped: false,
            phase,
        }
    }

    fn progress(&self) -> (usize, usize) {
        let n = self.bars.len();
        match self.phase {
            BubblePhase::Done => (n, n),
            _ => (self.pass.min(n), n),
        }
    }

    /// Index one past the last bar compared in the current pass.
    #[inline]
    fn boundary(&self) -> usize {
        self.bars.len() - self.pass - 1
    }

    fn release_pair(&mut self) {
        let j = self.j;
        debug_assert!(j < self.boundary(), "released pair crosses the sorted suffix");
        self.bars[j].state = BarState::Idle;
        self.bars[j + 1].state = BarState::Idle;
        self.j += 1;
    }

    fn next_step(&mut self) -> Option<Step> {
        let n = self.bars.len();
        loop {
            match self.phase {
                BubblePhase::Compare => {
                    if self.j >= self.boundary() {
                        self.phase = BubblePhase::PassEnd;
                        continue;
                    }
                    let j = self.j;
                    self.bars[j].state = BarState::Compare;
                    self.bars[j + 1].state = BarState::Compare;
                    self.phase = BubblePhase::Resolve;
                    return emit(&self.bars, StepKind::Compare);
                }
                BubblePhase::Resolve => {
                    let j = self.j;
                    if self.bars[j].value > self.bars[j + 1].value {
                        self.bars.swap(j, j + 1);
                        self.bars[j].state = BarState::Active;
                        self.bars[j + 1].state = BarState::Active;
                        self.swapped = true;
                        self.phase = BubblePhase::Release;
                        return emit(&self.bars, StepKind::Swap);
                    }
                    self.release_pair();
                    self.phase = BubblePhase::Compare;
                }
                BubblePhase::Release => {
                    self.release_pair();
                    self.phase = BubblePhase::Compare;
                }
                BubblePhase::PassEnd => {
                    let edge = self.boundary();
                    self.bars[edge].state = BarState::Sorted;
                    // The last pass (`boundary() == 0`) never swaps, so
                    // every run ends through `EarlyExit`.
                    self.phase = if !self.swapped {
                        BubblePhase::EarlyExit
                    } else {
                        self.pass += 1;
                        self.j = 0;
                        self.swapped = false;
                        BubblePhase::Compare
                    };
                    return emit(&self.bars, StepKind::MarkSorted);
                }
                BubblePhase::EarlyExit => {
                    // A pass without swaps proves the rest is ordered.
                    self.phase = BubblePhase::Done;
                    self.pass = n;
                    if self.bars.iter().all(|b| b.state == BarState::Sorted) {
                        continue;
                    }
                    for bar in &mut self.bars {
                        bar.state = BarState::Sorted;
                    }
                    return emit(&self.bars, StepKind::MarkSorted);
                }
                BubblePhase::Done => return None,
            }
        }
    }
}
