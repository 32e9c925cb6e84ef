//! Core data structures for sortable bar arrays.

use rand::Rng;

/// Lowest value produced by [`ArraySnapshot::generate`] in the default setup.
pub const DEFAULT_MIN_VALUE: u32 = 15;
/// Highest value produced by [`ArraySnapshot::generate`] in the default setup.
pub const DEFAULT_MAX_VALUE: u32 = 100;

/// Visual category of the most recent operation touching a bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BarState {
    /// Not touched in the current pass
    #[default]
    Idle,
    /// Key being inserted, or a pair that was just swapped
    Active,
    /// Being compared
    Compare,
    /// Value being shifted or copied
    Overwrite,
    /// Settled in its final position
    Sorted,
}

/// A single element of the array being sorted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bar {
    /// Bar height (bounded, e.g. 15..=100)
    pub value: u32,
    /// Current visual state
    pub state: BarState,
    /// Stable identity assigned at generation time
    pub id: usize,
}

impl Bar {
    /// Create an idle bar.
    pub fn new(id: usize, value: u32) -> Self {
        Self {
            value,
            state: BarState::Idle,
            id,
        }
    }

    /// Copy of this bar with a different state.
    #[inline]
    pub fn with_state(self, state: BarState) -> Self {
        Self { state, ..self }
    }
}

/// An immutable, fully-formed array state at a given step.
///
/// Snapshots are cheap to clone and are never mutated once published;
/// every transformation goes through [`ArraySnapshot::map_bars`] or the
/// step emitter, which produce new snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArraySnapshot {
    bars: Vec<Bar>,
}

impl ArraySnapshot {
    /// Generate `size` idle bars with uniformly random values in `[min, max]`.
    ///
    /// Ids are `0..size` in generation order.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use sortviz_core::{ArraySnapshot, BarState};
    ///
    /// let snapshot = ArraySnapshot::generate(25, 15, 100);
    /// assert_eq!(snapshot.len(), 25);
    /// assert!(snapshot.bars().iter().all(|b| (15..=100).contains(&b.value)));
    /// assert!(snapshot.bars().iter().all(|b| b.state == BarState::Idle));
    /// ```
    pub fn generate(size: usize, min: u32, max: u32) -> Self {
        Self::generate_with(size, min, max, &mut rand::rng())
    }

    /// Same as [`ArraySnapshot::generate`] with a caller-supplied RNG.
    pub fn generate_with<R: Rng>(size: usize, min: u32, max: u32, rng: &mut R) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let bars = (0..size)
            .map(|id| Bar::new(id, rng.random_range(lo..=hi)))
            .collect();
        Self { bars }
    }

    /// Build idle bars from explicit values; ids follow input order.
    pub fn from_values(values: &[u32]) -> Self {
        let bars = values
            .iter()
            .enumerate()
            .map(|(id, &value)| Bar::new(id, value))
            .collect();
        Self { bars }
    }

    /// Wrap an explicit bar sequence.
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    /// The bars, left to right.
    #[inline]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the array has no bars.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bar values, left to right.
    pub fn values(&self) -> Vec<u32> {
        self.bars.iter().map(|b| b.value).collect()
    }

    /// Bar ids, left to right.
    pub fn ids(&self) -> Vec<usize> {
        self.bars.iter().map(|b| b.id).collect()
    }

    /// Bar states, left to right.
    pub fn states(&self) -> Vec<BarState> {
        self.bars.iter().map(|b| b.state).collect()
    }

    /// Number of bars currently marked [`BarState::Sorted`].
    pub fn sorted_count(&self) -> usize {
        self.count_state(BarState::Sorted)
    }

    /// Number of bars in the given state.
    pub fn count_state(&self, state: BarState) -> usize {
        self.bars.iter().filter(|b| b.state == state).count()
    }

    /// Whether values are non-decreasing left to right.
    pub fn is_sorted(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].value <= w[1].value)
    }

    /// New snapshot with every bar transformed by `f`.
    pub fn map_bars(&self, f: impl Fn(Bar) -> Bar) -> Self {
        Self {
            bars: self.bars.iter().copied().map(f).collect(),
        }
    }

    /// New snapshot with every bar marked sorted.
    pub fn mark_all_sorted(&self) -> Self {
        self.map_bars(|b| b.with_state(BarState::Sorted))
    }

    /// New snapshot with every bar reset to idle.
    pub fn reset_states(&self) -> Self {
        self.map_bars(|b| b.with_state(BarState::Idle))
    }

    pub(crate) fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}
