//! OffsetIndex - O(log n) main-axis prefix sums via a Fenwick tree.
//!
//! Sizes are stored in fixed-point layout units (1/64 of a pixel) so the
//! tree works on integers and prefix sums never accumulate float drift.
//!
//! # Complexity
//!
//! - `prefix_sum`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n) amortised
//! - `len`: O(1)

const UNITS_PER_PX: f32 = 64.0;

fn to_units(size: f32) -> isize {
    (size.max(0.0) * UNITS_PER_PX).round() as isize
}

fn to_px(units: isize) -> f32 {
    units as f32 / UNITS_PER_PX
}

/// Cumulative main-axis extents of a single-column list.
///
/// Each entry is an item's extent including its trailing gap, so
/// `prefix_sum(i - 1)` is where item `i` starts.
#[derive(Debug, Clone, Default)]
pub struct OffsetIndex {
    /// Fenwick tree backing storage, sized to a power of two
    tree: Vec<isize>,
    /// Raw entry values, for rebuilds
    sizes: Vec<isize>,
}

impl OffsetIndex {
    /// Creates an empty index with room for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity.next_power_of_two()],
            sizes: Vec::with_capacity(capacity),
        }
    }

    /// Cumulative extent of entries `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn prefix_sum(&self, index: usize) -> f32 {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );
        to_px(fenwick::array::prefix_sum(&self.tree, index))
    }

    /// Main-axis start of entry `index`.
    pub fn start_of(&self, index: usize) -> f32 {
        if index == 0 {
            0.0
        } else {
            self.prefix_sum(index - 1)
        }
    }

    /// First entry whose cumulative extent passes `offset`.
    ///
    /// Returns `None` if `offset >= total()` or the index is empty.
    pub fn lower_bound(&self, offset: f32) -> Option<usize> {
        let target = to_units(offset);
        let (mut left, mut right) = (0, self.len());
        while left < right {
            let mid = left + (right - left) / 2;
            if fenwick::array::prefix_sum(&self.tree, mid) > target {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        (left < self.len()).then_some(left)
    }

    /// Sum of every entry.
    pub fn total(&self) -> f32 {
        match self.len() {
            0 => 0.0,
            len => self.prefix_sum(len - 1),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Appends an entry.
    pub fn push(&mut self, size: f32) {
        let index = self.sizes.len();
        self.sizes.push(to_units(size));
        if index >= self.tree.len() {
            // Upper nodes of a grown tree must cover the existing entries.
            self.rebuild((index + 1).next_power_of_two());
        } else {
            fenwick::array::update(&mut self.tree, index, self.sizes[index]);
        }
    }

    /// Drops entries from `len` on.
    pub fn truncate(&mut self, len: usize) {
        if len < self.sizes.len() {
            self.sizes.truncate(len);
            self.rebuild(self.tree.len());
        }
    }

    fn rebuild(&mut self, capacity: usize) {
        self.tree = vec![0; capacity.max(1)];
        for (index, &units) in self.sizes.iter().enumerate() {
            fenwick::array::update(&mut self.tree, index, units);
        }
    }
}
