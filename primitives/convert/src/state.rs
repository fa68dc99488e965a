//! Per-call scoring state.
//!
//! A fresh state is created for every top-level `decode`/`encode` and for
//! every union candidate trial. `matched` counts sub-values that fit their
//! target shape; `attempted` counts every coercer or dumper that ran.

/// Counters collected while coercing a wire value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CoerceState {
    /// Sub-values that matched their target shape
    pub matched: u32,
    /// Coercers invoked
    pub attempted: u32,
}

impl CoerceState {
    /// A zeroed state.
    pub fn new() -> Self { Self::default() }

    pub(crate) fn attempt(&mut self) { self.attempted += 1; }

    pub(crate) fn hit(&mut self) { self.matched += 1; }

    /// Add the counters of a nested trial.
    pub fn absorb(&mut self, other: CoerceState) {
        self.matched += other.matched;
        self.attempted += other.attempted;
    }
}

/// Counters collected while dumping a typed value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpState {
    /// Sub-values whose shape fit their converter
    pub matched: u32,
    /// Dumpers invoked
    pub attempted: u32,
}

impl DumpState {
    /// A zeroed state.
    pub fn new() -> Self { Self::default() }

    pub(crate) fn attempt(&mut self) { self.attempted += 1; }

    pub(crate) fn hit(&mut self) { self.matched += 1; }

    /// Add the counters of a nested trial.
    pub fn absorb(&mut self, other: DumpState) {
        self.matched += other.matched;
        self.attempted += other.attempted;
    }
}
