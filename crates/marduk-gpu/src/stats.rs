/// Counters accumulated across flushes until [`GpuStats::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuStats {
    /// Mesh submissions the backend accepted.
    pub draws: u64,
    /// Surface copies the backend accepted.
    pub copies: u64,
    /// Ops rejected at submission: capability exceeded or backend error.
    pub failed_draws: u64,
    /// Ops folded into an earlier op by the merge pass.
    pub merged_ops: u64,
    pub flushes: u64,
    /// Recorded ops dropped without execution.
    pub ops_abandoned: u64,
    pub msaa_resolves: u64,
    pub target_allocations: u64,
}

impl GpuStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
