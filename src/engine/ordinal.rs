//! Ordinal Assigner - Monotonic sequence numbers.
//!
//! Every record gets an ordinal on first registration. Sibling order in the
//! derived tree follows ordinals, not map iteration order, so the tree looks
//! the same no matter how the underlying map hashes its keys.
//!
//! The same counter type backs the ID synthesizer in the session.

/// A session-wide monotonic counter.
///
/// Values are never reused, even after the record that got one is gone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequence(u64);

impl Sequence {
    /// Create a counter starting at 0.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Take the current value and move past it.
    pub fn advance(&mut self) -> u64 {
        let value = self.0;
        self.0 += 1;
        value
    }
}
