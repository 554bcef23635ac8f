//! Invalidation flags
//!
//! A mutation never touches captured draw nodes. It only records which kind of
//! derived state went stale and stamps the node with a fresh invalidation id,
//! which the render side compares against what it last captured.

use std::sync::atomic::{AtomicU64, Ordering};

bitflags::bitflags! {
    /// Kinds of derived state a mutation can make stale
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Invalidation: u32 {
        /// Matrix and inverse
        const DRAW_INFO = 1 << 0;
        /// Layout size
        const DRAW_SIZE = 1 << 1;
        /// Kind-specific geometry (path vertices, radius)
        const MISC_GEOMETRY = 1 << 2;
        /// Colour or blending
        const COLOUR = 1 << 3;
        /// Texture or shader
        const DRAW_NODE = 1 << 4;
        /// Whether the node takes part in drawing at all
        const PRESENCE = 1 << 5;
        /// Parent link
        const PARENT = 1 << 6;

        /// Everything that depends on the parent's size
        const FROM_PARENT_SIZE = Self::DRAW_SIZE.bits() | Self::DRAW_INFO.bits();
    }
}

static INVALIDATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Take the next process-wide invalidation id
pub(crate) fn next_invalidation_id() -> u64 {
    INVALIDATION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Per-node invalidation bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationState {
    pending: Invalidation,
    id: u64,
}

impl Default for InvalidationState {
    fn default() -> Self {
        Self {
            pending: Invalidation::all(),
            id: next_invalidation_id(),
        }
    }
}

impl InvalidationState {
    /// Record an invalidation; returns false for an empty set
    pub fn invalidate(&mut self, flags: Invalidation) -> bool {
        if flags.is_empty() {
            return false;
        }
        self.pending |= flags;
        self.id = next_invalidation_id();
        true
    }

    /// Flags accumulated since the last [`InvalidationState::take`]
    pub fn pending(&self) -> Invalidation {
        self.pending
    }

    /// Clear and return the accumulated flags
    pub fn take(&mut self) -> Invalidation {
        std::mem::replace(&mut self.pending, Invalidation::empty())
    }

    /// Id stamped by the latest invalidation
    pub fn id(&self) -> u64 {
        self.id
    }
}
