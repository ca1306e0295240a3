//! Reflection Engine - Component registry and tree derivation.
//!
//! The engine manages the core data structures:
//! - Registry: flat ID → record map, insert/merge/cascade removal
//! - Ordinal: monotonic sequence numbers for deterministic sibling order
//! - Tree: pure rebuild of the ordered component tree and page state
//!
//! # Architecture
//!
//! Components are NOT stored as a tree. The registry is flat and each record
//! only names its parent:
//!
//! ```text
//! form1   (parent=None,    ordinal=0)
//! field1  (parent=form1,   ordinal=1)
//! submit  (parent=form1,   ordinal=2)
//! ```
//!
//! The tree is rebuilt from scratch after every mutation, so it can never
//! drift from the registry.

mod ordinal;
mod registry;
mod tree;

pub use ordinal::*;
pub use registry::*;
pub use tree::*;
