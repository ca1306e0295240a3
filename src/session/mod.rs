//! Page Session - Registration API for UI components.
//!
//! This module provides what UI components call:
//! - [`ReflectionSession`] - Owns the registry and publishes page state
//! - [`Scope`] - Explicit parent context handed down to nested components
//! - [`Registration`] - Per-component handle for updates and unmount
//!
//! # Data Flow
//!
//! ```text
//! component mounts → register(scope, draft) → registry → tree rebuild → page signal → subscribers
//! ```

mod reflection;
mod registration;
mod scope;

pub use reflection::ReflectionSession;
pub use registration::{automation_attr, Cleanup, Registration, AUTOMATION_ID_ATTR};
pub use scope::Scope;
