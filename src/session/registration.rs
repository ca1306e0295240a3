//! Registration Handles - What a UI component holds while it is mounted.
//!
//! [`crate::ReflectionSession::register`] returns a [`Registration`] bound to
//! the resolved component ID. The owning component calls
//! [`Registration::update`] from its own state-change handlers and
//! [`Registration::unregister`] when it unmounts.

use std::rc::Rc;

use super::reflection::Shared;
use super::scope::Scope;
use crate::types::{ComponentDraft, ComponentPatch};

/// Cleanup function returned by [`Registration::into_cleanup`].
///
/// Call this to unregister the component and everything below it.
pub type Cleanup = Box<dyn FnOnce()>;

/// DOM attribute UI code stamps with the component ID so drivers can match
/// rendered elements to tree nodes.
pub const AUTOMATION_ID_ATTR: &str = "data-automation-id";

/// The `(attribute, value)` pair for a component ID.
pub fn automation_attr(id: &str) -> (&'static str, &str) {
    (AUTOMATION_ID_ATTR, id)
}

/// Build an ID for a draft that did not bring one.
///
/// `<parent>-<type>-<counter>` inside a parent, `<type>-<counter>` at the top.
pub(crate) fn synthesize_id(parent_id: Option<&str>, type_name: &str, counter: u64) -> String {
    match parent_id {
        Some(parent) => format!("{parent}-{type_name}-{counter}"),
        None => format!("{type_name}-{counter}"),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// A mounted component's link to the session registry.
///
/// Updates after the component (or one of its ancestors) was unregistered
/// are silently ignored.
pub struct Registration {
    shared: Rc<Shared>,
    id: String,
}

impl Registration {
    pub(crate) fn new(shared: Rc<Shared>, id: String) -> Self {
        Self { shared, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Scope for components nested inside this one.
    pub fn scope(&self) -> Scope {
        Scope::within(self.id.clone())
    }

    /// Register a component nested inside this one.
    pub fn register_child(&self, draft: ComponentDraft) -> Registration {
        self.shared.register(&self.scope(), draft)
    }

    /// Shallow-merge `patch` into this component's record.
    ///
    /// Returns `false` if the component is no longer registered.
    pub fn update(&self, patch: ComponentPatch) -> bool {
        self.shared.update(&self.id, patch)
    }

    pub fn is_registered(&self) -> bool {
        self.shared.contains(&self.id)
    }

    /// Unregister this component and all of its descendants.
    ///
    /// Returns the removed IDs; empty if it was already gone.
    pub fn unregister(self) -> Vec<String> {
        self.shared.unregister(&self.id)
    }

    /// Turn the handle into a boxed cleanup function.
    pub fn into_cleanup(self) -> Cleanup {
        Box::new(move || {
            self.unregister();
        })
    }

    /// The automation attribute pair for this component.
    pub fn automation_attr(&self) -> (&'static str, &str) {
        automation_attr(&self.id)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration").field("id", &self.id).finish()
    }
}
