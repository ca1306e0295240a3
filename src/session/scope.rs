//! Parent Scope - Explicit "current parent" value for nested registration.
//!
//! Instead of an ambient stack, the enclosing component's scope is passed
//! down by value. A component that wraps children hands them its own scope
//! (see [`crate::session::Registration::scope`]); components registered with
//! that scope attach to it unless they name a parent explicitly.
//!
//! # Example
//!
//! ```ignore
//! let form = session.register(&Scope::root(), ComponentDraft::new(ComponentKind::Form));
//! let field = session.register(&form.scope(), ComponentDraft::new(ComponentKind::text_field()));
//! assert_eq!(field.id(), "form-0-formField-1");
//! ```

/// The ID of the nearest enclosing registered component, or none at the top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    parent: Option<String>,
}

impl Scope {
    /// Top-level scope: registrations become roots.
    pub const fn root() -> Self {
        Self { parent: None }
    }

    /// Scope whose children attach to `parent_id`.
    pub fn within(parent_id: impl Into<String>) -> Self {
        Self {
            parent: Some(parent_id.into()),
        }
    }

    /// The parent ID children registered in this scope will get.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
