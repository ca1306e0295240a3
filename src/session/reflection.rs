//! Reflection Session - One explicitly owned registry per page session.
//!
//! The session owns the registry, the ID counter and page metadata, and
//! publishes the rebuilt [`PageState`] through a signal after every change.
//! Anything that wants to observe the page (the outbound sync channel, a
//! test) subscribes to that signal with an effect.
//!
//! # Example
//!
//! ```ignore
//! use ui_reflection::{ReflectionSession, PageMeta, Scope, ComponentDraft, ComponentKind, ComponentPatch};
//!
//! let session = ReflectionSession::new(PageMeta::new("invoices", "Invoices", "/billing/invoices"));
//! let form = session.register(&Scope::root(), ComponentDraft::new(ComponentKind::Form).id("form1"));
//! let field = form.register_child(ComponentDraft::new(ComponentKind::text_field()).id("field1"));
//!
//! field.update(ComponentPatch::value("abc"));
//! assert!(session.page().find("field1").is_some());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{effect, signal, Signal};
use tracing::debug;

use super::registration::{synthesize_id, Cleanup, Registration};
use super::scope::Scope;
use crate::engine::{PageState, Registry, Sequence};
use crate::sync::SyncHandle;
use crate::types::{ComponentDraft, ComponentPatch, PageMeta};

// =============================================================================
// Shared State
// =============================================================================

struct SessionState {
    meta: PageMeta,
    registry: Registry,
    ids: Sequence,
}

/// State shared between the session and its registration handles.
pub(crate) struct Shared {
    state: RefCell<SessionState>,
    page: Signal<PageState>,
    listeners: RefCell<Vec<Cleanup>>,
    /// Set when the owning session is dropped. Handles that outlive it
    /// must not grow the torn-down registry.
    closed: Cell<bool>,
}

impl Shared {
    /// Run a registry mutation, then republish if it changed anything.
    ///
    /// The state borrow is released before the signal is set, so effects
    /// that run on publish may read the session freely.
    fn mutate<R>(&self, f: impl FnOnce(&mut SessionState) -> (R, bool)) -> R {
        let (result, page) = {
            let mut state = self.state.borrow_mut();
            let (result, changed) = f(&mut state);
            let page = changed.then(|| PageState::build(&state.meta, &state.registry));
            (result, page)
        };
        if let Some(page) = page {
            self.page.set(page);
        }
        result
    }

    pub(crate) fn register(self: &Rc<Self>, scope: &Scope, draft: ComponentDraft) -> Registration {
        if self.closed.get() {
            let id = draft.id.unwrap_or_default();
            debug!(id = %id, kind = draft.kind.type_name(), "session ended, registration ignored");
            return Registration::new(Rc::clone(self), id);
        }
        let id = self.mutate(|state| {
            let parent_id = draft
                .parent_id
                .clone()
                .or_else(|| scope.parent_id().map(str::to_string));
            let id = match &draft.id {
                Some(id) => id.clone(),
                None => synthesize_id(parent_id.as_deref(), draft.kind.type_name(), state.ids.advance()),
            };
            let draft = ComponentDraft { parent_id, ..draft };
            state.registry.register(&id, draft);
            (id, true)
        });
        Registration::new(Rc::clone(self), id)
    }

    pub(crate) fn update(&self, id: &str, patch: ComponentPatch) -> bool {
        if self.closed.get() {
            debug!(id, "session ended, update ignored");
            return false;
        }
        self.mutate(|state| {
            let applied = state.registry.update(id, patch);
            (applied, applied)
        })
    }

    pub(crate) fn unregister(&self, id: &str) -> Vec<String> {
        if self.closed.get() {
            debug!(id, "session ended, unregister ignored");
            return Vec::new();
        }
        self.mutate(|state| {
            let removed = state.registry.unregister(id);
            let changed = !removed.is_empty();
            (removed, changed)
        })
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.state.borrow().registry.contains(id)
    }
}

// =============================================================================
// Session
// =============================================================================

/// A page session: registry, published page state and subscribers.
///
/// Create one at page start and pass it by reference to whatever registers
/// components. Dropping it stops every subscriber and empties the registry;
/// outstanding [`Registration`] handles become no-ops.
pub struct ReflectionSession {
    shared: Rc<Shared>,
}

impl ReflectionSession {
    pub fn new(meta: PageMeta) -> Self {
        let page = signal(PageState::build(&meta, &Registry::new()));
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(SessionState {
                    meta,
                    registry: Registry::new(),
                    ids: Sequence::new(),
                }),
                page,
                listeners: RefCell::new(Vec::new()),
                closed: Cell::new(false),
            }),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a component in `scope`.
    ///
    /// The ID is taken from the draft or synthesized; the parent is taken
    /// from the draft or from `scope`. Registering an ID that already exists
    /// merges into the existing record.
    pub fn register(&self, scope: &Scope, draft: ComponentDraft) -> Registration {
        self.shared.register(scope, draft)
    }

    /// Patch a component by ID. Returns `false` if it is not registered.
    pub fn update(&self, id: &str, patch: ComponentPatch) -> bool {
        self.shared.update(id, patch)
    }

    /// Remove a component and its descendants. Returns the removed IDs.
    pub fn unregister(&self, id: &str) -> Vec<String> {
        self.shared.unregister(id)
    }

    /// Remove every component (page navigation).
    ///
    /// Ordinals and synthesized ID counters keep counting.
    pub fn clear(&self) {
        self.shared.mutate(|state| {
            let changed = !state.registry.is_empty();
            state.registry.clear();
            ((), changed)
        });
    }

    // =========================================================================
    // Page State
    // =========================================================================

    /// Current page state.
    ///
    /// Note: This creates a reactive dependency when called from an effect.
    pub fn page(&self) -> PageState {
        self.shared.page.get()
    }

    /// The signal the page state is published through.
    pub fn page_signal(&self) -> Signal<PageState> {
        self.shared.page.clone()
    }

    pub fn meta(&self) -> PageMeta {
        self.shared.state.borrow().meta.clone()
    }

    /// Replace page metadata (client-side navigation) and republish.
    pub fn set_meta(&self, meta: PageMeta) {
        self.shared.mutate(|state| {
            let changed = state.meta != meta;
            state.meta = meta;
            ((), changed)
        });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.shared.contains(id)
    }

    pub fn len(&self) -> usize {
        self.shared.state.borrow().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.borrow().registry.is_empty()
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Run `f` with the current page state now and after every change.
    ///
    /// The subscription lives until [`ReflectionSession::unsubscribe_all`]
    /// or until the session is dropped.
    pub fn subscribe(&self, mut f: impl FnMut(PageState) + 'static) {
        let page = self.shared.page.clone();
        let stop = effect(move || {
            f(page.get());
        });
        self.shared.listeners.borrow_mut().push(Box::new(stop));
    }

    /// Forward every page state to an outbound sync channel.
    pub fn attach(&self, sync: &SyncHandle) {
        let publisher = sync.publisher();
        self.subscribe(move |page| publisher.publish(page));
    }

    /// Stop every subscriber, including attached sync channels.
    pub fn unsubscribe_all(&self) {
        let listeners = std::mem::take(&mut *self.shared.listeners.borrow_mut());
        for stop in listeners {
            stop();
        }
    }
}

impl Drop for ReflectionSession {
    fn drop(&mut self) {
        self.shared.closed.set(true);
        self.unsubscribe_all();
        let mut state = self.shared.state.borrow_mut();
        debug!(page = %state.meta.id, components = state.registry.len(), "ending reflection session");
        state.registry.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
