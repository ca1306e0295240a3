//! Component Registry - Flat map of every mounted component.
//!
//! Manages the lifecycle of component records:
//! - Insert on first registration (assigning the next ordinal)
//! - Shallow merge on re-registration and update
//! - Cascading removal of a record and everything below it
//!
//! The registry holds no tree. Children are derived by the tree builder from
//! `parent_id` back-references every time the page is rebuilt.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::ordinal::Sequence;
use crate::types::{ComponentAction, ComponentDraft, ComponentKind, ComponentPatch};

// =============================================================================
// Component Record
// =============================================================================

/// A single registered UI element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub id: String,
    /// Lookup key of the logical parent. Not required to exist.
    pub parent_id: Option<String>,
    /// Assigned once on insert, never changed.
    pub ordinal: u64,
    pub label: Option<String>,
    pub disabled: bool,
    pub actions: Vec<ComponentAction>,
    pub kind: ComponentKind,
}

impl ComponentRecord {
    /// The record's type tag.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// What [`Registry::register`] did with a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// A new record was created with this ordinal.
    Inserted { ordinal: u64 },
    /// An existing record was merged. `type_rejected` is set when the draft
    /// tried to change the record's type.
    Merged { type_rejected: bool },
}

// =============================================================================
// Registry
// =============================================================================

/// Authoritative flat map from component ID to record.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<String, ComponentRecord>,
    ordinals: Sequence,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under `id`.
    ///
    /// `draft.id` is ignored; the caller has already resolved the ID.
    /// An unseen ID is inserted with the next ordinal. A known ID is merged:
    /// label, disabled, actions and parent overwrite when the draft sets
    /// them, and the kind payload is replaced only if the type matches.
    pub fn register(&mut self, id: &str, draft: ComponentDraft) -> Registered {
        let Some(record) = self.records.get_mut(id) else {
            let ordinal = self.ordinals.advance();
            let actions = draft
                .actions
                .unwrap_or_else(|| draft.kind.default_actions());
            debug!(id, kind = draft.kind.type_name(), ordinal, "registered component");
            self.records.insert(
                id.to_string(),
                ComponentRecord {
                    id: id.to_string(),
                    parent_id: draft.parent_id,
                    ordinal,
                    label: draft.label,
                    disabled: draft.disabled.unwrap_or(false),
                    actions,
                    kind: draft.kind,
                },
            );
            return Registered::Inserted { ordinal };
        };

        let type_rejected = !record.kind.same_type(&draft.kind);
        if type_rejected {
            warn!(
                id,
                existing = record.type_name(),
                attempted = draft.kind.type_name(),
                "component type is immutable; keeping original type"
            );
        } else {
            record.kind = draft.kind;
        }
        if draft.parent_id.is_some() {
            record.parent_id = draft.parent_id;
        }
        if draft.label.is_some() {
            record.label = draft.label;
        }
        if let Some(disabled) = draft.disabled {
            record.disabled = disabled;
        }
        if let Some(actions) = draft.actions {
            record.actions = actions;
        }
        debug!(id, "merged component registration");
        Registered::Merged { type_rejected }
    }

    /// Shallow-merge `patch` into the record at `id`.
    ///
    /// Returns `false` (and does nothing) if `id` is not registered.
    /// Type and ordinal are never touched; a kind replacement of another type
    /// and fields foreign to the record's kind are dropped with a warning.
    pub fn update(&mut self, id: &str, patch: ComponentPatch) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            debug!(id, "update for unknown component ignored");
            return false;
        };

        if let Some(kind) = patch.kind {
            if record.kind.same_type(&kind) {
                record.kind = kind;
            } else {
                warn!(
                    id,
                    existing = record.type_name(),
                    attempted = kind.type_name(),
                    "component type is immutable; dropping kind update"
                );
            }
        }
        for field in patch.fields {
            if let Err(field) = record.kind.apply(field) {
                warn!(
                    id,
                    kind = record.type_name(),
                    field = field.name(),
                    "field does not apply to component type; dropped"
                );
            }
        }
        if patch.label.is_some() {
            record.label = patch.label;
        }
        if let Some(disabled) = patch.disabled {
            record.disabled = disabled;
        }
        if let Some(actions) = patch.actions {
            record.actions = actions;
        }
        true
    }

    /// Remove the record at `id` and all of its transitive descendants.
    ///
    /// Returns the removed IDs, `id` first. Empty if `id` is unknown.
    pub fn unregister(&mut self, id: &str) -> Vec<String> {
        if !self.records.contains_key(id) {
            return Vec::new();
        }

        let removed = self.descendants_of(id);
        for removed_id in &removed {
            self.records.remove(removed_id);
        }
        debug!(id, count = removed.len(), "unregistered component subtree");
        removed
    }

    /// `id` plus every record reachable through `parent_id` back-references.
    fn descendants_of(&self, id: &str) -> Vec<String> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for record in self.records.values() {
            if let Some(parent) = record.parent_id.as_deref() {
                children.entry(parent).or_default().push(record.id.as_str());
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            // Guards against parent cycles.
            if !seen.insert(current) {
                continue;
            }
            out.push(current.to_string());
            if let Some(kids) = children.get(current) {
                stack.extend(kids.iter().copied());
            }
        }
        out
    }

    /// Remove every record. Ordinals keep counting from where they were.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<&ComponentRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// All records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldValue};

    fn draft(kind: ComponentKind) -> ComponentDraft {
        ComponentDraft::new(kind)
    }

    #[test]
    fn test_register_assigns_ordinals() {
        let mut registry = Registry::new();

        assert_eq!(registry.register("a", draft(ComponentKind::Form)), Registered::Inserted { ordinal: 0 });
        assert_eq!(registry.register("b", draft(ComponentKind::Form)), Registered::Inserted { ordinal: 1 });
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b").map(|r| r.ordinal), Some(1));
    }

    #[test]
    fn test_reregister_is_merge() {
        let mut registry = Registry::new();
        registry.register("x", draft(ComponentKind::button()).label("Save"));
        let outcome = registry.register("x", draft(ComponentKind::button()).disabled(true));

        assert_eq!(outcome, Registered::Merged { type_rejected: false });
        assert_eq!(registry.len(), 1);
        let record = registry.get("x").unwrap();
        assert_eq!(record.ordinal, 0);
        assert_eq!(record.label.as_deref(), Some("Save"));
        assert!(record.disabled);
    }

    #[test]
    fn test_type_is_immutable() {
        let mut registry = Registry::new();
        registry.register("x", draft(ComponentKind::button()));
        let outcome = registry.register("x", draft(ComponentKind::dialog("Oops")).label("y"));

        assert_eq!(outcome, Registered::Merged { type_rejected: true });
        let record = registry.get("x").unwrap();
        assert_eq!(record.type_name(), "button");
        assert_eq!(record.label.as_deref(), Some("y"));
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut registry = Registry::new();
        assert!(!registry.update("ghost", ComponentPatch::new().label("boo")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_merges_fields() {
        let mut registry = Registry::new();
        registry.register("field1", draft(ComponentKind::text_field()).label("Name"));

        assert!(registry.update("field1", ComponentPatch::value("abc")));
        let record = registry.get("field1").unwrap();
        assert_eq!(record.label.as_deref(), Some("Name"));
        assert_eq!(record.ordinal, 0);
        assert!(matches!(
            &record.kind,
            ComponentKind::FormField { value: FieldValue::Text(v), .. } if v == "abc"
        ));
    }

    #[test]
    fn test_update_drops_foreign_kind_and_fields() {
        let mut registry = Registry::new();
        registry.register("x", draft(ComponentKind::button()));

        let patch = ComponentPatch::new()
            .kind(ComponentKind::Form)
            .field(Field::Open(true))
            .label("still applied");
        assert!(registry.update("x", patch));

        let record = registry.get("x").unwrap();
        assert_eq!(record.kind, ComponentKind::button());
        assert_eq!(record.label.as_deref(), Some("still applied"));
    }

    #[test]
    fn test_unregister_cascades() {
        let mut registry = Registry::new();
        registry.register("root", draft(ComponentKind::Container));
        registry.register("child", draft(ComponentKind::Form).parent("root"));
        registry.register("grandchild", draft(ComponentKind::text_field()).parent("child"));
        registry.register("other", draft(ComponentKind::button()));

        let removed = registry.unregister("root");
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], "root");
        assert!(!registry.contains("child"));
        assert!(!registry.contains("grandchild"));
        assert!(registry.contains("other"));
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut registry = Registry::new();
        registry.register("a", draft(ComponentKind::Form));
        assert!(registry.unregister("missing").is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_survives_parent_cycle() {
        let mut registry = Registry::new();
        registry.register("a", draft(ComponentKind::Container).parent("b"));
        registry.register("b", draft(ComponentKind::Container).parent("a"));

        let removed = registry.unregister("a");
        assert_eq!(removed.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_after_unregister_gets_new_ordinal() {
        let mut registry = Registry::new();
        registry.register("a", draft(ComponentKind::Form));
        registry.unregister("a");

        assert_eq!(registry.register("a", draft(ComponentKind::Form)), Registered::Inserted { ordinal: 1 });
    }

    #[test]
    fn test_default_actions_fill_in() {
        let mut registry = Registry::new();
        registry.register("b", draft(ComponentKind::button()));
        registry.register("c", draft(ComponentKind::button()).actions(Vec::new()));

        assert_eq!(registry.get("b").unwrap().actions, vec![ComponentAction::Click]);
        assert!(registry.get("c").unwrap().actions.is_empty());
    }
}
