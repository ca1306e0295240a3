//! Core types for ui-reflection.
//!
//! These types define what a registered component looks like on the wire and
//! how it can change after registration. Everything here is plain data; the
//! registry and tree builder in [`crate::engine`] give it meaning.

use serde::{Deserialize, Serialize};

// =============================================================================
// Component Kind
// =============================================================================

/// What kind of UI element a record describes, with the fields that matter
/// for that kind.
///
/// Serialized internally tagged under `"type"`, so a form field becomes
/// `{"type": "formField", "fieldType": "textField", "value": "", ...}`.
/// The kind of a record is fixed at first registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ComponentKind {
    Button {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<String>,
    },
    Dialog {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        open: bool,
    },
    Form,
    FormField {
        field_type: FieldType,
        #[serde(default)]
        value: FieldValue,
        #[serde(default)]
        required: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<SelectOption>,
    },
    DataTable {
        #[serde(default)]
        columns: Vec<Column>,
        #[serde(default)]
        row_count: usize,
        #[serde(default)]
        visible_rows: Vec<TableRow>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pagination: Option<Pagination>,
    },
    Navigation {
        #[serde(default)]
        items: Vec<NavItem>,
        #[serde(default)]
        expanded: bool,
    },
    Container,
    Card {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Drawer {
        #[serde(default)]
        open: bool,
    },
    DatePicker {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default)]
        required: bool,
    },
}

impl ComponentKind {
    /// A text form field with an empty value.
    pub fn text_field() -> Self {
        Self::FormField {
            field_type: FieldType::TextField,
            value: FieldValue::default(),
            required: false,
            options: Vec::new(),
        }
    }

    /// A button with no variant.
    pub fn button() -> Self {
        Self::Button { variant: None }
    }

    /// A closed dialog with the given title.
    pub fn dialog(title: impl Into<String>) -> Self {
        Self::Dialog { title: Some(title.into()), open: false }
    }

    /// The wire tag for this kind (`"formField"`, `"dataTable"`, ...).
    ///
    /// Also used when synthesizing component IDs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Button { .. } => "button",
            Self::Dialog { .. } => "dialog",
            Self::Form => "form",
            Self::FormField { .. } => "formField",
            Self::DataTable { .. } => "dataTable",
            Self::Navigation { .. } => "navigation",
            Self::Container => "container",
            Self::Card { .. } => "card",
            Self::Drawer { .. } => "drawer",
            Self::DatePicker { .. } => "datePicker",
        }
    }

    /// Check if `other` is the same kind, ignoring payload.
    pub fn same_type(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Automation actions a driver can perform on this kind by default.
    pub fn default_actions(&self) -> Vec<ComponentAction> {
        use ComponentAction::*;
        match self {
            Self::Button { .. } => vec![Click],
            Self::Dialog { .. } | Self::Drawer { .. } => vec![Open, Close],
            Self::Form | Self::Container | Self::Card { .. } => Vec::new(),
            Self::FormField { field_type, .. } => match field_type {
                FieldType::Checkbox => vec![Toggle],
                FieldType::Select | FieldType::RadioGroup => vec![Select],
                FieldType::TextField | FieldType::TextArea | FieldType::Number => vec![Type],
            },
            Self::DataTable { .. } => vec![Sort, Paginate],
            Self::Navigation { .. } => vec![Navigate],
            Self::DatePicker { .. } => vec![Type, Open],
        }
    }

    /// Apply a single field edit.
    ///
    /// Returns the field back when it does not apply to this kind.
    pub fn apply(&mut self, field: Field) -> Result<(), Field> {
        match (self, field) {
            (Self::FormField { field_type, value, .. }, Field::Value(v)) if field_type.accepts(&v) => *value = v,
            (Self::DatePicker { value, .. }, Field::Value(FieldValue::Text(v))) => *value = Some(v),
            (Self::FormField { field_type: FieldType::Checkbox, value, .. }, Field::Checked(c)) => {
                *value = FieldValue::Bool(c)
            }
            (Self::FormField { required, .. } | Self::DatePicker { required, .. }, Field::Required(r)) => {
                *required = r
            }
            (Self::FormField { options, .. }, Field::Options(o)) => *options = o,
            (Self::Dialog { open, .. } | Self::Drawer { open }, Field::Open(o)) => *open = o,
            (Self::Dialog { title, .. } | Self::Card { title }, Field::Title(t)) => *title = t,
            (Self::DataTable { row_count, .. }, Field::RowCount(n)) => *row_count = n,
            (Self::DataTable { visible_rows, .. }, Field::VisibleRows(rows)) => *visible_rows = rows,
            (Self::DataTable { pagination, .. }, Field::Pagination(p)) => *pagination = p,
            (Self::Navigation { items, .. }, Field::Items(i)) => *items = i,
            (Self::Navigation { expanded, .. }, Field::Expanded(e)) => *expanded = e,
            (Self::Button { variant }, Field::Variant(v)) => *variant = v,
            (_, field) => return Err(field),
        }
        Ok(())
    }
}

// =============================================================================
// Kind Payload Types
// =============================================================================

/// Input flavour of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    TextField,
    TextArea,
    Number,
    Select,
    Checkbox,
    RadioGroup,
}

impl FieldType {
    /// Whether a field of this type can hold `value`.
    ///
    /// Number fields also take text so half-typed input like `"12."` can be
    /// reflected as the user sees it.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Self::TextField | Self::TextArea | Self::RadioGroup, FieldValue::Text(_)) => true,
            (Self::Number, FieldValue::Number(_) | FieldValue::Text(_)) => true,
            (Self::Select, FieldValue::Text(_) | FieldValue::List(_)) => true,
            (Self::Checkbox, FieldValue::Bool(_)) => true,
            _ => false,
        }
    }
}

/// Current value of a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Number(f64),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sortable: bool,
}

/// A row currently rendered by a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Something an automation driver may do to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentAction {
    Click,
    Type,
    Select,
    Toggle,
    Open,
    Close,
    Navigate,
    Sort,
    Paginate,
}

// =============================================================================
// Field Edits
// =============================================================================

/// A single kind-specific field change carried by a [`ComponentPatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Value(FieldValue),
    Checked(bool),
    Required(bool),
    Options(Vec<SelectOption>),
    Open(bool),
    Title(Option<String>),
    RowCount(usize),
    VisibleRows(Vec<TableRow>),
    Pagination(Option<Pagination>),
    Items(Vec<NavItem>),
    Expanded(bool),
    Variant(Option<String>),
}

impl Field {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Checked(_) => "checked",
            Self::Required(_) => "required",
            Self::Options(_) => "options",
            Self::Open(_) => "open",
            Self::Title(_) => "title",
            Self::RowCount(_) => "rowCount",
            Self::VisibleRows(_) => "visibleRows",
            Self::Pagination(_) => "pagination",
            Self::Items(_) => "items",
            Self::Expanded(_) => "expanded",
            Self::Variant(_) => "variant",
        }
    }
}

// =============================================================================
// Drafts and Patches
// =============================================================================

/// What a component hands over when it registers.
///
/// `id` and `parent_id` are optional: a missing id is synthesized and a
/// missing parent is taken from the enclosing [`crate::session::Scope`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDraft {
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub label: Option<String>,
    pub disabled: Option<bool>,
    pub actions: Option<Vec<ComponentAction>>,
    pub kind: ComponentKind,
}

impl ComponentDraft {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            id: None,
            parent_id: None,
            label: None,
            disabled: None,
            actions: None,
            kind,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn actions(mut self, actions: impl Into<Vec<ComponentAction>>) -> Self {
        self.actions = Some(actions.into());
        self
    }
}

/// A partial update to an already registered component.
///
/// Only the fields that are set are applied. `kind` replaces the whole
/// payload but only when it has the same type as the record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentPatch {
    pub label: Option<String>,
    pub disabled: Option<bool>,
    pub actions: Option<Vec<ComponentAction>>,
    pub kind: Option<ComponentKind>,
    pub fields: Vec<Field>,
}

impl ComponentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn actions(mut self, actions: impl Into<Vec<ComponentAction>>) -> Self {
        self.actions = Some(actions.into());
        self
    }

    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Shorthand for a patch that only sets a field value.
    pub fn value(value: impl Into<FieldValue>) -> Self {
        Self::new().field(Field::Value(value.into()))
    }
}

// =============================================================================
// Page Metadata
// =============================================================================

/// Page-level metadata published alongside the component tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl PageMeta {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
