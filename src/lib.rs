//! Familiar Schema Builder
//!
//! The document model behind the visual JSON Schema editor: an ordered,
//! recursive schema tree, the edits the editor applies to it, and the checks
//! and inference that run against it.
//!
//! ## Features
//!
//! - **Ordered Model**: Property order is visual order and survives every edit
//! - **Persistent Edits**: Each edit returns a new tree sharing untouched subtrees
//! - **Self-Consistency Tree**: Per-node definition conflicts with rolled-up counts
//! - **Instance Validation**: Draft 7 validation with line/column for each error
//! - **Inference**: A schema from one or more example documents
//!
//! ## Data Flow
//!
//! ```text
//! edit event ──> editor::* ──> new SchemaNode ──> build_validation_tree ──> badges
//!                                   │
//!   candidate JSON text ────────────┴──> validate_json ──> errors with line:column
//!
//!   example JSON ──> infer_schema ──> replacement SchemaNode
//! ```
//!
//! All entry points are synchronous and pure; debouncing and memoization are
//! the caller's business.

pub mod config;
pub mod editor;
pub mod error;
pub mod infer;
pub mod messages;
pub mod schema;
pub mod validation;

pub use config::{BuilderConfig, InferenceConfig, MessagesConfig, ValidationConfig};
pub use editor::{
    add_field, edit_field, field_schema_of, items_of, properties_of, remove_property,
    rename_property, reorder_property, set_description, set_items, set_kind, set_property,
    set_required, FieldDraft, PropertyEntry,
};
pub use error::{Result, SchemaError};
pub use infer::{infer_from_samples, infer_schema, Inferrer};
pub use messages::{Locale, MessageCatalog, MessageKey, MessageTable};
pub use schema::{SchemaKind, SchemaNode, TypedNode};
pub use validation::{
    build_validation_tree, validate_json, InstanceValidator, ValidationError, ValidationResult,
    ValidationTreeNode,
};
