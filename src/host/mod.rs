//! host
//!
//! Boundary traits for the host editor's block/workspace object model.
//!
//! # Design
//!
//! The host editor owns the block tree; this crate never does. The
//! [`Workspace`] trait is the read-only capability set the core consumes
//! (parent, children, field values, flyout membership), and the [`Host`]
//! trait is the set of registration points the configurator writes into
//! (block kinds, event listeners, dropdown providers, toolbox categories).
//!
//! Everything is synchronous: the host editor's event model is
//! single-threaded and callback-driven, so providers and listeners are
//! plain `Rc` closures with no suspension points.
//!
//! # Modules
//!
//! - [`mock`]: In-memory workspace/host implementation for deterministic
//!   testing.

pub mod mock;

use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::core::types::{BlockId, WorkspaceId};

/// Name of the block field holding a declaration's display name.
pub const FIELD_NAME: &str = "name";

/// Name of the block field holding a declaration's read-only flag.
///
/// The host renders this as a checkbox whose serialized value is the string
/// `"TRUE"` or `"FALSE"`.
pub const FIELD_READONLY: &str = "readonly";

/// Read-only queries against one workspace's block tree.
///
/// Implementations are views into host-owned state; the core only ever
/// reads through this trait and never assumes ownership of the tree.
pub trait Workspace {
    /// Identifier of this workspace.
    fn workspace_id(&self) -> WorkspaceId;

    /// Whether a block with this id exists in the workspace.
    fn contains(&self, block: &BlockId) -> bool;

    /// The parent of a block, if it has one and the block exists.
    fn parent(&self, block: &BlockId) -> Option<BlockId>;

    /// The children of a block, in depth-first render order.
    ///
    /// Unknown blocks yield an empty list.
    fn children(&self, block: &BlockId) -> Vec<BlockId>;

    /// The parentless blocks of the workspace, in render order.
    fn top_level_blocks(&self) -> Vec<BlockId>;

    /// The value of a named field on a block, if the block and field exist.
    fn field_value(&self, block: &BlockId, field: &str) -> Option<String>;

    /// Whether the block lives in a flyout/template palette.
    ///
    /// Palette blocks are drag-source templates and must never be
    /// registered as declarations.
    fn in_flyout(&self, block: &BlockId) -> bool;
}

/// A lifecycle event raised by the host for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent {
    /// A block finished being created in the workspace.
    Created {
        /// The affected block.
        block: BlockId,
        /// Type name of the block's kind.
        kind: String,
    },
    /// A block was removed from the workspace.
    Disposed {
        /// The affected block.
        block: BlockId,
        /// Type name of the block's kind.
        kind: String,
    },
}

impl BlockEvent {
    /// Type name of the affected block's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Created { kind, .. } | Self::Disposed { kind, .. } => kind,
        }
    }
}

/// One entry in a dropdown menu on a getter/setter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    /// Human-visible text (the declaration's display name).
    pub label: String,
    /// Stable value stored in the field: the backing block's id, or the
    /// primitive's name when there is no backing block.
    pub value: String,
}

/// A field or input slot in a block-kind definition.
///
/// Positional: the n-th argument binds to the `%n` placeholder in the kind's
/// message template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockArg {
    /// An editable text field.
    TextField {
        /// Field name.
        name: String,
        /// Initial text.
        default: String,
    },
    /// A checkbox field serializing to `"TRUE"`/`"FALSE"`.
    CheckboxField {
        /// Field name.
        name: String,
        /// Initial state.
        default: bool,
    },
    /// A dropdown whose options are produced live by a registered provider.
    DynamicDropdown {
        /// Field name.
        name: String,
    },
    /// A socket accepting a value block.
    ValueInput {
        /// Input name.
        name: String,
        /// Optional type-check constraint.
        check: Option<String>,
    },
}

/// Definition of one block kind, handed to the host as a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockKind {
    /// Type name, unique across the host's block-kind registry.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Message template with `%n` placeholders for the args.
    pub message: String,
    /// Fields and inputs, in placeholder order.
    pub args: Vec<BlockArg>,
    /// Display hue in degrees, `0..=360`.
    pub colour: u16,
    /// Hover tooltip.
    pub tooltip: String,
    /// Whether the block has a previous-statement connector.
    pub has_previous: bool,
    /// Whether the block has a next-statement connector.
    pub has_next: bool,
    /// Output type-check for value blocks; `None` for statement blocks,
    /// `Some(None)` for an untyped output.
    pub output: Option<Option<String>>,
}

impl BlockKind {
    /// Serialize the definition to the JSON document the host consumes.
    pub fn to_json(&self) -> serde_json::Value {
        // Serialize of a struct with no maps cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Errors from host registration points.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// A block kind with this type name is already registered.
    #[error("block kind '{0}' is already registered")]
    DuplicateKind(String),

    /// A toolbox category with this name is already registered.
    #[error("toolbox category '{0}' is already registered")]
    DuplicateCategory(String),
}

/// Listener invoked for every block lifecycle event.
pub type BlockListener = Rc<dyn Fn(&dyn Workspace, &BlockEvent)>;

/// Provider producing dropdown options for one block kind's `name` field.
pub type DropdownProvider = Rc<dyn Fn(&dyn Workspace, &BlockId) -> Vec<DropdownOption>>;

/// Provider producing toolbox category markup on demand.
pub type CategoryProvider = Rc<dyn Fn(&dyn Workspace) -> String>;

/// Registration points the configurator writes into.
///
/// Only the configurator calls these; the core holds no global state and
/// writes nothing into the host.
pub trait Host {
    /// Register a block-kind definition.
    fn register_block_kind(&mut self, kind: BlockKind) -> Result<(), HostError>;

    /// Register a listener for block lifecycle events.
    fn register_listener(&mut self, listener: BlockListener);

    /// Register the dropdown provider for a block kind's `name` field.
    fn register_dropdown_provider(&mut self, block_type: &str, provider: DropdownProvider);

    /// Register a toolbox category content provider under a category name.
    fn register_category(
        &mut self,
        category: &str,
        provider: CategoryProvider,
    ) -> Result<(), HostError>;
}
