//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BlockId`] - Identifier of a block, unique within its workspace
//! - [`WorkspaceId`] - Identifier of a workspace (one isolated block tree)
//! - [`Declaration`] - One visible name binding, block-backed or primitive
//!
//! # Identity
//!
//! Block and workspace identifiers are minted by the host editor; this crate
//! never synthesizes them. The empty block id is reserved: it is what
//! primitive declarations (built-in names with no backing block) report.

use serde::{Deserialize, Serialize};

/// Identifier of a block, unique within its owning workspace.
///
/// The empty id is reserved for primitive declarations and never refers to a
/// real block.
///
/// # Example
///
/// ```
/// use blockscope::core::types::BlockId;
///
/// let id = BlockId::new("b1");
/// assert_eq!(id.as_str(), "b1");
/// assert!(!id.is_primitive());
/// assert!(BlockId::primitive().is_primitive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Wrap a host-minted block identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved empty id reported by primitive declarations.
    pub fn primitive() -> Self {
        Self(String::new())
    }

    /// Whether this is the reserved primitive id.
    pub fn is_primitive(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a workspace (container) holding one block tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Wrap a host-minted workspace identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One visible name binding in a declaration registry.
///
/// Block-backed declarations never store a display name: the name lives in
/// the block's `name` field and is looked up live, so renaming the block in
/// the editor propagates everywhere. Primitive declarations have no backing
/// block; their stored name is authoritative and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    /// A declaration backed by a live block in a workspace.
    Block {
        /// Identifier of the originating block.
        id: BlockId,
        /// Identifier of the workspace the block belongs to.
        workspace: WorkspaceId,
    },
    /// A built-in binding with no backing block.
    Primitive {
        /// The immutable display name.
        name: String,
    },
}

impl Declaration {
    /// Create a block-backed declaration.
    pub fn block(id: BlockId, workspace: WorkspaceId) -> Self {
        Self::Block { id, workspace }
    }

    /// Create a primitive declaration.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive { name: name.into() }
    }

    /// Whether this declaration has no backing block.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive { .. })
    }

    /// The id of the backing block, or the reserved empty id for primitives.
    pub fn block_id(&self) -> BlockId {
        match self {
            Self::Block { id, .. } => id.clone(),
            Self::Primitive { .. } => BlockId::primitive(),
        }
    }
}
