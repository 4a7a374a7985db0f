//! host::mock
//!
//! In-memory workspace/host implementation for deterministic testing.
//!
//! # Design
//!
//! [`MockWorkspace`] implements both [`Workspace`] and [`Host`]: it holds a
//! block tree built with explicit ids, records every registration the
//! configurator performs, and can fire lifecycle events and invoke the
//! registered providers the way a real editor would.
//!
//! # Example
//!
//! ```
//! use blockscope::host::mock::MockWorkspace;
//! use blockscope::host::Workspace;
//!
//! let mut ws = MockWorkspace::new("ws-1");
//! let root = ws.add_block("root", "controls_if");
//! let child = ws.add_child(&root, "child", "local_declare");
//!
//! assert_eq!(ws.parent(&child), Some(root.clone()));
//! assert_eq!(ws.children(&root), vec![child]);
//! ```

use std::collections::HashMap;

use crate::core::types::{BlockId, WorkspaceId};

use super::{
    BlockEvent, BlockKind, BlockListener, CategoryProvider, DropdownOption, DropdownProvider,
    Host, HostError, Workspace,
};

/// One block in the mock tree.
#[derive(Debug, Default)]
struct MockBlock {
    kind: String,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
    fields: HashMap<String, String>,
    in_flyout: bool,
}

/// In-memory workspace and host for tests and doc examples.
#[derive(Default)]
pub struct MockWorkspace {
    id: String,
    blocks: HashMap<BlockId, MockBlock>,
    top_level: Vec<BlockId>,
    kinds: HashMap<String, BlockKind>,
    listeners: Vec<BlockListener>,
    dropdowns: HashMap<String, DropdownProvider>,
    categories: HashMap<String, CategoryProvider>,
}

impl MockWorkspace {
    /// Create an empty workspace with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add a top-level block and return its id.
    pub fn add_block(&mut self, id: &str, kind: &str) -> BlockId {
        let id = BlockId::new(id);
        self.blocks.insert(
            id.clone(),
            MockBlock {
                kind: kind.to_string(),
                ..MockBlock::default()
            },
        );
        self.top_level.push(id.clone());
        id
    }

    /// Add a block as the last child of `parent` and return its id.
    pub fn add_child(&mut self, parent: &BlockId, id: &str, kind: &str) -> BlockId {
        let id = BlockId::new(id);
        self.blocks.insert(
            id.clone(),
            MockBlock {
                kind: kind.to_string(),
                parent: Some(parent.clone()),
                ..MockBlock::default()
            },
        );
        if let Some(block) = self.blocks.get_mut(parent) {
            block.children.push(id.clone());
        }
        id
    }

    /// Overwrite a block's parent pointer without touching child lists.
    ///
    /// Lets tests build the pathological trees (cycles, orphaned sibling
    /// lists) the scope walk must survive.
    pub fn set_parent(&mut self, block: &BlockId, parent: Option<BlockId>) {
        if let Some(b) = self.blocks.get_mut(block) {
            b.parent = parent;
        }
    }

    /// Set a field value on a block.
    pub fn set_field(&mut self, block: &BlockId, field: &str, value: &str) {
        if let Some(b) = self.blocks.get_mut(block) {
            b.fields.insert(field.to_string(), value.to_string());
        }
    }

    /// Mark a block as living in a flyout palette.
    pub fn set_in_flyout(&mut self, block: &BlockId, in_flyout: bool) {
        if let Some(b) = self.blocks.get_mut(block) {
            b.in_flyout = in_flyout;
        }
    }

    /// Remove a block from the tree (children are detached, not removed).
    pub fn remove_block(&mut self, block: &BlockId) {
        if let Some(removed) = self.blocks.remove(block) {
            for child in &removed.children {
                if let Some(c) = self.blocks.get_mut(child) {
                    c.parent = None;
                }
            }
        }
        self.top_level.retain(|b| b != block);
        for b in self.blocks.values_mut() {
            b.children.retain(|c| c != block);
        }
    }

    /// Fire a created event for a block, as the editor does after creation.
    pub fn fire_created(&self, block: &BlockId) {
        self.fire(BlockEvent::Created {
            block: block.clone(),
            kind: self.kind_of(block),
        });
    }

    /// Fire a disposed event for a block.
    ///
    /// The kind must be passed explicitly because real editors raise this
    /// after the block is already gone from the tree.
    pub fn fire_disposed(&self, block: &BlockId, kind: &str) {
        self.fire(BlockEvent::Disposed {
            block: block.clone(),
            kind: kind.to_string(),
        });
    }

    fn fire(&self, event: BlockEvent) {
        let listeners: Vec<BlockListener> = self.listeners.to_vec();
        for listener in listeners {
            listener(self, &event);
        }
    }

    fn kind_of(&self, block: &BlockId) -> String {
        self.blocks
            .get(block)
            .map(|b| b.kind.clone())
            .unwrap_or_default()
    }

    /// Invoke the registered dropdown provider for a block kind.
    pub fn dropdown_for(&self, block_type: &str, block: &BlockId) -> Option<Vec<DropdownOption>> {
        self.dropdowns
            .get(block_type)
            .map(|provider| provider(self, block))
    }

    /// Invoke the registered category provider, as on toolbox open.
    pub fn open_category(&self, category: &str) -> Option<String> {
        self.categories.get(category).map(|provider| provider(self))
    }

    /// Look up a registered block-kind definition.
    pub fn block_kind(&self, type_name: &str) -> Option<&BlockKind> {
        self.kinds.get(type_name)
    }

    /// Number of registered block kinds.
    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }
}

impl Workspace for MockWorkspace {
    fn workspace_id(&self) -> WorkspaceId {
        WorkspaceId::new(self.id.clone())
    }

    fn contains(&self, block: &BlockId) -> bool {
        self.blocks.contains_key(block)
    }

    fn parent(&self, block: &BlockId) -> Option<BlockId> {
        self.blocks.get(block).and_then(|b| b.parent.clone())
    }

    fn children(&self, block: &BlockId) -> Vec<BlockId> {
        self.blocks
            .get(block)
            .map(|b| b.children.clone())
            .unwrap_or_default()
    }

    fn top_level_blocks(&self) -> Vec<BlockId> {
        self.top_level.clone()
    }

    fn field_value(&self, block: &BlockId, field: &str) -> Option<String> {
        self.blocks
            .get(block)
            .and_then(|b| b.fields.get(field).cloned())
    }

    fn in_flyout(&self, block: &BlockId) -> bool {
        self.blocks.get(block).map(|b| b.in_flyout).unwrap_or(false)
    }
}

impl Host for MockWorkspace {
    fn register_block_kind(&mut self, kind: BlockKind) -> Result<(), HostError> {
        if self.kinds.contains_key(&kind.type_name) {
            return Err(HostError::DuplicateKind(kind.type_name));
        }
        self.kinds.insert(kind.type_name.clone(), kind);
        Ok(())
    }

    fn register_listener(&mut self, listener: BlockListener) {
        self.listeners.push(listener);
    }

    fn register_dropdown_provider(&mut self, block_type: &str, provider: DropdownProvider) {
        self.dropdowns.insert(block_type.to_string(), provider);
    }

    fn register_category(
        &mut self,
        category: &str,
        provider: CategoryProvider,
    ) -> Result<(), HostError> {
        if self.categories.contains_key(category) {
            return Err(HostError::DuplicateCategory(category.to_string()));
        }
        self.categories.insert(category.to_string(), provider);
        Ok(())
    }
}
