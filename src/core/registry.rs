//! core::registry
//!
//! The ordered declaration registry for one configured block family.
//!
//! # Invariants
//!
//! - Entries keep insertion order; order decides tie-breaking and display
//!   order in menus and toolbox categories.
//! - No two block-backed entries share a block id (`declare` is idempotent).
//! - Primitive entries are seeded once at setup and never removed.
//!
//! # Error policy
//!
//! Mutations run inside host UI callbacks and never error: invalid input is
//! a silent no-op. See [`crate::core::scope`] for the matching fail-open
//! rules on the query side.

use tracing::debug;

use crate::core::scope;
use crate::core::types::{BlockId, Declaration};
use crate::host::{Workspace, FIELD_NAME};

/// Predicate over a resolved block, used to exclude entries from category
/// markup (e.g. setters exclude read-only declarations).
pub type BlockFilter<'a> = &'a dyn Fn(&dyn Workspace, &BlockId) -> bool;

/// Ordered collection of the declarations of one block family.
///
/// # Example
///
/// ```
/// use blockscope::core::registry::DeclarationRegistry;
/// use blockscope::core::types::Declaration;
/// use blockscope::host::mock::MockWorkspace;
///
/// let mut ws = MockWorkspace::new("ws");
/// let block = ws.add_block("b1", "local_declare");
///
/// let mut registry = DeclarationRegistry::new();
/// registry.add_initial_values([Declaration::primitive("PI")]);
/// registry.declare(&ws, &block);
///
/// assert_eq!(registry.len(), 2);
/// assert!(registry.contains_block(&block));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationRegistry {
    entries: Vec<Declaration>,
}

impl DeclarationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no declarations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The declarations in registration order.
    pub fn entries(&self) -> &[Declaration] {
        &self.entries
    }

    /// Whether a block-backed entry with this id exists.
    pub fn contains_block(&self, block: &BlockId) -> bool {
        self.entries
            .iter()
            .any(|decl| matches!(decl, Declaration::Block { id, .. } if id == block))
    }

    /// Append a batch of pre-existing declarations, in order.
    ///
    /// Meant for seeding primitives at setup time; performs no duplicate
    /// validation.
    pub fn add_initial_values(&mut self, entries: impl IntoIterator<Item = Declaration>) {
        self.entries.extend(entries);
    }

    /// Register a block as a new declaration.
    ///
    /// No-ops when the block does not exist in the workspace, lives in a
    /// flyout palette, or is already registered (the created hook can fire
    /// more than once for the same block).
    pub fn declare(&mut self, ws: &dyn Workspace, block: &BlockId) {
        if !ws.contains(block) || ws.in_flyout(block) {
            return;
        }
        if self.contains_block(block) {
            return;
        }
        debug!(
            block = %block,
            name = ws.field_value(block, FIELD_NAME).as_deref().unwrap_or(""),
            "registering declaration"
        );
        self.entries
            .push(Declaration::block(block.clone(), ws.workspace_id()));
    }

    /// Remove the block-backed entry with this id, if any.
    ///
    /// Primitive entries are never removed; the reserved empty id matches
    /// nothing.
    pub fn undeclare(&mut self, block: &BlockId) {
        let before = self.entries.len();
        self.entries
            .retain(|decl| !matches!(decl, Declaration::Block { id, .. } if id == block));
        if self.entries.len() != before {
            debug!(block = %block, "removed declaration");
        }
    }

    /// The declarations visible from `block`'s tree position.
    ///
    /// Innermost scope first; see [`crate::core::scope`] for the algorithm
    /// and its fail-open rules.
    pub fn accessible_declarations(&self, ws: &dyn Workspace, block: &BlockId) -> Vec<Declaration> {
        scope::accessible_declarations(self, ws, block)
    }

    /// Project the registry into toolbox block-template markup.
    ///
    /// Emits one `<block type="..."><field name="name">...</field></block>`
    /// fragment per entry, in registry order. Primitive entries bypass the
    /// filter (there is no block to test) and render their stored name;
    /// block-backed entries resolve their block, apply `filter`, and render
    /// the live `name` field value. Entries whose block no longer resolves
    /// are skipped.
    pub fn category_xml(
        &self,
        ws: &dyn Workspace,
        block_type: &str,
        filter: Option<BlockFilter<'_>>,
    ) -> String {
        let mut xml = String::new();
        for decl in &self.entries {
            let name = match decl {
                Declaration::Primitive { name } => name.clone(),
                Declaration::Block { id, .. } => {
                    if !ws.contains(id) {
                        continue;
                    }
                    if let Some(filter) = filter {
                        if !filter(ws, id) {
                            continue;
                        }
                    }
                    ws.field_value(id, FIELD_NAME).unwrap_or_default()
                }
            };
            xml.push_str(&format!(
                "<block type=\"{}\"><field name=\"{}\">{}</field></block>",
                escape_xml(block_type),
                FIELD_NAME,
                escape_xml(&name)
            ));
        }
        xml
    }
}

/// Escape text for use in markup content and attribute values.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
