//! Integration tests for the local-declarations plugin.
//!
//! These exercise the full flow a host editor drives: install a family,
//! fire lifecycle events, populate dropdowns, and render the toolbox
//! category.

use blockscope::core::registry::DeclarationRegistry;
use blockscope::core::types::{BlockId, Declaration};
use blockscope::family::{install, FamilyConfig};
use blockscope::host::mock::MockWorkspace;
use blockscope::host::{Workspace, FIELD_NAME, FIELD_READONLY};

// =============================================================================
// Test Fixtures
// =============================================================================

/// A workspace with an installed `local` family.
struct TestEditor {
    host: MockWorkspace,
    registry: std::rc::Rc<std::cell::RefCell<DeclarationRegistry>>,
}

impl TestEditor {
    fn new(config: FamilyConfig) -> Self {
        let mut host = MockWorkspace::new("ws-1");
        let handle = install(&mut host, config).expect("family install failed");
        Self {
            host,
            registry: handle.registry,
        }
    }

    /// Create a top-level declaration block and fire its created event.
    fn declare_top_level(&mut self, id: &str, name: &str) -> BlockId {
        let block = self.host.add_block(id, "local_declare");
        self.host.set_field(&block, FIELD_NAME, name);
        self.host.fire_created(&block);
        block
    }

    /// Create a declaration block under a parent and fire its created event.
    fn declare_under(&mut self, parent: &BlockId, id: &str, name: &str) -> BlockId {
        let block = self.host.add_child(parent, id, "local_declare");
        self.host.set_field(&block, FIELD_NAME, name);
        self.host.fire_created(&block);
        block
    }

    fn visible_labels(&self, block: &BlockId) -> Vec<String> {
        self.host
            .dropdown_for("local_get", block)
            .expect("getter dropdown not registered")
            .into_iter()
            .map(|option| option.label)
            .collect()
    }
}

// =============================================================================
// Scope resolution through the installed family
// =============================================================================

#[test]
fn top_level_query_sees_the_full_registry_in_order() {
    let mut config = FamilyConfig::new("local");
    config.initial_values = vec![Declaration::primitive("PI")];
    let mut editor = TestEditor::new(config);

    editor.declare_top_level("b1", "x");
    editor.declare_top_level("b2", "y");
    let getter = editor.host.add_block("g", "local_get");

    assert_eq!(editor.visible_labels(&getter), ["PI", "x", "y"]);
}

#[test]
fn sibling_position_limits_visibility_within_a_sequence() {
    let mut editor = TestEditor::new(FamilyConfig::new("local"));

    // Nest the sequence so visibility is position-scoped, not top-level.
    let outer = editor.host.add_block("outer", "procedure");
    let seq = editor.host.add_child(&outer, "seq", "statement_seq");
    let a = editor.declare_under(&seq, "a", "a");
    let b = editor.declare_under(&seq, "b", "b");
    let non_decl = editor.host.add_child(&seq, "c", "controls_if");
    let d = editor.declare_under(&seq, "d", "d");

    // At c's scope level only a and b are in scope; the top-level rule then
    // appends the whole registry.
    let result = editor
        .registry
        .borrow()
        .accessible_declarations(&editor.host, &non_decl);
    let ids: Vec<_> = result.iter().map(Declaration::block_id).collect();
    assert_eq!(
        ids,
        [a.clone(), b.clone(), a.clone(), b.clone(), d.clone()]
    );

    // The dropdown dedups by label, keeping the innermost occurrence.
    assert_eq!(editor.visible_labels(&non_decl), ["a", "b", "d"]);

    // From a getter after d, d is in scope at its own level too.
    let after = editor.host.add_child(&seq, "g", "local_get");
    assert_eq!(editor.visible_labels(&after), ["a", "b", "d"]);
}

#[test]
fn idempotent_declare_keeps_one_entry_per_block() {
    let mut editor = TestEditor::new(FamilyConfig::new("local"));
    let block = editor.declare_top_level("b1", "x");
    // The created hook can fire again for the same block.
    editor.host.fire_created(&block);

    assert_eq!(editor.registry.borrow().len(), 1);
}

#[test]
fn disposing_a_declaration_removes_it_from_menus() {
    let mut editor = TestEditor::new(FamilyConfig::new("local"));
    let block = editor.declare_top_level("b1", "x");
    editor.declare_top_level("b2", "y");

    editor.host.remove_block(&block);
    editor.host.fire_disposed(&block, "local_declare");

    let getter = editor.host.add_block("g", "local_get");
    assert_eq!(editor.visible_labels(&getter), ["y"]);
}

#[test]
fn flyout_template_blocks_are_never_registered() {
    let mut editor = TestEditor::new(FamilyConfig::new("local"));
    let palette = editor.host.add_block("palette", "local_declare");
    editor.host.set_in_flyout(&palette, true);
    editor.host.fire_created(&palette);

    assert!(editor.registry.borrow().is_empty());
}

// =============================================================================
// Toolbox category rendering
// =============================================================================

#[test]
fn category_lists_getters_then_setters_in_registry_order() {
    let mut config = FamilyConfig::new("local");
    config.initial_values = vec![Declaration::primitive("PI")];
    let mut editor = TestEditor::new(config);
    editor.declare_top_level("b1", "x");

    let xml = editor.host.open_category("local").unwrap();
    assert_eq!(
        xml,
        concat!(
            "<block type=\"local_get\"><field name=\"name\">PI</field></block>",
            "<block type=\"local_get\"><field name=\"name\">x</field></block>",
            "<block type=\"local_set\"><field name=\"name\">PI</field></block>",
            "<block type=\"local_set\"><field name=\"name\">x</field></block>",
        )
    );
}

#[test]
fn setter_templates_exclude_readonly_declarations_but_keep_primitives() {
    let mut config = FamilyConfig::new("local");
    config.initial_values = vec![Declaration::primitive("PI")];
    let mut editor = TestEditor::new(config);

    let konst = editor.declare_top_level("k", "k");
    editor.host.set_field(&konst, FIELD_READONLY, "TRUE");
    let var = editor.declare_top_level("v", "v");
    editor.host.set_field(&var, FIELD_READONLY, "FALSE");

    let xml = editor.host.open_category("local").unwrap();
    // Getter side lists everything; setter side drops the read-only block
    // while the primitive bypasses the filter.
    assert_eq!(
        xml,
        concat!(
            "<block type=\"local_get\"><field name=\"name\">PI</field></block>",
            "<block type=\"local_get\"><field name=\"name\">k</field></block>",
            "<block type=\"local_get\"><field name=\"name\">v</field></block>",
            "<block type=\"local_set\"><field name=\"name\">PI</field></block>",
            "<block type=\"local_set\"><field name=\"name\">v</field></block>",
        )
    );
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[test]
fn primitive_and_declaration_are_visible_top_level_and_nested() {
    let mut config = FamilyConfig::new("local");
    config.initial_values = vec![Declaration::primitive("PI")];
    let mut editor = TestEditor::new(config);

    // Declare b1 ("x") at top level; a parentless query sees [PI, x].
    editor.declare_top_level("b1", "x");
    let top_getter = editor.host.add_block("g1", "local_get");
    assert_eq!(editor.visible_labels(&top_getter), ["PI", "x"]);

    // Nest a sequence containing a declaration followed by a getter: the
    // getter sees the preceding sibling and, through the top-level rule,
    // the primitive.
    let seq = editor.host.add_block("seq", "statement_seq");
    editor.declare_under(&seq, "b2", "y");
    let nested_getter = editor.host.add_child(&seq, "g2", "local_get");
    assert_eq!(editor.visible_labels(&nested_getter), ["y", "PI", "x"]);
}

#[test]
fn renaming_a_declaration_propagates_to_menus_and_category() {
    let mut editor = TestEditor::new(FamilyConfig::new("local"));
    let block = editor.declare_top_level("b1", "before");

    editor.host.set_field(&block, FIELD_NAME, "after");

    let getter = editor.host.add_block("g", "local_get");
    assert_eq!(editor.visible_labels(&getter), ["after"]);
    let xml = editor.host.open_category("local").unwrap();
    assert!(xml.contains("<field name=\"name\">after</field>"));
}

// =============================================================================
// Direct registry queries (no family wiring)
// =============================================================================

#[test]
fn registry_query_returns_declaration_records_with_container() {
    let mut ws = MockWorkspace::new("ws-1");
    let block = ws.add_block("b1", "local_declare");

    let mut registry = DeclarationRegistry::new();
    registry.declare(&ws, &block);

    let visible = registry.accessible_declarations(&ws, &block);
    assert_eq!(
        visible,
        vec![Declaration::block(block, ws.workspace_id())]
    );
}
