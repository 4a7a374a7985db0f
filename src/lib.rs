//! Blockscope - scoped local declarations for visual block-programming editors
//!
//! Blockscope lets a block editor offer "local declarations" (local
//! variables and constants) independent of the editor's built-in variable
//! system: it tracks declaration blocks, resolves which declarations are
//! lexically visible from any position in the block tree, and generates the
//! getter/setter dropdowns and toolbox category contents the editor
//! displays.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`host`] - Boundary traits for the editor's block/workspace object
//!   model (read queries plus registration points), and a mock for tests
//! - [`core`] - The declaration registry and the scope-resolution walk
//! - [`family`] - Configurator that installs one declaration/getter/setter
//!   block family into a host and wires it to a registry
//!
//! # Correctness Invariants
//!
//! 1. The host owns the block tree; this crate only reads it
//! 2. Registry order is insertion order and drives all display order
//! 3. Core operations never panic or error inside host callbacks; abnormal
//!    input widens results (fail open) instead
//!
//! # Example
//!
//! ```
//! use blockscope::family::{install, FamilyConfig};
//! use blockscope::host::mock::MockWorkspace;
//! use blockscope::host::FIELD_NAME;
//!
//! let mut host = MockWorkspace::new("ws-1");
//! let handle = install(&mut host, FamilyConfig::new("local")).unwrap();
//!
//! // The editor creates a declaration block and fires the created event.
//! let decl = host.add_block("b1", "local_declare");
//! host.set_field(&decl, FIELD_NAME, "x");
//! host.fire_created(&decl);
//!
//! // A getter elsewhere in the tree sees the declaration.
//! let getter = host.add_block("g1", "local_get");
//! let options = host.dropdown_for("local_get", &getter).unwrap();
//! assert_eq!(options[0].label, "x");
//! # assert_eq!(handle.registry.borrow().len(), 1);
//! ```

pub mod core;
pub mod family;
pub mod host;
