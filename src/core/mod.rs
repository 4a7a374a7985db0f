//! core
//!
//! Core domain types and the declaration registry.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BlockId, WorkspaceId, Declaration
//! - [`registry`] - Ordered declaration registry and category markup
//! - [`scope`] - Lexical visibility resolution over the block tree
//!
//! # Design Principles
//!
//! - The host editor owns the block tree; the core only reads it through
//!   the [`crate::host::Workspace`] trait
//! - Registry mutations never error; queries fail open (widen the result)
//!   rather than throw inside UI callbacks

pub mod registry;
pub mod scope;
pub mod types;
