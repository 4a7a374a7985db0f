//! family
//!
//! Block-family configurator: builds the declaration/getter/setter block
//! kinds for one family, wires them to a declaration registry through the
//! host's hooks, and registers the toolbox category provider.
//!
//! # Installation order
//!
//! [`install`] is the single construction entry point. It runs a fixed
//! sequence: validate the config, create and seed the registry, register
//! the block kinds, attach the lifecycle listener, attach the dropdown
//! providers, register the category provider, and hand back the
//! [`FamilyHandle`].
//!
//! # Modules
//!
//! - [`config`]: The [`FamilyConfig`] struct and its validation

pub mod config;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::core::registry::DeclarationRegistry;
use crate::core::types::{BlockId, Declaration};
use crate::host::{
    BlockArg, BlockEvent, BlockKind, DropdownOption, Host, HostError, Workspace, FIELD_NAME,
    FIELD_READONLY,
};

pub use config::{ConfigError, FamilyConfig};

/// Errors from installing a block family.
#[derive(Debug, Error)]
pub enum FamilyError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host registration point rejected the family.
    ///
    /// Registrations made before the failing one stay in the host; see
    /// [`install`] for the partial-install contract.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Handle to one installed block family.
#[derive(Clone)]
pub struct FamilyHandle {
    /// The family's declaration registry, shared with the installed hooks.
    pub registry: Rc<RefCell<DeclarationRegistry>>,
    /// Type name of the declaration block kind.
    pub declare_kind: String,
    /// Type name of the getter block kind.
    pub getter_kind: String,
    /// Type name of the setter block kind; absent for read-only-only
    /// families.
    pub setter_kind: Option<String>,
    /// Name of the toolbox category backed by the registry.
    pub category: String,
}

/// Install one block family into a host.
///
/// # Errors
///
/// Returns [`FamilyError`] when the config fails validation or the host
/// rejects a registration (e.g. the family prefix is already taken).
///
/// Registration is not transactional: the [`Host`] trait offers no way to
/// unregister or pre-query kinds, so registrations made before the failing
/// one stay in the host. Config validation runs first, and a clashing
/// family prefix fails on its very first registration, so in practice a
/// partial install only happens when the host already holds a kind or
/// category colliding with part of the family's namespace. Callers that
/// need atomicity should pick a fresh family prefix instead.
///
/// # Example
///
/// ```
/// use blockscope::family::{install, FamilyConfig};
/// use blockscope::host::mock::MockWorkspace;
///
/// let mut host = MockWorkspace::new("ws-1");
/// let handle = install(&mut host, FamilyConfig::new("local")).unwrap();
///
/// assert_eq!(handle.declare_kind, "local_declare");
/// assert!(host.block_kind("local_get").is_some());
/// assert!(handle.registry.borrow().is_empty());
/// ```
pub fn install(host: &mut dyn Host, config: FamilyConfig) -> Result<FamilyHandle, FamilyError> {
    config.validate()?;

    let registry = Rc::new(RefCell::new(DeclarationRegistry::new()));
    registry
        .borrow_mut()
        .add_initial_values(config.initial_values.clone());

    host.register_block_kind(declare_block_kind(&config))?;
    host.register_block_kind(getter_block_kind(&config))?;
    if !config.readonly_only {
        host.register_block_kind(setter_block_kind(&config))?;
    }

    let declare_kind = config.declare_kind();
    let getter_kind = config.getter_kind();
    let setter_kind = (!config.readonly_only).then(|| config.setter_kind());

    // Lifecycle hook: declaration blocks enter and leave the registry as
    // the host creates and disposes them.
    {
        let registry = Rc::clone(&registry);
        let declare_kind = declare_kind.clone();
        host.register_listener(Rc::new(move |ws, event| match event {
            BlockEvent::Created { block, kind } if kind == &declare_kind => {
                registry.borrow_mut().declare(ws, block);
            }
            BlockEvent::Disposed { block, kind } if kind == &declare_kind => {
                registry.borrow_mut().undeclare(block);
            }
            _ => {}
        }));
    }

    // Dropdown providers: getters see every visible declaration, setters
    // only the writable ones.
    {
        let registry = Rc::clone(&registry);
        host.register_dropdown_provider(
            &getter_kind,
            Rc::new(move |ws, block| dropdown_options(&registry.borrow(), ws, block, false)),
        );
    }
    if let Some(setter_kind) = &setter_kind {
        let registry = Rc::clone(&registry);
        host.register_dropdown_provider(
            setter_kind,
            Rc::new(move |ws, block| dropdown_options(&registry.borrow(), ws, block, true)),
        );
    }

    // Toolbox category: one getter template per declaration, one setter
    // template per writable declaration, then any extra entries.
    {
        let registry = Rc::clone(&registry);
        let getter_kind = getter_kind.clone();
        let setter_kind = setter_kind.clone();
        let extra = config.extra_toolbox_xml.join("");
        host.register_category(
            &config.family,
            Rc::new(move |ws| {
                let registry = registry.borrow();
                let mut xml = registry.category_xml(ws, &getter_kind, None);
                if let Some(setter_kind) = &setter_kind {
                    xml.push_str(&registry.category_xml(ws, setter_kind, Some(&is_writable)));
                }
                xml.push_str(&extra);
                xml
            }),
        )?;
    }

    debug!(family = %config.family, "installed block family");
    Ok(FamilyHandle {
        registry,
        declare_kind,
        getter_kind,
        setter_kind,
        category: config.family,
    })
}

/// Whether a declaration block is writable.
///
/// Only an explicit truthy `readonly` field excludes a block; declarations
/// without the toggle are writable.
fn is_writable(ws: &dyn Workspace, block: &BlockId) -> bool {
    !matches!(ws.field_value(block, FIELD_READONLY), Some(v) if v != "FALSE")
}

/// Build dropdown options from the declarations visible at `block`.
///
/// Labels are resolved live and deduplicated keeping the first (innermost)
/// occurrence, which is where the scope walk's cross-level duplicates get
/// collapsed.
fn dropdown_options(
    registry: &DeclarationRegistry,
    ws: &dyn Workspace,
    block: &BlockId,
    writable_only: bool,
) -> Vec<DropdownOption> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();
    for decl in registry.accessible_declarations(ws, block) {
        let (label, value) = match &decl {
            Declaration::Primitive { name } => (name.clone(), name.clone()),
            Declaration::Block { id, .. } => {
                if !ws.contains(id) {
                    continue;
                }
                if writable_only && !is_writable(ws, id) {
                    continue;
                }
                let label = ws.field_value(id, FIELD_NAME).unwrap_or_default();
                (label, id.as_str().to_string())
            }
        };
        if seen.insert(label.clone()) {
            options.push(DropdownOption { label, value });
        }
    }
    options
}

fn declare_block_kind(config: &FamilyConfig) -> BlockKind {
    let mut args = Vec::new();
    if config.show_readonly_toggle {
        args.push(BlockArg::CheckboxField {
            name: FIELD_READONLY.to_string(),
            default: config.readonly_only,
        });
    }
    args.push(BlockArg::TextField {
        name: FIELD_NAME.to_string(),
        default: config.default_text.clone(),
    });
    args.push(BlockArg::ValueInput {
        name: "VALUE".to_string(),
        check: config.value_type.clone(),
    });

    BlockKind {
        type_name: config.declare_kind(),
        message: config.declare_message.replace("{keyword}", config.keyword()),
        args,
        colour: config.colour,
        tooltip: config.tooltip.clone(),
        has_previous: true,
        has_next: true,
        output: None,
    }
}

fn getter_block_kind(config: &FamilyConfig) -> BlockKind {
    BlockKind {
        type_name: config.getter_kind(),
        message: config.getter_message.clone(),
        args: vec![BlockArg::DynamicDropdown {
            name: FIELD_NAME.to_string(),
        }],
        colour: config.colour,
        tooltip: config.tooltip.clone(),
        has_previous: false,
        has_next: false,
        output: Some(config.value_type.clone()),
    }
}

fn setter_block_kind(config: &FamilyConfig) -> BlockKind {
    BlockKind {
        type_name: config.setter_kind(),
        message: config.setter_message.clone(),
        args: vec![
            BlockArg::DynamicDropdown {
                name: FIELD_NAME.to_string(),
            },
            BlockArg::ValueInput {
                name: "VALUE".to_string(),
                check: config.value_type.clone(),
            },
        ],
        colour: config.colour,
        tooltip: config.tooltip.clone(),
        has_previous: true,
        has_next: true,
        output: None,
    }
}
