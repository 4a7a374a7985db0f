//! family::config
//!
//! Configuration for one block family.
//!
//! # Overview
//!
//! A block family is one configured set of declaration/getter/setter block
//! kinds sharing a name prefix. The original two-class builder/director
//! flow collapses into this plain struct plus the ordered setup sequence in
//! [`crate::family::install`].
//!
//! # Validation
//!
//! Values are validated before installation; an invalid family never
//! reaches the host's registries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Declaration;

/// Errors from family configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The family name prefix is empty or whitespace.
    #[error("family name must not be empty")]
    EmptyFamilyName,

    /// The family name prefix contains characters the host's kind registry
    /// cannot key on.
    #[error("invalid family name '{0}': must contain only [a-z0-9_]")]
    InvalidFamilyName(String),

    /// The display hue is outside `0..=360`.
    #[error("invalid colour {0}: hue must be in 0..=360")]
    InvalidColour(u16),

    /// A message template is missing the placeholder for a required field.
    #[error("message template '{template}' is missing placeholder {placeholder}")]
    MissingPlaceholder {
        /// The offending template.
        template: String,
        /// The `%n` placeholder that must appear.
        placeholder: String,
    },
}

/// Configuration for one block family.
///
/// # Example
///
/// ```
/// use blockscope::family::config::FamilyConfig;
///
/// let config = FamilyConfig::new("local");
/// assert!(config.validate().is_ok());
/// assert_eq!(config.declare_kind(), "local_declare");
/// assert_eq!(config.getter_kind(), "local_get");
/// assert_eq!(config.setter_kind(), "local_set");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyConfig {
    /// Name prefix isolating this family's block kinds and category.
    pub family: String,

    /// Optional type-check constraint on getter outputs and declared /
    /// assigned values.
    pub value_type: Option<String>,

    /// Whether every declaration in this family is read-only (constants
    /// only). Read-only-only families get no setter block kind.
    pub readonly_only: bool,

    /// Whether the declaration block shows a read-only toggle field.
    pub show_readonly_toggle: bool,

    /// Message template for the declaration block. `{keyword}` is replaced
    /// by the mutability keyword; `%n` placeholders bind fields in order.
    pub declare_message: String,

    /// Message template for the getter block.
    pub getter_message: String,

    /// Message template for the setter block.
    pub setter_message: String,

    /// Initial text of a fresh declaration's name field.
    pub default_text: String,

    /// Hover tooltip shared by the family's block kinds.
    pub tooltip: String,

    /// Display hue in degrees, `0..=360`.
    pub colour: u16,

    /// Keyword shown for mutable declarations (e.g. "let").
    pub mutable_keyword: String,

    /// Keyword shown for read-only declarations (e.g. "const").
    pub readonly_keyword: String,

    /// Extra markup appended verbatim to the toolbox category.
    pub extra_toolbox_xml: Vec<String>,

    /// Declarations seeded into the registry before any block exists,
    /// typically primitives.
    pub initial_values: Vec<Declaration>,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            family: "local".to_string(),
            value_type: None,
            readonly_only: false,
            show_readonly_toggle: true,
            declare_message: "{keyword} %1 %2 = %3".to_string(),
            getter_message: "%1".to_string(),
            setter_message: "set %1 to %2".to_string(),
            default_text: "name".to_string(),
            tooltip: "A declaration visible to later blocks in this scope".to_string(),
            colour: 310,
            mutable_keyword: "let".to_string(),
            readonly_keyword: "const".to_string(),
            extra_toolbox_xml: Vec::new(),
            initial_values: Vec::new(),
        }
    }
}

impl FamilyConfig {
    /// Default configuration under the given family name prefix.
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            ..Self::default()
        }
    }

    /// Type name of the declaration block kind.
    pub fn declare_kind(&self) -> String {
        format!("{}_declare", self.family)
    }

    /// Type name of the getter block kind.
    pub fn getter_kind(&self) -> String {
        format!("{}_get", self.family)
    }

    /// Type name of the setter block kind.
    pub fn setter_kind(&self) -> String {
        format!("{}_set", self.family)
    }

    /// The keyword for this family's base mutability level.
    pub fn keyword(&self) -> &str {
        if self.readonly_only {
            &self.readonly_keyword
        } else {
            &self.mutable_keyword
        }
    }

    /// Number of fields the declare message must provide placeholders for:
    /// optional toggle, name field, value input.
    fn declare_arg_count(&self) -> usize {
        if self.show_readonly_toggle {
            3
        } else {
            2
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.family.trim().is_empty() {
            return Err(ConfigError::EmptyFamilyName);
        }
        if !self
            .family
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ConfigError::InvalidFamilyName(self.family.clone()));
        }
        if self.colour > 360 {
            return Err(ConfigError::InvalidColour(self.colour));
        }

        for n in 1..=self.declare_arg_count() {
            require_placeholder(&self.declare_message, n)?;
        }
        require_placeholder(&self.getter_message, 1)?;
        if !self.readonly_only {
            require_placeholder(&self.setter_message, 1)?;
            require_placeholder(&self.setter_message, 2)?;
        }
        Ok(())
    }
}

fn require_placeholder(template: &str, n: usize) -> Result<(), ConfigError> {
    let placeholder = format!("%{n}");
    if template.contains(&placeholder) {
        Ok(())
    } else {
        Err(ConfigError::MissingPlaceholder {
            template: template.to_string(),
            placeholder,
        })
    }
}
