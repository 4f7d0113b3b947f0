//! Diagram generation configuration
//!
//! Every option has a default, so a configuration file only needs to list
//! what it changes. Files use camelCase JSON keys:
//!
//! ```json
//! {
//!   "excludedPackages": ["com.example.internal"],
//!   "fields": { "private": true },
//!   "showPackages": true,
//!   "title": "Domain model"
//! }
//! ```

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{DiagramError, Visibility};

/// Show-toggles for one category of declarations or members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisibilityToggles {
    pub public: bool,
    pub internal: bool,
    pub protected: bool,
    pub private: bool,
}

impl VisibilityToggles {
    /// Everything except private
    pub fn non_private() -> Self {
        Self {
            public: true,
            internal: true,
            protected: true,
            private: false,
        }
    }

    pub fn public_only() -> Self {
        Self {
            public: true,
            internal: false,
            protected: false,
            private: false,
        }
    }

    pub fn all() -> Self {
        Self {
            public: true,
            internal: true,
            protected: true,
            private: true,
        }
    }

    pub fn allows(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => self.public,
            Visibility::Internal => self.internal,
            Visibility::Protected => self.protected,
            Visibility::Private => self.private,
        }
    }
}

impl Default for VisibilityToggles {
    fn default() -> Self {
        Self::non_private()
    }
}

/// Configuration for building, resolving and rendering a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    /// Package prefixes to keep; empty keeps every package
    pub included_packages: Vec<String>,
    /// Package prefixes to drop
    pub excluded_packages: Vec<String>,
    /// Simple names of declarations to drop
    pub excluded_declaration_names: Vec<String>,
    /// Simple names of fields to drop
    pub excluded_field_names: Vec<String>,
    /// Simple names of methods to drop
    pub excluded_method_names: Vec<String>,
    /// Visibility toggles for declarations
    pub classes: VisibilityToggles,
    /// Visibility toggles for fields
    pub fields: VisibilityToggles,
    /// Visibility toggles for methods
    pub methods: VisibilityToggles,
    pub allow_empty_package: bool,

    pub show_inheritance: bool,
    /// Keep inheritance edges towards supertypes that were filtered out
    pub show_hidden_supertypes: bool,
    /// Supertypes never drawn (runtime roots)
    pub ignored_supertypes: Vec<String>,
    pub show_property_relations: bool,
    pub show_function_relations: bool,
    pub show_indirect_relations: bool,
    pub max_relations_per_vertex: Option<usize>,

    /// Group entities into package blocks
    pub show_packages: bool,
    /// Block name for entities without a package; unwrapped when unset
    pub empty_package_name: Option<String>,
    pub show_visibility_modifiers: bool,
    pub mark_extension_members: bool,

    pub title: Option<String>,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub output_file_name: String,
}

/// Compiler-synthesized members hidden by default
pub const DEFAULT_EXCLUDED_METHODS: &[&str] = &[
    "<init>",
    "toString",
    "equals",
    "hashCode",
];

/// Runtime root types that never get an inheritance edge
pub const DEFAULT_IGNORED_SUPERTYPES: &[&str] = &[
    "kotlin.Any",
    "java.lang.Object",
    "kotlin.Enum",
    "java.lang.Enum",
    "java.io.Serializable",
];

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            included_packages: Vec::new(),
            excluded_packages: Vec::new(),
            excluded_declaration_names: Vec::new(),
            excluded_field_names: Vec::new(),
            excluded_method_names: DEFAULT_EXCLUDED_METHODS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            classes: VisibilityToggles::default(),
            fields: VisibilityToggles::default(),
            methods: VisibilityToggles::default(),
            allow_empty_package: true,
            show_inheritance: true,
            show_hidden_supertypes: true,
            ignored_supertypes: DEFAULT_IGNORED_SUPERTYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            show_property_relations: true,
            show_function_relations: true,
            show_indirect_relations: true,
            max_relations_per_vertex: None,
            show_packages: false,
            empty_package_name: None,
            show_visibility_modifiers: true,
            mark_extension_members: true,
            title: None,
            prefix: None,
            postfix: None,
            output_file_name: "class-diagram.puml".to_string(),
        }
    }
}

impl DiagramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(input).map_err(|e| DiagramError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DiagramError::from)?;
        Self::from_json_str(&content)
    }

    /// Pretty JSON form, as printed by `classgraph config`
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), DiagramError> {
        let name = self.output_file_name.trim();
        if name.is_empty() {
            return Err(DiagramError::config_error("outputFileName must not be empty"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(DiagramError::config_error(format!(
                "outputFileName '{}' must be a file name, not a path",
                name
            )));
        }
        if self.max_relations_per_vertex == Some(0) {
            return Err(DiagramError::config_error(
                "maxRelationsPerVertex must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hide_private_only() {
        let config = DiagramConfig::default();
        assert!(config.classes.allows(Visibility::Public));
        assert!(config.fields.allows(Visibility::Internal));
        assert!(config.methods.allows(Visibility::Protected));
        assert!(!config.methods.allows(Visibility::Private));
        assert!(config.excluded_method_names.iter().any(|m| m == "hashCode"));
    }

    #[test]
    fn test_default_method_exclusions_are_synthesized_only() {
        let config = DiagramConfig::default();
        assert_eq!(
            config.excluded_method_names,
            vec!["<init>", "toString", "equals", "hashCode"]
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DiagramConfig::from_json_str(
            r#"{ "excludedPackages": ["com.inactive"], "fields": { "private": true }, "showPackages": true }"#,
        )
        .unwrap();
        assert_eq!(config.excluded_packages, vec!["com.inactive"]);
        assert!(config.fields.private);
        assert!(config.fields.public);
        assert!(config.show_packages);
        assert!(config.show_inheritance);
        assert_eq!(config.output_file_name, "class-diagram.puml");
    }

    #[test]
    fn test_rejects_path_as_output_name() {
        let err = DiagramConfig::from_json_str(r#"{ "outputFileName": "out/diagram.puml" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("must be a file name"));
    }

    #[test]
    fn test_rejects_zero_relation_cap() {
        let config = DiagramConfig {
            max_relations_per_vertex: Some(0),
            ..DiagramConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let json = DiagramConfig::default().to_json_pretty().unwrap();
        assert!(json.contains("\"showInheritance\": true"));
        assert_eq!(DiagramConfig::from_json_str(&json).unwrap(), DiagramConfig::default());
    }
}
