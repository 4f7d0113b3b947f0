//! Declaration and member eligibility rules
//!
//! All checks are pure predicates over declaration metadata.

use super::{simple_name, Declaration, DiagramConfig, FieldDecl, FunctionDecl};

/// Decides which declarations and members make it into the diagram
#[derive(Debug, Clone, Copy)]
pub struct DeclarationFilter<'a> {
    config: &'a DiagramConfig,
}

/// `package` equals `prefix` or starts with it
fn package_matches(package: &str, prefix: &str) -> bool {
    package.starts_with(prefix)
}

impl<'a> DeclarationFilter<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        Self { config }
    }

    /// Apply the package rules; the first matching rule wins
    pub fn accepts_package(&self, package: &str) -> bool {
        if package.is_empty() {
            return self.config.allow_empty_package;
        }
        if !self.config.included_packages.is_empty()
            && !self
                .config
                .included_packages
                .iter()
                .any(|p| package_matches(package, p))
        {
            return false;
        }
        !self.is_package_excluded(package)
    }

    /// True when an `excludedPackages` entry covers `package`
    pub fn is_package_excluded(&self, package: &str) -> bool {
        self.config
            .excluded_packages
            .iter()
            .any(|p| package_matches(package, p))
    }

    pub fn is_declaration_name_excluded(&self, qualified_name: &str) -> bool {
        is_listed(
            &self.config.excluded_declaration_names,
            simple_name(qualified_name),
        )
    }

    pub fn accepts_declaration(&self, decl: &Declaration) -> bool {
        self.accepts_package(&decl.package)
            && self.config.classes.allows(decl.visibility)
            && !self.is_declaration_name_excluded(&decl.qualified_name)
    }

    pub fn accepts_field(&self, field: &FieldDecl) -> bool {
        self.config.fields.allows(field.visibility)
            && !is_listed(&self.config.excluded_field_names, &field.name)
    }

    pub fn accepts_function(&self, function: &FunctionDecl) -> bool {
        self.config.methods.allows(function.visibility)
            && !is_listed(&self.config.excluded_method_names, &function.name)
    }
}

fn is_listed(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeclarationKind, TypeRef, Visibility, VisibilityToggles};

    fn class_in(package: &str) -> Declaration {
        let name = if package.is_empty() {
            "Thing".to_string()
        } else {
            format!("{}.Thing", package)
        };
        Declaration::new(DeclarationKind::Class, name, package)
    }

    #[test]
    fn test_excluded_package_and_subpackages() {
        let config = DiagramConfig {
            excluded_packages: vec!["com.inactive".to_string()],
            ..DiagramConfig::default()
        };
        let filter = DeclarationFilter::new(&config);
        assert!(!filter.accepts_declaration(&class_in("com.inactive")));
        assert!(!filter.accepts_declaration(&class_in("com.inactive.sub")));
        assert!(filter.accepts_declaration(&class_in("com.active")));
        assert!(!filter.accepts_declaration(&class_in("com.inactiveish")));
    }

    #[test]
    fn test_included_packages_restrict() {
        let config = DiagramConfig {
            included_packages: vec!["com.app".to_string()],
            excluded_packages: vec!["com.app.generated".to_string()],
            ..DiagramConfig::default()
        };
        let filter = DeclarationFilter::new(&config);
        assert!(filter.accepts_package("com.app"));
        assert!(filter.accepts_package("com.app.domain"));
        assert!(!filter.accepts_package("com.lib"));
        assert!(filter.accepts_package("com.apps"));
        assert!(!filter.accepts_package("com.app.generated.api"));
    }

    #[test]
    fn test_empty_package_rule_comes_first() {
        let mut config = DiagramConfig {
            included_packages: vec!["com.app".to_string()],
            ..DiagramConfig::default()
        };
        config.allow_empty_package = false;
        assert!(!DeclarationFilter::new(&config).accepts_package(""));
        config.allow_empty_package = true;
        assert!(DeclarationFilter::new(&config).accepts_package(""));
    }

    #[test]
    fn test_visibility_toggles() {
        let config = DiagramConfig {
            classes: VisibilityToggles::public_only(),
            fields: VisibilityToggles::public_only(),
            methods: VisibilityToggles::public_only(),
            ..DiagramConfig::default()
        };
        let filter = DeclarationFilter::new(&config);
        assert!(!filter.accepts_declaration(&class_in("p").with_visibility(Visibility::Internal)));
        assert!(filter.accepts_field(&FieldDecl::new("a", TypeRef::named("kotlin.Int"))));
        assert!(!filter.accepts_field(
            &FieldDecl::new("b", TypeRef::named("kotlin.Int")).with_visibility(Visibility::Private)
        ));
        assert!(!filter.accepts_function(
            &FunctionDecl::new("c", TypeRef::named("kotlin.Unit"))
                .with_visibility(Visibility::Internal)
        ));
    }

    #[test]
    fn test_name_exclusions() {
        let config = DiagramConfig {
            excluded_declaration_names: vec!["Thing".to_string()],
            excluded_field_names: vec!["secret".to_string()],
            ..DiagramConfig::default()
        };
        let filter = DeclarationFilter::new(&config);
        assert!(!filter.accepts_declaration(&class_in("p")));
        assert!(!filter.accepts_field(&FieldDecl::new("secret", TypeRef::named("kotlin.String"))));
        assert!(!filter.accepts_function(&FunctionDecl::new("hashCode", TypeRef::named("kotlin.Int"))));
        assert!(filter.accepts_function(&FunctionDecl::new("area", TypeRef::named("kotlin.Double"))));
    }
}
