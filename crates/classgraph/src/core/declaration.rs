//! Declaration source model
//!
//! The declaration tree is produced by an external extractor (a compiler
//! plugin, a source indexer, ...). This module defines the read-only shape
//! the diagram builder consumes, the [`DeclarationSource`] trait, and
//! [`DeclarationTree`], an in-memory source that can be loaded from JSON.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::DiagramError;

/// Placeholder rendered for types the extractor could not resolve
pub const UNRESOLVED_TYPE: &str = "Unresolved";

/// Kind of a source declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    Object,
    TypeAlias,
    EnumEntry,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Class => write!(f, "class"),
            DeclarationKind::Interface => write!(f, "interface"),
            DeclarationKind::Enum => write!(f, "enum"),
            DeclarationKind::Object => write!(f, "object"),
            DeclarationKind::TypeAlias => write!(f, "typeAlias"),
            DeclarationKind::EnumEntry => write!(f, "enumEntry"),
        }
    }
}

/// Visibility tier of a declaration or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    /// PlantUML member visibility symbol
    pub fn symbol(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Internal => '~',
            Visibility::Protected => '#',
            Visibility::Private => '-',
        }
    }
}

/// Declaration and member modifiers reported by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    Sealed,
    Data,
    Value,
    Abstract,
    Open,
    Companion,
    Static,
    Const,
    Suspend,
    Inline,
    Override,
}

/// A reference to a type, possibly generic
///
/// `name` is the fully-qualified name of the resolved declaration, or `None`
/// when the extractor could not resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Vec<TypeRef>,
    #[serde(default)]
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn with_argument(mut self, argument: TypeRef) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.name.is_some()
    }

    /// Last path segment of the qualified name, or the placeholder
    pub fn simple_name(&self) -> &str {
        match &self.name {
            Some(name) => simple_name(name),
            None => UNRESOLVED_TYPE,
        }
    }

    /// Short display form, e.g. `Map<String, List<Item>>?`
    pub fn display(&self) -> String {
        self.render(false)
    }

    /// Fully-qualified display form, e.g. `kotlin.Pair<p.Text, p.Text>`
    pub fn qualified_display(&self) -> String {
        self.render(true)
    }

    fn render(&self, qualified: bool) -> String {
        let mut out = if qualified {
            self.name.as_deref().unwrap_or(UNRESOLVED_TYPE).to_string()
        } else {
            self.simple_name().to_string()
        };
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(|a| a.render(qualified)).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
        out
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Last dot-separated segment of a qualified name
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name.rsplit('.').next().unwrap_or(qualified_name)
}

/// A property or field member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Receiver type for extension properties
    #[serde(default)]
    pub receiver: Option<TypeRef>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            visibility: Visibility::Public,
            modifiers: Vec::new(),
            receiver: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_ref: TypeRef,
}

/// A function or method member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub return_type: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Receiver type for extension functions
    #[serde(default)]
    pub receiver: Option<TypeRef>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            visibility: Visibility::Public,
            modifiers: Vec::new(),
            receiver: None,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.parameters.push(ParameterDecl {
            name: name.into(),
            type_ref,
        });
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_receiver(mut self, receiver: TypeRef) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A type declaration with its members and nested declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub qualified_name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub supertypes: Vec<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub aliased_type: Option<TypeRef>,
    #[serde(default)]
    pub children: Vec<Declaration>,
}

impl Declaration {
    pub fn new(
        kind: DeclarationKind,
        qualified_name: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            qualified_name: qualified_name.into(),
            package: package.into(),
            visibility: Visibility::Public,
            modifiers: Vec::new(),
            supertypes: Vec::new(),
            fields: Vec::new(),
            functions: Vec::new(),
            aliased_type: None,
            children: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_supertype(mut self, supertype: TypeRef) -> Self {
        self.supertypes.push(supertype);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_aliased_type(mut self, aliased: TypeRef) -> Self {
        self.aliased_type = Some(aliased);
        self
    }

    pub fn with_child(mut self, child: Declaration) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    /// Name relative to the package, e.g. `Outer.Inner`
    pub fn display_name(&self) -> &str {
        if self.package.is_empty() {
            return &self.qualified_name;
        }
        self.qualified_name
            .strip_prefix(self.package.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.qualified_name)
    }

    /// Companion objects are merged into their owner
    pub fn is_companion(&self) -> bool {
        self.kind == DeclarationKind::Object && self.has_modifier(Modifier::Companion)
    }

    /// Check the structural constraints the builder relies on
    ///
    /// `parent` is the kind of the enclosing declaration, if any.
    pub fn validate(&self, parent: Option<DeclarationKind>) -> Result<(), DiagramError> {
        let name = &self.qualified_name;
        if name.trim().is_empty() {
            return Err(DiagramError::invalid_declaration(
                name.clone(),
                "qualified name is empty",
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(DiagramError::invalid_declaration(
                name.clone(),
                "qualified name contains whitespace",
            ));
        }
        if !self.package.is_empty() {
            let prefixed = name
                .strip_prefix(self.package.as_str())
                .is_some_and(|rest| rest.starts_with('.') && rest.len() > 1);
            if !prefixed {
                return Err(DiagramError::invalid_declaration(
                    name.clone(),
                    format!("not inside package '{}'", self.package),
                ));
            }
        }
        if self.kind == DeclarationKind::TypeAlias && self.aliased_type.is_none() {
            return Err(DiagramError::invalid_declaration(
                name.clone(),
                "type alias without aliased type",
            ));
        }
        if self.kind == DeclarationKind::EnumEntry && parent != Some(DeclarationKind::Enum) {
            return Err(DiagramError::invalid_declaration(
                name.clone(),
                "enum entry outside an enum",
            ));
        }
        Ok(())
    }
}

/// Read-only access to a forest of declarations
pub trait DeclarationSource {
    /// Root declarations in source order
    fn declarations(&self) -> &[Declaration];

    /// File-level properties (typically extension properties)
    fn top_level_fields(&self) -> &[FieldDecl] {
        &[]
    }

    /// File-level functions (typically extension functions)
    fn top_level_functions(&self) -> &[FunctionDecl] {
        &[]
    }

    /// Find a declaration anywhere in the forest by qualified name
    fn find(&self, qualified_name: &str) -> Option<&Declaration> {
        find_in(self.declarations(), qualified_name)
    }
}

fn find_in<'a>(declarations: &'a [Declaration], qualified_name: &str) -> Option<&'a Declaration> {
    declarations.iter().find_map(|decl| {
        if decl.qualified_name == qualified_name {
            Some(decl)
        } else {
            find_in(&decl.children, qualified_name)
        }
    })
}

/// Pre-order walk over a declaration forest, yielding each node with its parent kind
pub fn walk_declarations<'a>(
    declarations: &'a [Declaration],
) -> Vec<(&'a Declaration, Option<DeclarationKind>)> {
    fn visit<'a>(
        decl: &'a Declaration,
        parent: Option<DeclarationKind>,
        out: &mut Vec<(&'a Declaration, Option<DeclarationKind>)>,
    ) {
        out.push((decl, parent));
        for child in &decl.children {
            visit(child, Some(decl.kind), out);
        }
    }

    let mut out = Vec::new();
    for decl in declarations {
        visit(decl, None, &mut out);
    }
    out
}

/// In-memory declaration source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationTree {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
}

impl DeclarationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    /// Parse a tree from its JSON representation
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| DiagramError::source_error(e.to_string()).into())
    }

    /// Read and parse a tree from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DiagramError::from)?;
        Self::from_json_str(&content)
    }

    /// All declarations failing structural validation, in pre-order
    pub fn invalid_declarations(&self) -> Vec<DiagramError> {
        walk_declarations(&self.declarations)
            .into_iter()
            .filter_map(|(decl, parent)| decl.validate(parent).err())
            .collect()
    }
}

impl DeclarationSource for DeclarationTree {
    fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    fn top_level_fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    fn top_level_functions(&self) -> &[FunctionDecl] {
        &self.functions
    }
}
