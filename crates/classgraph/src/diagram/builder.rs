//! Diagram model builder
//!
//! Walks the declaration source once, in pre-order, and produces one entity
//! per accepted declaration. Companion members are folded into their owner
//! and extension members are attached to their receiver, which becomes a
//! shell entity when it is not part of the rendered set.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, info, span, trace, warn, Level};

use super::model::{Decoration, DiagramModel, Entity, EntityKind, Field, MemberModifier, Method};
use crate::core::{
    simple_name, walk_declarations, Declaration, DeclarationFilter, DeclarationKind,
    DeclarationSource, DiagramConfig, FieldDecl, FunctionDecl, Modifier, TypeRef,
};

/// An extension member; `on_companion` marks a companion-object receiver
#[derive(Debug)]
struct Extension<'s, T> {
    member: &'s T,
    on_companion: bool,
}

/// Extension members registered against one receiver type
#[derive(Debug, Default)]
struct ExtensionMembers<'s> {
    fields: Vec<Extension<'s, FieldDecl>>,
    functions: Vec<Extension<'s, FunctionDecl>>,
}

impl ExtensionMembers<'_> {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.functions.is_empty()
    }
}

/// State accumulated during one traversal
struct BuildContext<'s> {
    model: DiagramModel,
    /// Receiver qualified name to extension members, in first-encounter order
    extensions: IndexMap<&'s str, ExtensionMembers<'s>>,
    /// Receivers that became regular entities
    claimed: HashSet<String>,
    skipped: usize,
}

/// Builds a [`DiagramModel`] from a declaration source
pub struct ModelBuilder<'a> {
    config: &'a DiagramConfig,
    filter: DeclarationFilter<'a>,
}

fn entity_kind(kind: DeclarationKind) -> Option<EntityKind> {
    match kind {
        DeclarationKind::Class => Some(EntityKind::Class),
        DeclarationKind::Interface => Some(EntityKind::Interface),
        DeclarationKind::Enum => Some(EntityKind::Enum),
        DeclarationKind::Object => Some(EntityKind::Singleton),
        DeclarationKind::TypeAlias => Some(EntityKind::TypeAlias),
        DeclarationKind::EnumEntry => None,
    }
}

fn field_modifiers(field: &FieldDecl) -> Vec<MemberModifier> {
    field
        .modifiers
        .iter()
        .filter_map(|m| match m {
            Modifier::Static => Some(MemberModifier::Static),
            Modifier::Const => Some(MemberModifier::Const),
            _ => None,
        })
        .collect()
}

fn function_modifiers(function: &FunctionDecl) -> Vec<MemberModifier> {
    function
        .modifiers
        .iter()
        .filter_map(|m| match m {
            Modifier::Static => Some(MemberModifier::Static),
            Modifier::Suspend => Some(MemberModifier::Suspend),
            Modifier::Abstract => Some(MemberModifier::Abstract),
            _ => None,
        })
        .collect()
}

/// Add `modifier` unless already present
fn with_modifier(mut modifiers: Vec<MemberModifier>, modifier: MemberModifier) -> Vec<MemberModifier> {
    if !modifiers.contains(&modifier) {
        modifiers.insert(0, modifier);
    }
    modifiers
}

fn extension_modifiers(modifiers: Vec<MemberModifier>, on_companion: bool) -> Vec<MemberModifier> {
    let modifiers = with_modifier(modifiers, MemberModifier::Extension);
    if on_companion {
        with_modifier(modifiers, MemberModifier::Static)
    } else {
        modifiers
    }
}

/// Companion qualified name to owner qualified name
fn companion_owners(declarations: &[Declaration]) -> HashMap<&str, &str> {
    walk_declarations(declarations)
        .into_iter()
        .flat_map(|(owner, _)| {
            owner
                .children
                .iter()
                .filter(|c| c.is_companion())
                .map(move |c| (c.qualified_name.as_str(), owner.qualified_name.as_str()))
        })
        .collect()
}

/// Package of a type known only by name: everything before the last segment
fn guess_package(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}

impl<'a> ModelBuilder<'a> {
    pub fn new(config: &'a DiagramConfig) -> Self {
        Self {
            config,
            filter: DeclarationFilter::new(config),
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        self.config
    }

    /// Build the entity set for `source`
    ///
    /// Invalid declarations are skipped with a warning. Fails only on an
    /// alias collision.
    pub fn build<S: DeclarationSource + ?Sized>(&self, source: &S) -> Result<DiagramModel> {
        let build_span = span!(
            Level::INFO,
            "build_model",
            roots = source.declarations().len()
        );
        let _enter = build_span.enter();

        let mut ctx = BuildContext {
            model: DiagramModel::new(),
            extensions: self.collect_extensions(source),
            claimed: HashSet::new(),
            skipped: 0,
        };
        debug!(receivers = ctx.extensions.len(), "Collected extension members");

        for (decl, parent) in walk_declarations(source.declarations()) {
            if decl.validate(parent).is_ok() {
                ctx.model.register_known_declaration(decl.qualified_name.as_str());
            }
        }

        for decl in source.declarations() {
            self.visit(decl, None, &mut ctx)?;
        }

        self.add_shells(source, &mut ctx)?;

        info!(
            entities = ctx.model.entity_count(),
            skipped = ctx.skipped,
            "Model built"
        );
        Ok(ctx.model)
    }

    /// Index every accepted extension member by receiver
    ///
    /// Members of skipped declarations are ignored. A companion receiver is
    /// keyed by its owner.
    fn collect_extensions<'s, S: DeclarationSource + ?Sized>(
        &self,
        source: &'s S,
    ) -> IndexMap<&'s str, ExtensionMembers<'s>> {
        let mut index: IndexMap<&'s str, ExtensionMembers<'s>> = IndexMap::new();
        let companions = companion_owners(source.declarations());
        let receiver_key = |name: &'s str| match companions.get(name) {
            Some(&owner) => (owner, true),
            None => (name, false),
        };

        let mut fields: Vec<&'s FieldDecl> = source.top_level_fields().iter().collect();
        let mut functions: Vec<&'s FunctionDecl> = source.top_level_functions().iter().collect();
        for decl in source.declarations() {
            self.collect_members(decl, None, &mut fields, &mut functions);
        }

        for field in fields {
            let Some(receiver) = field.receiver.as_ref() else {
                continue;
            };
            let Some(name) = receiver.name.as_deref() else {
                debug!(member = %field.name, "Extension property on unresolved receiver ignored");
                continue;
            };
            if self.filter.accepts_field(field) {
                let (key, on_companion) = receiver_key(name);
                index.entry(key).or_default().fields.push(Extension {
                    member: field,
                    on_companion,
                });
            }
        }
        for function in functions {
            let Some(receiver) = function.receiver.as_ref() else {
                continue;
            };
            let Some(name) = receiver.name.as_deref() else {
                debug!(member = %function.name, "Extension function on unresolved receiver ignored");
                continue;
            };
            if self.filter.accepts_function(function) {
                let (key, on_companion) = receiver_key(name);
                index.entry(key).or_default().functions.push(Extension {
                    member: function,
                    on_companion,
                });
            }
        }

        index
    }

    /// Members of `decl` and of every descendant `visit` would render
    fn collect_members<'s>(
        &self,
        decl: &'s Declaration,
        parent: Option<DeclarationKind>,
        fields: &mut Vec<&'s FieldDecl>,
        functions: &mut Vec<&'s FunctionDecl>,
    ) {
        if decl.validate(parent).is_err() || entity_kind(decl.kind).is_none() {
            return;
        }
        if !self.filter.accepts_declaration(decl) {
            return;
        }

        fields.extend(decl.fields.iter());
        functions.extend(decl.functions.iter());
        for child in &decl.children {
            if child.is_companion() {
                fields.extend(child.fields.iter());
                functions.extend(child.functions.iter());
            } else if child.kind != DeclarationKind::EnumEntry {
                self.collect_members(child, Some(decl.kind), fields, functions);
            }
        }
    }

    fn visit(
        &self,
        decl: &Declaration,
        parent: Option<DeclarationKind>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<()> {
        if let Err(e) = decl.validate(parent) {
            warn!(declaration = %decl.qualified_name, error = %e, "Skipping invalid declaration");
            ctx.skipped += 1;
            return Ok(());
        }
        let Some(kind) = entity_kind(decl.kind) else {
            return Ok(());
        };
        if !self.filter.accepts_declaration(decl) {
            trace!(declaration = %decl.qualified_name, "Declaration filtered out");
            return Ok(());
        }

        let entity = self.build_entity(decl, kind, ctx);
        if ctx.model.add_entity(entity)? {
            ctx.claimed.insert(decl.qualified_name.clone());
        }

        for child in &decl.children {
            if child.is_companion() || child.kind == DeclarationKind::EnumEntry {
                continue;
            }
            self.visit(child, Some(decl.kind), ctx)?;
        }
        Ok(())
    }

    fn build_entity(&self, decl: &Declaration, kind: EntityKind, ctx: &BuildContext<'_>) -> Entity {
        let mut entity = Entity::new(kind, &decl.qualified_name, decl.display_name(), &decl.package);
        entity.supertypes = decl.supertypes.clone();
        entity.decorations = self.decorations(decl, kind);

        for field in decl.fields.iter().filter(|f| f.receiver.is_none()) {
            if self.filter.accepts_field(field) {
                entity.attributes.push(self.field(&decl.qualified_name, field, field_modifiers(field)));
            }
        }
        for function in decl.functions.iter().filter(|f| f.receiver.is_none()) {
            if self.filter.accepts_function(function) {
                entity.methods.push(self.method(&decl.qualified_name, function, function_modifiers(function)));
            }
        }

        for companion in decl.children.iter().filter(|c| c.is_companion()) {
            trace!(owner = %decl.qualified_name, companion = %companion.qualified_name, "Merging companion members");
            for field in companion.fields.iter().filter(|f| f.receiver.is_none()) {
                if self.filter.accepts_field(field) {
                    let modifiers = with_modifier(field_modifiers(field), MemberModifier::Static);
                    entity.attributes.push(self.field(&decl.qualified_name, field, modifiers));
                }
            }
            for function in companion.functions.iter().filter(|f| f.receiver.is_none()) {
                if self.filter.accepts_function(function) {
                    let modifiers = with_modifier(function_modifiers(function), MemberModifier::Static);
                    entity.methods.push(self.method(&decl.qualified_name, function, modifiers));
                }
            }
        }

        if let Some(extensions) = ctx.extensions.get(decl.qualified_name.as_str()) {
            self.attach_extensions(&mut entity, extensions);
        }

        entity
    }

    fn decorations(&self, decl: &Declaration, kind: EntityKind) -> Vec<Decoration> {
        let mut decorations = Vec::new();
        if kind == EntityKind::Class && decl.has_modifier(Modifier::Abstract) {
            decorations.push(Decoration::Abstract);
        }
        if decl.has_modifier(Modifier::Sealed) {
            decorations.push(Decoration::Sealed);
        }
        if decl.has_modifier(Modifier::Data) {
            decorations.push(Decoration::Data);
        }
        if decl.has_modifier(Modifier::Value) {
            decorations.push(Decoration::Value);
        }
        match kind {
            EntityKind::Singleton => decorations.push(Decoration::Object),
            EntityKind::TypeAlias => {
                if let Some(aliased) = &decl.aliased_type {
                    decorations.push(Decoration::AliasOf(aliased.clone()));
                }
            }
            EntityKind::Enum => {
                let entries: Vec<String> = decl
                    .children
                    .iter()
                    .filter(|c| c.kind == DeclarationKind::EnumEntry)
                    .map(|c| c.simple_name().to_string())
                    .collect();
                decorations.push(Decoration::EnumEntries(entries));
            }
            EntityKind::Class | EntityKind::Interface => {}
        }
        decorations
    }

    fn attach_extensions(&self, entity: &mut Entity, extensions: &ExtensionMembers<'_>) {
        for ext in &extensions.fields {
            let modifiers = extension_modifiers(field_modifiers(ext.member), ext.on_companion);
            let field = self.field(&entity.unique_id, ext.member, modifiers);
            entity.attributes.push(field);
        }
        for ext in &extensions.functions {
            let modifiers = extension_modifiers(function_modifiers(ext.member), ext.on_companion);
            let method = self.method(&entity.unique_id, ext.member, modifiers);
            entity.methods.push(method);
        }
    }

    fn field(&self, owner: &str, field: &FieldDecl, modifiers: Vec<MemberModifier>) -> Field {
        note_unresolved(owner, &field.name, &field.type_ref);
        Field {
            name: field.name.clone(),
            type_ref: field.type_ref.clone(),
            visibility: field.visibility,
            modifiers,
        }
    }

    fn method(&self, owner: &str, function: &FunctionDecl, modifiers: Vec<MemberModifier>) -> Method {
        note_unresolved(owner, &function.name, &function.return_type);
        Method {
            name: function.name.clone(),
            parameters: function.parameters.iter().map(|p| p.type_ref.clone()).collect(),
            return_type: function.return_type.clone(),
            visibility: function.visibility,
            modifiers,
        }
    }

    /// Create shells for extension receivers that are not rendered entities
    fn add_shells<S: DeclarationSource + ?Sized>(&self, source: &S, ctx: &mut BuildContext<'_>) -> Result<()> {
        let mut shells = Vec::new();
        for (&receiver, members) in &ctx.extensions {
            if ctx.claimed.contains(receiver) || members.is_empty() {
                continue;
            }

            let known = source.find(receiver);
            let package = known.map_or_else(|| guess_package(receiver), |d| d.package.as_str());
            if self.filter.is_package_excluded(package) || self.filter.is_declaration_name_excluded(receiver) {
                debug!(receiver, "Extension receiver excluded, no shell created");
                continue;
            }

            let display = known.map_or_else(|| simple_name(receiver), |d| d.display_name());
            let mut shell = Entity::shell(receiver, display, package);
            self.attach_extensions(&mut shell, members);
            shells.push(shell);
        }

        debug!(shells = shells.len(), "Creating shell entities");
        for shell in shells {
            ctx.model.add_entity(shell)?;
        }
        Ok(())
    }
}

fn note_unresolved(owner: &str, member: &str, type_ref: &TypeRef) {
    if !type_ref.is_resolved() {
        debug!(owner, member, "Unresolved member type rendered as placeholder");
    }
}
