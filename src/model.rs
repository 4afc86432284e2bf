//! # Binding Model
//!
//! The fully resolved output of one compilation run, handed to the emitter.
//! Everything is `Serialize` so an emitter in any language can consume it as
//! JSON.

use crate::command::CommandClassification;
use crate::marshal::MarshallingReport;
use crate::naming::VendorTag;
use crate::registry::{TypeEntity, TypeRegistry};
use crate::scope::{CommandAliases, DefaultScope, Scope, ScopeSet};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Raw ↔ canonical names of enumerations, their members and composites
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NameMap {
    /// Raw enumeration name → canonical name
    pub enumerations: BTreeMap<String, String>,
    /// Raw member name → `Enumeration.Member`
    pub enum_members: BTreeMap<String, String>,
    /// Raw composite name → canonical name
    pub composites: BTreeMap<String, String>,
}

impl NameMap {
    /// Collect the map from a finished registry
    pub fn from_registry(registry: &TypeRegistry) -> Self {
        let mut map = NameMap::default();
        for (entity, enumeration) in registry.enumerations() {
            map.enumerations
                .insert(entity.raw_name.clone(), entity.name.clone());
            for member in enumeration.members.iter().filter(|m| !m.raw_name.is_empty()) {
                map.enum_members.insert(
                    member.raw_name.clone(),
                    format!("{}.{}", entity.name, member.name),
                );
            }
        }
        for (entity, composite) in registry.composites() {
            if !composite.foreign {
                map.composites
                    .insert(entity.raw_name.clone(), entity.name.clone());
            }
        }
        map
    }

    /// Canonical name for any mapped raw name
    pub fn canonical(&self, raw: &str) -> Option<&str> {
        self.enumerations
            .get(raw)
            .or_else(|| self.enum_members.get(raw))
            .or_else(|| self.composites.get(raw))
            .map(String::as_str)
    }

    /// Raw name for a canonical enumeration or composite name
    pub fn raw(&self, canonical: &str) -> Option<&str> {
        self.enumerations
            .iter()
            .chain(self.composites.iter())
            .chain(self.enum_members.iter())
            .find(|(_, c)| c.as_str() == canonical)
            .map(|(raw, _)| raw.as_str())
    }
}

/// Resolved model of one document
#[derive(Debug, Clone, Serialize)]
pub struct BindingModel {
    /// Every registered type with marshalling flags set
    pub registry: TypeRegistry,
    /// Vendor tags in document order
    pub vendor_tags: Vec<VendorTag>,
    /// Visibility of the unscoped build
    pub default_scope: DefaultScope,
    /// Visibility of each configured target, in name order
    pub scopes: Vec<ScopeSet>,
    /// Classified commands in document order
    pub commands: Vec<CommandClassification>,
    /// Raw names of commands wrapped by hand (visible, never classified)
    pub handwritten_commands: Vec<String>,
    /// Command alias table
    pub command_aliases: CommandAliases,
    /// Raw ↔ canonical name map
    pub name_map: NameMap,
    /// Flag sets of the marshalling fixpoint
    pub marshalling: MarshallingReport,
}

impl BindingModel {
    /// Serialize the model as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::serialization("binding model", e))
    }

    /// Classification of a command by raw name, following command aliases
    pub fn command(&self, raw: &str) -> Option<&CommandClassification> {
        let target = self.command_aliases.resolve_or_self(raw);
        self.commands.iter().find(|c| c.command.name == target)
    }

    /// Resolved type by canonical name
    pub fn type_named(&self, name: &str) -> Option<&TypeEntity> {
        self.registry.resolve(name).ok()
    }

    /// Scope of a target, or the default scope for `None`
    pub fn scope(&self, target: Option<&str>) -> Option<Scope> {
        match target {
            None => Some(Scope::Default(self.default_scope.clone())),
            Some(name) => self
                .scopes
                .iter()
                .find(|s| s.target == name)
                .cloned()
                .map(Scope::Target),
        }
    }

    /// Commands visible in a scope, in document order
    pub fn visible_commands<'a>(
        &'a self,
        scope: &'a Scope,
    ) -> impl Iterator<Item = &'a CommandClassification> + 'a {
        self.commands
            .iter()
            .filter(move |c| scope.is_command_visible(&self.command_aliases, &c.command.name))
    }

    /// Canonical names of types visible in a scope, aliases excluded
    pub fn visible_types<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a str> + 'a {
        self.registry
            .entities()
            .filter(|(_, e)| !e.is_alias())
            .filter(move |(_, e)| scope.is_type_visible(&self.registry, &e.name))
            .map(|(_, e)| e.name.as_str())
    }
}
