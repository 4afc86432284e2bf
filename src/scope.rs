//! # Extension Scope Resolver
//!
//! Decides which types and commands are visible in a build.
//!
//! ```text
//! default build : everything, minus
//!                   names required only by disabled extensions
//!                   denied types / disabled commands from the options
//! target build  : exactly the union of `require` lists of the target's
//!                 extensions (disabled extensions contribute nothing)
//! ```
//!
//! Type names are stored canonical and resolved through aliases, command
//! names raw and resolved through command aliases, so an alias is visible
//! exactly when its target is. Scopes are independent values; resolving one
//! never touches another.

use crate::config::GeneratorOptions;
use crate::document::{Extension, RegistryDocument};
use crate::registry::TypeRegistry;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Command alias table (`vkFooKHR` → `vkFoo`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandAliases {
    targets: BTreeMap<String, String>,
}

impl CommandAliases {
    /// Read the alias table from a document
    pub fn from_document(doc: &RegistryDocument) -> Self {
        Self {
            targets: doc.command_aliases(),
        }
    }

    /// Whether a raw command name is an alias
    pub fn is_alias(&self, raw: &str) -> bool {
        self.targets.contains_key(raw)
    }

    /// Follow alias links from `raw` to the concrete command
    pub fn resolve(&self, raw: &str) -> Result<String> {
        let mut current = raw;
        let mut seen = BTreeSet::new();
        while let Some(target) = self.targets.get(current) {
            if !seen.insert(current) {
                return Err(Error::AliasCycle {
                    name: raw.to_string(),
                });
            }
            current = target;
        }
        Ok(current.to_string())
    }

    /// Resolve, falling back to the name itself when the chain is broken
    pub fn resolve_or_self(&self, raw: &str) -> String {
        self.resolve(raw).unwrap_or_else(|_| raw.to_string())
    }
}

/// Visibility of the unscoped build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefaultScope {
    /// Canonical type names hidden from the build
    pub hidden_type_names: BTreeSet<String>,
    /// Raw command names hidden from the build
    pub hidden_command_names: BTreeSet<String>,
}

/// Visibility of one named build target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopeSet {
    /// Target name
    pub target: String,
    /// Extensions that contributed to the scope
    pub extensions: Vec<String>,
    /// Canonical names of visible types
    pub required_type_names: BTreeSet<String>,
    /// Raw names of visible commands
    pub required_command_names: BTreeSet<String>,
    /// Preprocessor macros guarding the contributing platforms
    pub protect: BTreeSet<String>,
}

/// A resolved scope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scope {
    /// The unscoped build
    Default(DefaultScope),
    /// A named build target
    Target(ScopeSet),
}

impl Scope {
    /// Whether a type (canonical name) is visible
    pub fn is_type_visible(&self, registry: &TypeRegistry, name: &str) -> bool {
        let resolved = registry
            .resolve(name)
            .map(|e| e.name.as_str())
            .unwrap_or(name);
        match self {
            Scope::Default(d) => !d.hidden_type_names.contains(resolved),
            Scope::Target(s) => s.required_type_names.contains(resolved),
        }
    }

    /// Whether a command (raw name) is visible
    pub fn is_command_visible(&self, aliases: &CommandAliases, raw: &str) -> bool {
        let resolved = aliases.resolve_or_self(raw);
        match self {
            Scope::Default(d) => !d.hidden_command_names.contains(&resolved),
            Scope::Target(s) => s.required_command_names.contains(&resolved),
        }
    }
}

/// Computes scopes over one document and registry
pub struct ScopeResolver<'a> {
    doc: &'a RegistryDocument,
    options: &'a GeneratorOptions,
    registry: &'a TypeRegistry,
    aliases: &'a CommandAliases,
}

#[derive(Default)]
struct Required {
    types: BTreeSet<String>,
    commands: BTreeSet<String>,
}

impl<'a> ScopeResolver<'a> {
    /// Create a resolver
    pub fn new(
        doc: &'a RegistryDocument,
        options: &'a GeneratorOptions,
        registry: &'a TypeRegistry,
        aliases: &'a CommandAliases,
    ) -> Self {
        Self {
            doc,
            options,
            registry,
            aliases,
        }
    }

    fn canonical_type(&self, raw: &str) -> String {
        match self.registry.resolve_raw(raw) {
            Ok(entity) => entity.name.clone(),
            Err(_) => raw.to_string(),
        }
    }

    fn collect(&self, block: Extension<'_>, into: &mut Required) -> Result<()> {
        for name in block.required_names("type") {
            into.types.insert(self.canonical_type(name));
        }
        for name in block.required_names("command") {
            into.commands.insert(self.aliases.resolve(name)?);
        }
        Ok(())
    }

    /// Visibility of the unscoped build
    pub fn default_scope(&self) -> Result<DefaultScope> {
        let disabled_list = &self.options.disabled_extensions;
        let mut enabled = Required::default();
        let mut disabled = Required::default();

        for feature in self.doc.features() {
            self.collect(feature, &mut enabled)?;
        }
        for extension in self.doc.extensions() {
            if extension.is_disabled(disabled_list) {
                self.collect(extension, &mut disabled)?;
            } else {
                self.collect(extension, &mut enabled)?;
            }
        }

        let mut scope = DefaultScope {
            hidden_type_names: disabled.types.difference(&enabled.types).cloned().collect(),
            hidden_command_names: disabled
                .commands
                .difference(&enabled.commands)
                .cloned()
                .collect(),
        };

        for denied in &self.options.denied_types {
            let name = self
                .registry
                .resolve(denied)
                .map(|e| e.name.clone())
                .unwrap_or_else(|_| denied.clone());
            scope.hidden_type_names.insert(name);
        }
        for command in &self.options.disabled_commands {
            scope
                .hidden_command_names
                .insert(self.aliases.resolve_or_self(command));
        }

        tracing::info!(
            "default scope hides {} types and {} commands",
            scope.hidden_type_names.len(),
            scope.hidden_command_names.len()
        );
        Ok(scope)
    }

    /// Visibility of a named target built from the given extensions
    pub fn resolve_scope(&self, target: &str, extension_names: &[String]) -> Result<ScopeSet> {
        let mut required = Required::default();
        let mut scope = ScopeSet {
            target: target.to_string(),
            ..ScopeSet::default()
        };

        for name in extension_names {
            let extension = self
                .doc
                .extension(name)
                .ok_or_else(|| Error::unknown("extension", name.as_str(), target))?;
            if extension.is_disabled(&self.options.disabled_extensions) {
                tracing::debug!("{}: extension {} is disabled, skipped", target, name);
                continue;
            }

            self.collect(extension, &mut required)?;
            scope.extensions.push(name.clone());

            if let Some(platform) = extension.platform() {
                let protect = self
                    .registry
                    .platforms
                    .iter()
                    .find(|p| p.name == platform)
                    .and_then(|p| p.protect.clone());
                scope.protect.extend(protect);
            }
        }

        scope.required_type_names = required.types;
        scope.required_command_names = required.commands;

        tracing::info!(
            "scope {}: {} types, {} commands from {} extensions",
            target,
            scope.required_type_names.len(),
            scope.required_command_names.len(),
            scope.extensions.len()
        );
        Ok(scope)
    }

    /// Resolve every target configured in the options, in name order
    pub fn resolve_targets(&self) -> Result<Vec<ScopeSet>> {
        self.options
            .targets
            .iter()
            .map(|(target, extensions)| self.resolve_scope(target, extensions))
            .collect()
    }
}
