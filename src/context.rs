//! # Compilation Context
//!
//! Owns all state of one compilation run and drives the stages in
//! dependency order:
//!
//! ```text
//! vendor tags → registry → marshalling fixpoint → scopes
//!             → command classification → handle methods
//!             → table validation → BindingModel
//! ```
//!
//! Every stage runs to completion before the next starts. The first fatal
//! error aborts the run and no model is produced.
//!
//! ## Usage
//!
//! ```
//! use bindspec::{CompilationContext, GeneratorOptions, RegistryDocument};
//!
//! let doc = RegistryDocument::from_json(r#"{ "name": "registry" }"#).unwrap();
//! let model = CompilationContext::new(GeneratorOptions::default().without_targets())
//!     .compile(&doc)
//!     .unwrap();
//! assert!(model.commands.is_empty());
//! ```

use crate::command::Classifier;
use crate::config::GeneratorOptions;
use crate::document::RegistryDocument;
use crate::marshal;
use crate::model::{BindingModel, NameMap};
use crate::naming::NameTranslator;
use crate::registry::RegistryBuilder;
use crate::scope::{CommandAliases, ScopeResolver};
use crate::Result;

/// State of one compilation run
#[derive(Debug, Clone)]
pub struct CompilationContext {
    options: GeneratorOptions,
    names: NameTranslator,
}

impl CompilationContext {
    /// Create a context with the given options
    pub fn new(options: GeneratorOptions) -> Self {
        let names = NameTranslator::new(&options);
        Self { options, names }
    }

    /// Options in effect
    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Identifier translator, with any vendor tags learned so far
    pub fn names(&self) -> &NameTranslator {
        &self.names
    }

    /// Run the whole analysis over a document
    pub fn compile(mut self, doc: &RegistryDocument) -> Result<BindingModel> {
        for tag in doc.tags() {
            if let Some(name) = tag.attr("name") {
                self.names.learn_vendor_tag(name);
            }
        }
        tracing::info!("learned {} vendor tags", self.names.vendor_tags().len());

        let mut registry = RegistryBuilder::new(doc, &self.options, &self.names).build()?;
        let marshalling = marshal::analyze(&mut registry)?;

        let aliases = CommandAliases::from_document(doc);
        let resolver = ScopeResolver::new(doc, &self.options, &registry, &aliases);
        let default_scope = resolver.default_scope()?;
        let scopes = resolver.resolve_targets()?;

        let commands =
            Classifier::new(&registry, &self.options, &self.names, &aliases).classify_all(doc)?;

        for classification in &commands {
            let Some(handle) = &classification.bound_handle else {
                continue;
            };
            if let Some(id) = registry.id_of(handle) {
                registry.bind_method(id, &classification.command.name);
            }
        }

        let stale = self.options.validate_tables(&registry, doc)?;
        if stale > 0 {
            tracing::info!("{} stale table entries", stale);
        }

        let handwritten_commands = doc
            .command_names()
            .filter(|name| self.options.handwritten_commands.contains(name))
            .collect();

        Ok(BindingModel {
            name_map: NameMap::from_registry(&registry),
            vendor_tags: self.names.vendor_tags().to_vec(),
            registry,
            default_scope,
            scopes,
            commands,
            handwritten_commands,
            command_aliases: aliases,
            marshalling,
        })
    }
}
