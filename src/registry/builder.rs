//! Registration driver: walks the document in dependency order

use super::{Composite, CompositeKind, EntityKind, NativeWidth, Platform, TypeRegistry};
use crate::config::GeneratorOptions;
use crate::document::{Element, RegistryDocument, API_CONSTANTS};
use crate::naming::NameTranslator;
use crate::{Error, Result};

/// Builds a [`TypeRegistry`] from a document
///
/// Registration is split across `enums.rs`, `handles.rs` and `composite.rs`;
/// this file covers the leaves (built-ins, platform types, function pointers,
/// base types, API constants) and drives the whole sequence.
pub struct RegistryBuilder<'a> {
    pub(crate) doc: &'a RegistryDocument,
    pub(crate) options: &'a GeneratorOptions,
    pub(crate) names: &'a NameTranslator,
    pub(crate) registry: TypeRegistry,
}

/// Name of a `type` declaration: the `name` attribute or the `name` child
pub(crate) fn declared_name(element: &Element) -> Option<String> {
    element
        .attr("name")
        .map(str::to_string)
        .or_else(|| element.child_text("name"))
}

/// Parse an integer literal as written in the document
///
/// Accepts decimal, `0x` hex, a leading `-`, C suffixes (`U`, `ULL`) and
/// the `(~N)` complement forms used by API constants.
pub fn parse_literal(text: &str) -> Option<i64> {
    let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')').trim();

    let (negated, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };
    let (complement, body) = match body.strip_prefix('~') {
        Some(rest) => (true, rest.trim()),
        None => (false, body),
    };

    let lower = body.to_ascii_lowercase();
    let wide = lower.ends_with("ull") || lower.ends_with("ll");
    let digits = lower.trim_end_matches(|c| c == 'u' || c == 'l');

    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u64>().ok()?,
    };

    let value = if complement {
        if wide {
            !magnitude as i64
        } else {
            i64::from(!(magnitude as u32))
        }
    } else if negated {
        return i64::try_from(-i128::from(magnitude)).ok();
    } else {
        magnitude as i64
    };

    if negated {
        value.checked_neg()
    } else {
        Some(value)
    }
}

impl<'a> RegistryBuilder<'a> {
    /// Create a builder over a document
    pub fn new(
        doc: &'a RegistryDocument,
        options: &'a GeneratorOptions,
        names: &'a NameTranslator,
    ) -> Self {
        Self {
            doc,
            options,
            names,
            registry: TypeRegistry::new(),
        }
    }

    /// Register every declared type, in dependency order
    pub fn build(mut self) -> Result<TypeRegistry> {
        self.learn_platforms();
        self.register_includes()?;
        self.register_basetypes()?;
        self.register_constants()?;
        self.register_enumerations()?;
        self.register_handles()?;
        self.register_composites()?;
        self.registry.check_aliases()?;

        tracing::info!(
            "registered {} types ({} enumerations, {} handles, {} composites, {} constants)",
            self.registry.len(),
            self.registry.enumerations().count(),
            self.registry.handles().count(),
            self.registry.composites().count(),
            self.registry.constants.len()
        );
        Ok(self.registry)
    }

    fn learn_platforms(&mut self) {
        for platform in self.doc.platforms() {
            if let Some(name) = platform.attr("name") {
                self.registry.platforms.push(Platform {
                    name: name.to_string(),
                    protect: platform.attr("protect").map(str::to_string),
                });
            }
        }
    }

    fn register_primitive(&mut self, raw: &str, name: &str, width: NativeWidth) -> String {
        let id = self
            .registry
            .register(raw, name, EntityKind::Primitive { width });
        self.registry.get(id).name.clone()
    }

    /// Built-ins, foreign structs, platform types and function pointers
    fn register_includes(&mut self) -> Result<()> {
        let (doc, options) = (self.doc, self.options);

        for (raw, width) in &options.builtin_types {
            self.register_primitive(raw, width.canonical_name(), *width);
        }

        for (raw, name) in &options.foreign_structs {
            let mut shell = Composite::new(CompositeKind::Struct);
            shell.foreign = true;
            self.registry
                .register(raw, name, EntityKind::Composite(shell));
        }

        for ty in doc.types() {
            let category = ty.attr("category");
            let Some(raw) = declared_name(ty) else {
                continue;
            };

            match category {
                None if ty.attr("requires").is_some() => self.register_foreign(&raw)?,
                Some("funcpointer") => {
                    let name = self.names.type_name(&raw);
                    self.register_primitive(&raw, &name, NativeWidth::Pointer);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn register_foreign(&mut self, raw: &str) -> Result<()> {
        if self.registry.id_of_raw(raw).is_some() {
            return Ok(());
        }
        if raw.ends_with("_t") {
            self.type_reference(raw, "platform types")?;
            return Ok(());
        }
        let options = self.options;
        match options.foreign_types.get(raw) {
            Some(width) => {
                self.register_primitive(raw, raw, *width);
            }
            None => {
                tracing::warn!("platform type {} has no mapping, registered as opaque", raw);
                self.register_primitive(raw, raw, NativeWidth::Opaque);
            }
        }
        Ok(())
    }

    /// `category="basetype"`: named primitives carrying their target's width
    fn register_basetypes(&mut self) -> Result<()> {
        let doc = self.doc;
        for ty in doc.types_of("basetype") {
            let raw = declared_name(ty)
                .ok_or_else(|| Error::malformed("basetype", "declaration without a name"))?;
            let name = self.names.type_name(&raw);

            let width = match ty.child_text("type") {
                Some(target) => {
                    let target = self.type_reference(target.trim(), &name)?;
                    self.registry
                        .resolve(&target)?
                        .as_primitive()
                        .unwrap_or(NativeWidth::Opaque)
                }
                None => NativeWidth::Opaque,
            };
            self.register_primitive(&raw, &name, width);
        }
        Ok(())
    }

    /// Integer constants of the `API Constants` block
    fn register_constants(&mut self) -> Result<()> {
        let doc = self.doc;
        let Some(block) = doc.enum_block(API_CONSTANTS) else {
            return Ok(());
        };

        for constant in block.elements("enum") {
            let Some(raw) = constant.attr("name") else {
                continue;
            };
            if let Some(target) = constant.attr("alias") {
                let value = *self
                    .registry
                    .constants
                    .get(target)
                    .ok_or_else(|| Error::unknown("API constant", target, raw))?;
                self.registry.constants.insert(raw.to_string(), value);
                continue;
            }
            match constant.attr("value").and_then(parse_literal) {
                Some(value) => {
                    self.registry.constants.insert(raw.to_string(), value);
                }
                None => tracing::debug!("API constant {} is not an integer, skipped", raw),
            }
        }
        Ok(())
    }

    /// Canonical name of a type referenced from `context`
    ///
    /// Already registered names are returned as is. Built-in, `*_t`,
    /// function-pointer and platform types are registered on first use; an
    /// unmapped `*_t` type is fatal.
    pub(crate) fn type_reference(&mut self, raw: &str, context: &str) -> Result<String> {
        if let Some(name) = self.registry.canonical_of_raw(raw) {
            return Ok(name.to_string());
        }
        let options = self.options;
        if let Some(width) = options.builtin_types.get(raw) {
            return Ok(self.register_primitive(raw, width.canonical_name(), *width));
        }
        if raw.ends_with("_t") {
            let width = *options
                .basic_types
                .get(raw)
                .ok_or_else(|| Error::UnmappedBasicType {
                    name: raw.to_string(),
                })?;
            return Ok(self.register_primitive(raw, width.canonical_name(), width));
        }
        if raw.starts_with("PFN_") {
            return Ok(self.register_primitive(raw, raw, NativeWidth::Pointer));
        }
        if let Some(width) = options.foreign_types.get(raw) {
            return Ok(self.register_primitive(raw, raw, *width));
        }
        Err(Error::unknown("type", raw, context))
    }
}
