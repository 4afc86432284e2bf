//! Opaque handle registration

use super::builder::{declared_name, RegistryBuilder};
use super::{EntityKind, Handle};
use crate::{Error, Result};

/// Macro declaring a pointer-sized handle
pub const DISPATCHABLE_MACRO: &str = "VK_DEFINE_HANDLE";
/// Macro declaring a 64-bit integer handle
pub const NON_DISPATCHABLE_MACRO: &str = "VK_DEFINE_NON_DISPATCHABLE_HANDLE";

/// Dispatchability implied by a handle-defining macro
pub fn is_dispatchable(macro_name: &str, owner: &str) -> Result<bool> {
    match macro_name.trim() {
        DISPATCHABLE_MACRO => Ok(true),
        NON_DISPATCHABLE_MACRO => Ok(false),
        other => Err(Error::unrecognized(
            format!("handle macro '{}'", other),
            owner,
        )),
    }
}

impl<'a> RegistryBuilder<'a> {
    /// Register `category="handle"` types and their aliases
    pub(crate) fn register_handles(&mut self) -> Result<()> {
        let doc = self.doc;
        let mut aliases = Vec::new();

        for ty in doc.types_of("handle") {
            let raw = declared_name(ty)
                .ok_or_else(|| Error::malformed("handle", "declaration without a name"))?;
            if let Some(target) = ty.attr("alias") {
                aliases.push((raw, target.to_string()));
                continue;
            }

            let name = self.names.type_name(&raw);
            let macro_name = ty
                .child_text("type")
                .ok_or_else(|| Error::malformed(name.as_str(), "handle without a defining macro"))?;
            let dispatchable = is_dispatchable(&macro_name, &name)?;
            let parent = ty
                .attr("parent")
                .and_then(|p| p.split(',').next())
                .map(|p| p.trim().to_string());

            self.registry.register(
                &raw,
                &name,
                EntityKind::Handle(Handle {
                    dispatchable,
                    parent,
                    methods: Vec::new(),
                }),
            );
        }

        for (raw, target) in aliases {
            let target = self
                .registry
                .canonical_of_raw(&target)
                .ok_or_else(|| Error::unknown("handle", target.as_str(), raw.as_str()))?
                .to_string();
            let name = self.names.type_name(&raw);
            self.registry
                .register(&raw, &name, EntityKind::Alias { target });
        }
        Ok(())
    }
}
