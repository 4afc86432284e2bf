//! Enumeration and bitmask registration
//!
//! Members come from three places, in this order: the enumeration's own
//! `enums` block, then `require/enum[@extends]` entries of every feature, then
//! the same entries of every supported extension. The first member to claim
//! a canonical name wins.

use super::builder::{declared_name, parse_literal, RegistryBuilder};
use super::{EntityKind, EnumMember, Enumeration, TypeId};
use crate::document::{Element, Extension};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Base of extension-offset enum values
pub const EXTENSION_ENUM_BASE: i64 = 1_000_000_000;
/// Values reserved per extension
pub const EXTENSION_ENUM_BLOCK: i64 = 1_000;

/// Value of an extension-offset member: `dir * (base + (ext - 1) * block + offset)`
///
/// `None` when the value does not fit in an `i64`.
pub fn offset_value(extension_number: i64, offset: i64, negative: bool) -> Option<i64> {
    let magnitude = extension_number
        .checked_sub(1)?
        .checked_mul(EXTENSION_ENUM_BLOCK)?
        .checked_add(EXTENSION_ENUM_BASE)?
        .checked_add(offset)?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

/// Compute the literal value of one `enum` entry
///
/// Priority: `value`, then `bitpos`, then `offset`, then `alias`.
/// `block_number` is the enclosing feature/extension's `number` attribute,
/// used when the entry has no `extnumber` of its own; `known` maps raw member
/// names to values computed so far.
pub fn member_value(
    entry: &Element,
    block_number: Option<&str>,
    known: &BTreeMap<String, i64>,
    owner: &str,
) -> Result<i64> {
    let raw = entry.attr("name").unwrap_or_default();

    if let Some(text) = entry.attr("value") {
        return parse_literal(text).ok_or_else(|| {
            Error::malformed(owner, format!("value '{}' of {} is not an integer", text, raw))
        });
    }

    if let Some(text) = entry.attr("bitpos") {
        let bit: u32 = text
            .trim()
            .parse()
            .ok()
            .filter(|b| *b < 63)
            .ok_or_else(|| {
                Error::malformed(owner, format!("bitpos '{}' of {} is out of range", text, raw))
            })?;
        return Ok(1i64 << bit);
    }

    if let Some(text) = entry.attr("offset") {
        let offset: i64 = text.trim().parse().map_err(|_| {
            Error::malformed(owner, format!("offset '{}' of {} is not an integer", text, raw))
        })?;
        let number_text = entry.attr("extnumber").or(block_number).ok_or_else(|| {
            Error::malformed(owner, format!("{} has an offset but no extension number", raw))
        })?;
        let number: i64 = number_text.trim().parse().map_err(|_| {
            Error::malformed(
                owner,
                format!("extension number '{}' of {} is not an integer", number_text, raw),
            )
        })?;
        return offset_value(number, offset, entry.attr("dir") == Some("-")).ok_or_else(|| {
            Error::malformed(
                owner,
                format!("offset {} of {} in extension {} overflows", offset, raw, number),
            )
        });
    }

    if let Some(target) = entry.attr("alias") {
        return known
            .get(target)
            .copied()
            .ok_or_else(|| Error::unknown("enum member", target, owner));
    }

    Err(Error::malformed(
        owner,
        format!("enum member {} has no value, bitpos, offset or alias", raw),
    ))
}

impl<'a> RegistryBuilder<'a> {
    /// Register bitmasks, enumerations, enum aliases and all their members
    pub(crate) fn register_enumerations(&mut self) -> Result<()> {
        let doc = self.doc;
        let names = self.names;

        let mut sources: Vec<(TypeId, String)> = Vec::new();
        let mut aliases: Vec<(String, String)> = Vec::new();

        for ty in doc.types_of("bitmask") {
            let raw = declared_name(ty)
                .ok_or_else(|| Error::malformed("bitmask", "declaration without a name"))?;
            if let Some(target) = ty.attr("alias") {
                aliases.push((raw, target.to_string()));
                continue;
            }
            let name = names.type_name(&raw);
            let id = self.registry.register(&raw, &name, bitmask_kind());
            if let Some(bits) = ty.attr("requires").or_else(|| ty.attr("bitvalues")) {
                self.registry.add_raw_name(bits, id);
                sources.push((id, bits.to_string()));
            }
        }

        for ty in doc.types_of("enum") {
            let raw = declared_name(ty)
                .ok_or_else(|| Error::malformed("enum", "declaration without a name"))?;
            if let Some(target) = ty.attr("alias") {
                aliases.push((raw, target.to_string()));
                continue;
            }
            if self.registry.id_of_raw(&raw).is_some() {
                continue;
            }

            let block = doc.enum_block(&raw);
            let is_bitmask =
                block.and_then(|b| b.attr("type")) == Some("bitmask") || raw.contains("FlagBits");
            let id = if is_bitmask {
                let name = names.flag_bits_name(&names.type_name(&raw));
                self.registry.register(&raw, &name, bitmask_kind())
            } else {
                let name = names.type_name(&raw);
                self.registry.register(
                    &raw,
                    &name,
                    EntityKind::Enumeration(Enumeration::default()),
                )
            };
            sources.push((id, raw));
        }

        let alias_name = |raw: &str| {
            let name = names.type_name(raw);
            if raw.contains("FlagBits") {
                names.flag_bits_name(&name)
            } else {
                name
            }
        };
        let alias_raws: Vec<String> = aliases.iter().map(|(raw, _)| raw.clone()).collect();

        for (raw, target) in aliases {
            let target_name = match self.registry.canonical_of_raw(&target) {
                Some(name) => name.to_string(),
                None if alias_raws.contains(&target) => alias_name(&target),
                None => return Err(Error::unknown("enum", target.as_str(), raw.as_str())),
            };
            let name = alias_name(&raw);
            match self.registry.id_of(&name) {
                Some(existing) => self.registry.add_raw_name(&raw, existing),
                None => {
                    self.registry
                        .register(&raw, &name, EntityKind::Alias { target: target_name });
                }
            }
        }

        let mut known = BTreeMap::new();

        for (id, block_name) in &sources {
            if let Some(block) = doc.enum_block(block_name) {
                for entry in block.elements("enum") {
                    self.add_enum_member(*id, entry, None, &mut known)?;
                }
            }
        }

        for feature in doc.features() {
            self.add_extending_members(feature, &mut known)?;
        }

        let options = self.options;
        let disabled = &options.disabled_extensions;
        for extension in doc.extensions() {
            if extension.is_disabled(disabled) {
                continue;
            }
            self.add_extending_members(extension, &mut known)?;
        }

        Ok(())
    }

    fn add_extending_members(
        &mut self,
        block: Extension<'a>,
        known: &mut BTreeMap<String, i64>,
    ) -> Result<()> {
        for require in block.requires() {
            for entry in require.elements("enum") {
                let Some(extends) = entry.attr("extends") else {
                    continue;
                };
                let id = self
                    .registry
                    .id_of_raw(extends)
                    .ok_or_else(|| Error::unknown("enum", extends, block.name()))?;
                let id = self.registry.resolve_id(id)?;
                self.add_enum_member(id, entry, block.number_text(), known)?;
            }
        }
        Ok(())
    }

    fn add_enum_member(
        &mut self,
        id: TypeId,
        entry: &Element,
        block_number: Option<&str>,
        known: &mut BTreeMap<String, i64>,
    ) -> Result<()> {
        let Some(raw) = entry.attr("name") else {
            return Err(Error::malformed(
                self.registry.get(id).name.as_str(),
                "enum member without a name",
            ));
        };
        let owner = self.registry.get(id).name.clone();
        let value = member_value(entry, block_number, known, &owner)?;
        known.entry(raw.to_string()).or_insert(value);

        let name = self.names.translate_enum_member(raw, &owner)?;
        let EntityKind::Enumeration(enumeration) = &mut self.registry.get_mut(id).kind else {
            return Err(Error::unknown("enum", owner.as_str(), raw));
        };

        if enumeration.member_by_raw(raw).is_some() {
            return Ok(());
        }
        if name == "None" || enumeration.member(&name).is_some() {
            tracing::debug!("{}: member {} collides with {}, skipped", owner, raw, name);
            return Ok(());
        }
        enumeration.members.push(EnumMember {
            name,
            raw_name: raw.to_string(),
            value,
        });
        Ok(())
    }
}

fn bitmask_kind() -> EntityKind {
    EntityKind::Enumeration(Enumeration {
        is_bitmask: true,
        members: vec![EnumMember {
            name: "None".to_string(),
            raw_name: String::new(),
            value: 0,
        }],
    })
}
