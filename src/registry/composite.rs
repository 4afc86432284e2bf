//! Structure and union registration
//!
//! Composites are registered in two phases so members may reference any
//! composite declared anywhere in the document: first every shell, then every
//! member list.

use super::builder::{declared_name, RegistryBuilder};
use super::{ArrayLength, Arity, Composite, CompositeKind, EntityKind, MemberEntity, TypeId};
use crate::document::Element;
use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    static ref ARRAY_DIMENSION: Regex =
        Regex::new(r"\[\s*(\d+)\s*\]").expect("array dimension pattern is valid");
}

/// Length attribute value marking a NUL-terminated string
pub const NULL_TERMINATED: &str = "null-terminated";

/// A parsed `member` or `param` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    /// Raw declared type
    pub raw_type: String,
    /// Raw declared name
    pub raw_name: String,
    /// `T*`
    pub is_pointer: bool,
    /// `const` appears in a pointer declaration
    pub is_const: bool,
    /// `T**` or `T* const*`
    pub is_double_pointer: bool,
    /// Inline array length, if the declaration has `[...]`
    pub fixed_length: Option<ArrayLength>,
    /// Raw `len` attribute
    pub len: Option<String>,
    /// First entry of the `optional` attribute
    pub optional: bool,
}

impl Declarator {
    /// Sibling named by `len` as element count, ignoring string markers and
    /// formula-only lengths
    pub fn length_reference(&self) -> Option<&str> {
        let first = self.len.as_deref()?.split(',').next()?.trim();
        if first.is_empty() || first == NULL_TERMINATED || first.starts_with("latexmath") {
            None
        } else {
            Some(first)
        }
    }

    /// Whether the declaration is a NUL-terminated string
    pub fn is_text(&self) -> bool {
        self.raw_type == "char" && self.is_pointer && !self.is_double_pointer
    }
}

/// Parse one declaration node
///
/// Pointer markers are read from the text between the `type` and `name`
/// children; fixed array lengths from the direct text after the name, or from
/// a nested `enum` child naming an API constant.
pub fn parse_declarator(
    element: &Element,
    owner: &str,
    constants: &BTreeMap<String, i64>,
) -> Result<Declarator> {
    let raw_type = element
        .child_text("type")
        .ok_or_else(|| Error::malformed(owner, format!("{} without a type node", element.name)))?;
    let raw_name = element
        .child_text("name")
        .ok_or_else(|| Error::malformed(owner, format!("{} without a name node", element.name)))?;

    let qualifiers = pointer_qualifiers(element);
    let stars = qualifiers.matches('*').count();
    let is_pointer = stars > 0;

    let inner = element.inner_text();
    let fixed_length = if inner.contains('[') {
        Some(fixed_length(element, &inner, owner, &raw_name, constants)?)
    } else {
        None
    };

    let optional = element
        .attr("optional")
        .and_then(|o| o.split(',').next())
        .is_some_and(|o| o.trim() == "true");

    Ok(Declarator {
        raw_type: raw_type.trim().to_string(),
        raw_name: raw_name.trim().to_string(),
        is_pointer,
        is_const: is_pointer && leading_text(element).contains("const"),
        is_double_pointer: stars >= 2,
        fixed_length,
        len: element.attr("len").map(str::to_string),
        optional,
    })
}

/// Text runs between the `type` child and the `name` child
fn pointer_qualifiers(element: &Element) -> String {
    use crate::document::Node;

    let mut seen_type = false;
    let mut out = String::new();
    for node in &element.children {
        match node {
            Node::Element(e) if e.name == "type" => seen_type = true,
            Node::Element(e) if e.name == "name" => break,
            Node::Text(t) if seen_type => out.push_str(t),
            _ => {}
        }
    }
    out
}

/// Direct text runs before the `name` child
fn leading_text(element: &Element) -> String {
    use crate::document::Node;

    let mut out = String::new();
    for node in &element.children {
        match node {
            Node::Element(e) if e.name == "name" => break,
            Node::Text(t) => out.push_str(t),
            _ => {}
        }
    }
    out
}

fn fixed_length(
    element: &Element,
    inner: &str,
    owner: &str,
    member: &str,
    constants: &BTreeMap<String, i64>,
) -> Result<ArrayLength> {
    if let Some(constant) = element.child_text("enum") {
        let constant = constant.trim();
        let value = constants
            .get(constant)
            .copied()
            .filter(|v| *v >= 0)
            .ok_or_else(|| Error::unknown("API constant", constant, owner))?;
        return Ok(ArrayLength::Constant {
            name: constant.to_string(),
            value: value as u64,
        });
    }

    let mut dimensions = ARRAY_DIMENSION
        .captures_iter(inner)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .peekable();
    if dimensions.peek().is_none() {
        return Err(Error::malformed(
            owner,
            format!("array length of {} is not a literal or constant", member),
        ));
    }
    Ok(ArrayLength::Literal(dimensions.product()))
}

/// Every length-linked member must name a sibling, directly or as the head
/// of a `->`/`::` path
fn check_length_members(members: &[MemberEntity], owner: &str) -> Result<()> {
    for member in members {
        let Arity::LengthLinkedArray { length_member } = &member.arity else {
            continue;
        };
        let head = length_member
            .split("->")
            .next()
            .and_then(|h| h.split("::").next())
            .unwrap_or_default()
            .trim();
        if !members.iter().any(|m| m.raw_name == head) {
            return Err(Error::unknown("length member", head, owner));
        }
    }
    Ok(())
}

impl<'a> RegistryBuilder<'a> {
    /// Register structs, unions and their aliases
    pub(crate) fn register_composites(&mut self) -> Result<()> {
        let doc = self.doc;
        let names = self.names;

        let mut declared: Vec<(TypeId, &Element)> = Vec::new();
        let mut aliases = Vec::new();

        for ty in doc.types() {
            let kind = match ty.attr("category") {
                Some("struct") => CompositeKind::Struct,
                Some("union") => CompositeKind::Union,
                _ => continue,
            };
            let raw = declared_name(ty)
                .ok_or_else(|| Error::malformed("composite", "declaration without a name"))?;
            if let Some(target) = ty.attr("alias") {
                aliases.push((raw, target.to_string()));
                continue;
            }

            if !names.has_type_prefix(&raw) {
                tracing::warn!("composite {} has no type prefix, name kept as is", raw);
            }

            let mut shell = Composite::new(kind);
            shell.returned_only = ty.attr("returnedonly") == Some("true");
            let id = self
                .registry
                .register(&raw, &names.type_name(&raw), EntityKind::Composite(shell));
            declared.push((id, ty));
        }

        let alias_raws: Vec<String> = aliases.iter().map(|(raw, _)| raw.clone()).collect();
        for (raw, target) in aliases {
            let target = match self.registry.canonical_of_raw(&target) {
                Some(name) => name.to_string(),
                None if alias_raws.contains(&target) => names.type_name(&target),
                None => return Err(Error::unknown("composite", target.as_str(), raw.as_str())),
            };
            self.registry
                .register(&raw, &names.type_name(&raw), EntityKind::Alias { target });
        }

        for (id, ty) in declared {
            self.learn_members(id, ty)?;
        }
        Ok(())
    }

    fn learn_members(&mut self, id: TypeId, ty: &Element) -> Result<()> {
        let owner = self.registry.get(id).name.clone();
        let mut members = Vec::new();
        let mut structure_type = None;

        for member in ty.elements("member") {
            let decl = parse_declarator(member, &owner, &self.registry.constants)?;
            let declared_type = self.type_reference(&decl.raw_type, &owner)?;

            let arity = match (&decl.fixed_length, decl.length_reference()) {
                (Some(length), _) => Arity::FixedArray {
                    length: length.clone(),
                },
                (None, Some(length_member)) if decl.is_pointer => Arity::LengthLinkedArray {
                    length_member: length_member.to_string(),
                },
                _ => Arity::Scalar,
            };

            let values = member.attr("values").map(str::to_string);
            if decl.raw_name == "sType" && structure_type.is_none() {
                structure_type = values.clone();
            }

            members.push(MemberEntity {
                name: self.names.member_name(&decl.raw_name, decl.is_pointer),
                raw_name: decl.raw_name,
                declared_type,
                raw_type: decl.raw_type,
                is_pointer: decl.is_pointer,
                is_const_pointer: decl.is_const,
                is_double_pointer: decl.is_double_pointer,
                optional: decl.optional,
                arity,
                counter: None,
                values,
            });
        }

        check_length_members(&members, &owner)?;
        self.apply_field_counters(&mut members);

        let extends = match ty
            .attr("structextends")
            .and_then(|s| s.split(',').next())
            .map(str::trim)
        {
            Some(base) if !base.is_empty() => Some(
                self.registry
                    .canonical_of_raw(base)
                    .ok_or_else(|| Error::unknown("structure", base, owner.as_str()))?
                    .to_string(),
            ),
            _ => None,
        };

        if let EntityKind::Composite(composite) = &mut self.registry.get_mut(id).kind {
            composite.members = members;
            composite.extends = extends;
            composite.structure_type = structure_type;
        }
        Ok(())
    }

    /// Give table-listed members a runtime counter sibling
    fn apply_field_counters(&self, members: &mut [MemberEntity]) {
        let counters = &self.options.field_counters;
        let raw_of: BTreeMap<String, String> = members
            .iter()
            .map(|m| (m.name.clone(), m.raw_name.clone()))
            .collect();

        for member in members.iter_mut() {
            let Some(counter) = counters.get(&member.name).and_then(|c| raw_of.get(c)) else {
                continue;
            };
            match member.arity {
                Arity::Scalar if member.is_pointer => {
                    member.arity = Arity::LengthLinkedArray {
                        length_member: counter.clone(),
                    }
                }
                Arity::FixedArray { .. } => member.counter = Some(counter.clone()),
                _ => {}
            }
        }
    }
}
