//! # Identifier Translator
//!
//! Maps raw IDL identifiers to the canonical display names used everywhere
//! else in the model. Translation is pure: the same raw name always yields
//! the same canonical name for a given translator.
//!
//! ```text
//! VK_FORMAT_R8_UNORM          → FormatR8Unorm     (translate)
//! VK_FORMAT_R8_UNORM @ Format → R8Unorm           (enum member)
//! VkSwapchainCreateInfoKHR    → SwapchainCreateInfoKhr
//! VkSampleCountFlagBits       → SampleCountFlags
//! ```
//!
//! Vendor tags (`KHR`, `EXT`, ...) come from the document's `tags` section
//! and must be learned before any enum member is translated, since member
//! suffix stripping walks them in document order.

pub mod case;

use crate::config::GeneratorOptions;
use crate::{Error, Result};
use case::{case_segment, strip_prefix_ignore_case};
use serde::Serialize;
use std::collections::BTreeMap;

/// A vendor tag and its recased form (`KHR` → `Khr`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorTag {
    /// Tag as written in the document
    pub name: String,
    /// Recased tag used in canonical names
    pub canonical: String,
}

impl VendorTag {
    /// Build a tag, recasing it as first letter plus lowercase rest
    pub fn new(name: &str) -> Self {
        let mut chars = name.chars();
        let canonical = match chars.next() {
            Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
            None => String::new(),
        };
        Self {
            name: name.to_string(),
            canonical,
        }
    }
}

/// Identifier translator configured from [`GeneratorOptions`]
#[derive(Debug, Clone)]
pub struct NameTranslator {
    global_prefix: String,
    type_prefix: String,
    command_prefix: String,
    acronyms: BTreeMap<String, String>,
    member_rewrites: BTreeMap<String, String>,
    vendor_tags: Vec<VendorTag>,
}

impl NameTranslator {
    /// Create a translator with no vendor tags learned yet
    pub fn new(options: &GeneratorOptions) -> Self {
        Self {
            global_prefix: options.global_prefix.clone(),
            type_prefix: options.type_prefix.clone(),
            command_prefix: options.command_prefix.clone(),
            acronyms: options.acronyms.clone(),
            member_rewrites: options.member_rewrites.clone(),
            vendor_tags: Vec::new(),
        }
    }

    /// Learn a vendor tag; tags keep document order and are not duplicated
    pub fn learn_vendor_tag(&mut self, name: &str) {
        if name.is_empty() || self.vendor_tags.iter().any(|t| t.name == name) {
            return;
        }
        self.vendor_tags.push(VendorTag::new(name));
    }

    /// Vendor tags in the order they were learned
    pub fn vendor_tags(&self) -> &[VendorTag] {
        &self.vendor_tags
    }

    /// Translate a `SCREAMING_CASE` or camelCase identifier to PascalCase
    pub fn translate(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for (i, segment) in raw.split('_').enumerate() {
            if segment.is_empty() {
                continue;
            }
            if i == 0 && segment.eq_ignore_ascii_case(&self.global_prefix) {
                continue;
            }
            out.push_str(&case_segment(segment, &self.acronyms));
        }
        out
    }

    /// Translate an enumeration member relative to its owning enumeration
    ///
    /// The owner's canonical name is stripped as a prefix, the owner's vendor
    /// tag (or `Bit` + tag for bitmasks) as a suffix. A member from a
    /// different vendor than its owner keeps its own tag.
    pub fn translate_enum_member(&self, raw: &str, owner: &str) -> Result<String> {
        let mut name = self.translate(raw);
        let mut prefix = owner.to_string();
        let mut suffix: Option<String> = None;
        let mut extension: Option<&str> = None;

        for tag in &self.vendor_tags {
            if let Some(stripped) = prefix.strip_suffix(tag.canonical.as_str()) {
                prefix = stripped.to_string();
                suffix = Some(tag.canonical.clone());
            } else if name.ends_with(tag.canonical.as_str()) {
                extension = Some(tag.canonical.as_str());
            }
        }

        if let Some(stripped) = prefix.strip_suffix("Flags") {
            prefix = stripped.to_string();
            suffix = Some(format!("Bit{}", suffix.unwrap_or_default()));
        }

        if let Some(rest) = strip_prefix_ignore_case(&name, &prefix) {
            name = rest.to_string();
        }

        if !name.starts_with(|c: char| c.is_alphabetic()) {
            match self.member_rewrites.get(owner) {
                Some(rewrite) => name = format!("{}{}", rewrite, name),
                None => {
                    return Err(Error::unrecognized(
                        format!("enum member '{}' (stripped to '{}')", raw, name),
                        owner,
                    ))
                }
            }
        }

        if let Some(suffix) = suffix {
            if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
                if !stripped.is_empty() {
                    name = stripped.to_string();
                }
            } else if let Some(ext) = extension {
                let tail = format!("{}{}", suffix, ext);
                if let Some(stripped) = name.strip_suffix(tail.as_str()) {
                    name = format!("{}{}", stripped, ext);
                }
            }
        }

        Ok(name)
    }

    /// Canonical name of a declared type: type prefix stripped, trailing
    /// vendor tag recased
    pub fn type_name(&self, raw: &str) -> String {
        let mut name = strip_prefix_ignore_case(raw, &self.type_prefix)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(raw)
            .to_string();

        for tag in &self.vendor_tags {
            if let Some(stripped) = name.strip_suffix(tag.name.as_str()) {
                name = format!("{}{}", stripped, tag.canonical);
            }
        }
        name
    }

    /// Whether the raw type name carries the type prefix
    pub fn has_type_prefix(&self, raw: &str) -> bool {
        strip_prefix_ignore_case(raw, &self.type_prefix).is_some_and(|rest| !rest.is_empty())
    }

    /// Fold a `FlagBits` canonical name onto its `Flags` typedef
    /// (`SurfaceTransformFlagBitsKhr` → `SurfaceTransformFlagsKhr`)
    pub fn flag_bits_name(&self, canonical: &str) -> String {
        let mut base = canonical;
        let mut tag = "";
        for vendor in &self.vendor_tags {
            if let Some(stripped) = canonical.strip_suffix(vendor.canonical.as_str()) {
                base = stripped;
                tag = vendor.canonical.as_str();
                break;
            }
        }
        match base.strip_suffix("FlagBits") {
            Some(stem) => format!("{}Flags{}", stem, tag),
            None => canonical.to_string(),
        }
    }

    /// Public name of a free command (`vkCreateDevice` → `CreateDevice`)
    pub fn command_name(&self, raw: &str) -> String {
        raw.strip_prefix(self.command_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(raw)
            .to_string()
    }

    /// Public name of a command bound to a handle
    ///
    /// The handle's name is dropped as a suffix (`DestroyDevice` →
    /// `Destroy`), as a `Get` infix (`GetDeviceQueue` → `GetQueue`) or as a
    /// prefix. A strip that would leave nothing keeps the free name.
    pub fn method_name(&self, raw: &str, handle: &str) -> String {
        let name = self.command_name(raw);

        let stripped = if let Some(rest) = name.strip_suffix(handle) {
            rest.to_string()
        } else if let Some(rest) = name.strip_prefix(&format!("Get{}", handle)) {
            format!("Get{}", rest)
        } else if let Some(rest) = name.strip_prefix(handle) {
            rest.to_string()
        } else {
            name.clone()
        };

        if stripped.is_empty() || stripped == "Get" {
            name
        } else {
            stripped
        }
    }

    /// Display name of a composite member; pointers lose up to two leading
    /// `p` markers (`ppEnabledLayerNames` → `EnabledLayerNames`)
    pub fn member_name(&self, raw: &str, is_pointer: bool) -> String {
        let mut name = raw;
        if is_pointer {
            for _ in 0..2 {
                match name.strip_prefix('p') {
                    Some(rest) if rest.starts_with(|c: char| c.is_uppercase() || c == 'p') => {
                        name = rest
                    }
                    _ => break,
                }
            }
        }
        self.translate(name)
    }

    /// Display name of a command parameter; pointers lose one leading `p`
    pub fn parameter_name(&self, raw: &str, is_pointer: bool) -> String {
        if is_pointer {
            if let Some(rest) = raw.strip_prefix('p') {
                if rest.starts_with(|c: char| c.is_uppercase() || c == 'p') {
                    return rest.to_string();
                }
            }
        }
        raw.to_string()
    }
}
