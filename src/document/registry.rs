//! Typed readers over the `registry` root element

use super::element::Element;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Name of the enums block holding API constants
pub const API_CONSTANTS: &str = "API Constants";

/// The parsed IDL document, rooted at a `registry` element
#[derive(Debug, Clone)]
pub struct RegistryDocument {
    root: Element,
}

/// A feature or extension block
#[derive(Debug, Clone, Copy)]
pub struct Extension<'a> {
    /// Underlying element
    pub element: &'a Element,
}

impl<'a> Extension<'a> {
    /// Extension name (e.g. `VK_KHR_surface`)
    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    /// Extension number used for enum offsets
    pub fn number(&self) -> Option<i64> {
        self.element.attr("number").and_then(|n| n.trim().parse().ok())
    }

    /// Raw `number` attribute, for diagnostics
    pub fn number_text(&self) -> Option<&'a str> {
        self.element.attr("number")
    }

    /// Platform the extension is tied to, if any
    pub fn platform(&self) -> Option<&'a str> {
        self.element.attr("platform")
    }

    /// Whether the document marks this block as disabled, or the name is
    /// in the extra disabled list
    pub fn is_disabled(&self, extra_disabled: &[String]) -> bool {
        self.element.attr("supported") == Some("disabled")
            || extra_disabled.iter().any(|n| n == self.name())
    }

    /// All `require` children, in order
    pub fn requires(&self) -> impl Iterator<Item = &'a Element> {
        self.element.elements("require")
    }

    /// Names of required entries of the given kind (`type`, `command`, `enum`)
    pub fn required_names(&self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.requires()
            .flat_map(move |r| r.elements(kind))
            .filter_map(|e| e.attr("name"))
    }
}

impl RegistryDocument {
    /// Wrap a parsed tree, rejecting anything not rooted at `registry`
    pub fn new(root: Element) -> Result<Self> {
        if root.name != "registry" {
            return Err(Error::malformed(
                "document root",
                format!("top element is '{}', expected 'registry'", root.name),
            ));
        }
        Ok(Self { root })
    }

    /// Deserialize the tree from JSON and wrap it
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Element = serde_json::from_str(json)
            .map_err(|e| Error::malformed("document", format!("invalid JSON tree: {}", e)))?;
        Self::new(root)
    }

    /// Root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All `types/type` declarations, in document order
    pub fn types(&self) -> impl Iterator<Item = &Element> {
        self.root.elements("types").flat_map(|t| t.elements("type"))
    }

    /// `types/type` declarations of one category
    pub fn types_of<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.types()
            .filter(move |t| t.attr("category") == Some(category))
    }

    /// All `enums` blocks
    pub fn enum_blocks(&self) -> impl Iterator<Item = &Element> {
        self.root.elements("enums")
    }

    /// The `enums` block with the given name
    pub fn enum_block(&self, name: &str) -> Option<&Element> {
        self.enum_blocks().find(|e| e.attr("name") == Some(name))
    }

    /// All `commands/command` declarations
    pub fn commands(&self) -> impl Iterator<Item = &Element> {
        self.root.elements("commands").flat_map(|c| c.elements("command"))
    }

    /// Raw name of every command, aliases included
    pub fn command_names(&self) -> impl Iterator<Item = String> + '_ {
        self.commands().filter_map(|c| {
            c.attr("name")
                .map(str::to_string)
                .or_else(|| c.element("proto")?.child_text("name"))
        })
    }

    /// `alias` target of every aliased command, by raw name
    pub fn command_aliases(&self) -> BTreeMap<String, String> {
        self.commands()
            .filter_map(|c| Some((c.attr("name")?.to_string(), c.attr("alias")?.to_string())))
            .collect()
    }

    /// All `feature` blocks (the core API versions)
    pub fn features(&self) -> impl Iterator<Item = Extension<'_>> {
        self.root
            .elements("feature")
            .map(|element| Extension { element })
    }

    /// All `extensions/extension` blocks, disabled ones included
    pub fn extensions(&self) -> impl Iterator<Item = Extension<'_>> {
        self.root
            .elements("extensions")
            .flat_map(|e| e.elements("extension"))
            .map(|element| Extension { element })
    }

    /// Look up one extension by name
    pub fn extension(&self, name: &str) -> Option<Extension<'_>> {
        self.extensions().find(|e| e.name() == name)
    }

    /// All `tags/tag` entries
    pub fn tags(&self) -> impl Iterator<Item = &Element> {
        self.root.elements("tags").flat_map(|t| t.elements("tag"))
    }

    /// All `platforms/platform` entries
    pub fn platforms(&self) -> impl Iterator<Item = &Element> {
        self.root
            .elements("platforms")
            .flat_map(|p| p.elements("platform"))
    }

    /// Value of an API constant, if declared
    pub fn api_constant(&self, name: &str) -> Option<&str> {
        self.enum_block(API_CONSTANTS)?
            .elements("enum")
            .find(|e| e.attr("name") == Some(name))
            .and_then(|e| e.attr("value"))
    }
}
