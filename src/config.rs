//! # Generator Configuration
//!
//! Every special case the analysis relies on lives here as an explicit table
//! keyed by raw or canonical name. `GeneratorOptions::default()` carries the
//! tables for the Vulkan registry; a driver can override any subset from JSON:
//!
//! ```
//! use bindspec::config::GeneratorOptions;
//!
//! let options = GeneratorOptions::from_json(r#"{ "strict_tables": true }"#).unwrap();
//! assert!(options.strict_tables);
//! assert_eq!(options.global_prefix, "VK");
//! ```

use crate::document::RegistryDocument;
use crate::registry::{NativeWidth, TypeRegistry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Options and rule tables for one compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Prefix segment dropped from `SCREAMING_CASE` identifiers (`VK`)
    pub global_prefix: String,
    /// Prefix stripped from type names (`Vk`)
    pub type_prefix: String,
    /// Prefix stripped from command names (`vk`)
    pub command_prefix: String,
    /// Raw name of the status-code return type
    pub status_type: String,
    /// Canonical name of the status member meaning success
    pub success_member: String,
    /// Fixed casing for special identifier segments
    pub acronyms: BTreeMap<String, String>,
    /// Primitive widths of `*_t` basic types
    pub basic_types: BTreeMap<String, NativeWidth>,
    /// Primitive widths of built-in C types (`void`, `char`, `float`, ...)
    pub builtin_types: BTreeMap<String, NativeWidth>,
    /// Platform types whose native headers are not part of the document
    pub foreign_types: BTreeMap<String, NativeWidth>,
    /// Foreign structures known to be flat values (raw name → canonical name)
    pub foreign_structs: BTreeMap<String, String>,
    /// Prefix prepended to enum members that would otherwise start with a
    /// digit, keyed by the owning enumeration's canonical name
    pub member_rewrites: BTreeMap<String, String>,
    /// Runtime counter member for array members, keyed by member name
    pub field_counters: BTreeMap<String, String>,
    /// Composite canonical names hidden from the default build
    pub denied_types: Vec<String>,
    /// Commands hidden from the default build
    pub disabled_commands: Vec<String>,
    /// Commands wrapped by hand: visible, but never classified
    pub handwritten_commands: Vec<String>,
    /// Extensions treated as disabled in addition to the document's own flags
    pub disabled_extensions: Vec<String>,
    /// Commands (canonical) that never get a simplified call shape
    pub ignored_simplified_commands: Vec<String>,
    /// Raw types that can act as an element count
    pub count_types: Vec<String>,
    /// Raw types that look like counts but are not
    pub not_length_types: Vec<String>,
    /// Build targets and the extensions each one exposes
    pub targets: BTreeMap<String, Vec<String>>,
    /// Fail the run when a table entry matches no known entity
    pub strict_tables: bool,
}

fn table<V: Clone, T: From<V>>(entries: &[(&str, V)]) -> BTreeMap<String, T> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), T::from(v.clone())))
        .collect()
}

fn list(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        use NativeWidth::*;

        Self {
            global_prefix: "VK".to_string(),
            type_prefix: "Vk".to_string(),
            command_prefix: "vk".to_string(),
            status_type: "VkResult".to_string(),
            success_member: "Success".to_string(),
            acronyms: table(&[
                ("AMD", "Amd"),
                ("API", "Api"),
                ("EXT", "Ext"),
                ("ID", "ID"),
                ("IOS", "IOS"),
                ("KHR", "Khr"),
                ("KHX", "Khx"),
                ("LOD", "LOD"),
                ("1D", "1D"),
                ("2D", "2D"),
                ("3D", "3D"),
                ("MACOS", "MacOS"),
                ("NV", "Nv"),
                ("NVX", "Nvx"),
                ("NN", "Nn"),
                ("AABB", "AABB"),
                ("ASTC", "ASTC"),
            ]),
            basic_types: table(&[
                ("int8_t", I8),
                ("uint8_t", U8),
                ("int16_t", I16),
                ("uint16_t", U16),
                ("int32_t", I32),
                ("uint32_t", U32),
                ("int64_t", I64),
                ("uint64_t", U64),
                ("size_t", USize),
                ("xcb_connection_t", Pointer),
                ("xcb_window_t", Pointer),
                ("xcb_visualid_t", I32),
                ("zx_handle_t", Pointer),
            ]),
            builtin_types: table(&[
                ("void", Void),
                ("char", Char),
                ("float", F32),
                ("double", F64),
                ("int", I32),
            ]),
            foreign_types: table(&[
                ("ANativeWindow", Pointer),
                ("AHardwareBuffer", Pointer),
                ("HWND", Pointer),
                ("HINSTANCE", Pointer),
                ("HANDLE", Pointer),
                ("DWORD", U32),
                ("LPCWSTR", Pointer),
                ("Display", Pointer),
                ("RROutput", U32),
            ]),
            foreign_structs: table(&[("SECURITY_ATTRIBUTES", "SecurityAttributes")]),
            member_rewrites: table(&[
                ("ImageType", "Image"),
                ("ImageViewType", "View"),
                ("QueryResultFlags", "Result"),
                ("SampleCountFlags", "Count"),
                ("ImageCreateFlags", "Create"),
                ("ShadingRatePaletteEntryNv", "X"),
            ]),
            field_counters: table(&[
                ("Code", "CodeSize"),
                ("SampleMask", "RasterizationSamples"),
                ("MemoryTypes", "MemoryTypeCount"),
                ("MemoryHeaps", "MemoryHeapCount"),
                ("AcquireSyncs", "AcquireCount"),
                ("AcquireKeys", "AcquireCount"),
                ("AcquireTimeoutMilliseconds", "AcquireCount"),
                ("ReleaseSyncs", "ReleaseCount"),
                ("ReleaseKeys", "ReleaseCount"),
            ]),
            denied_types: list(&[
                "XlibSurfaceCreateInfoKhr",
                "XcbSurfaceCreateInfoKhr",
                "WaylandSurfaceCreateInfoKhr",
                "MirSurfaceCreateInfoKhr",
                "ImportMemoryWin32HandleInfoNv",
                "ExportMemoryWin32HandleInfoNv",
                "ImportMemoryWin32HandleInfoKhr",
                "ExportMemoryWin32HandleInfoKhr",
                "ImportSemaphoreWin32HandleInfoKhr",
                "ExportSemaphoreWin32HandleInfoKhr",
                "ImportFenceWin32HandleInfoKhr",
                "ExportFenceWin32HandleInfoKhr",
                "PhysicalDeviceGroupProperties",
                "PhysicalDeviceGroupPropertiesKhx",
                "NativeBufferAndroid",
            ]),
            disabled_commands: list(&[
                "vkGetPhysicalDeviceXcbPresentationSupportKHR",
                "vkCreateMirSurfaceKHR",
                "vkGetPhysicalDeviceMirPresentationSupportKHR",
                "vkCreateWaylandSurfaceKHR",
                "vkGetPhysicalDeviceWaylandPresentationSupportKHR",
                "vkCreateWin32SurfaceKHR",
                "vkGetPhysicalDeviceWin32PresentationSupportKHR",
                "vkCreateXlibSurfaceKHR",
                "vkGetPhysicalDeviceXlibPresentationSupportKHR",
                "vkCreateXcbSurfaceKHR",
                "vkCreateAndroidSurfaceKHR",
                "vkGetMemoryWin32HandleNV",
                "vkImportSemaphoreWin32HandleKHR",
                "vkImportFenceWin32HandleKHR",
                "vkCreateIOSSurfaceMVK",
                "vkEnumeratePhysicalDeviceGroups",
                "vkEnumeratePhysicalDeviceGroupsKHX",
                "vkCreateRaytracingPipelinesNVX",
                "vkGetImageDrmFormatModifierPropertiesEXT",
                "vkGetAndroidHardwareBufferPropertiesANDROID",
                "vkGetMemoryAndroidHardwareBufferANDROID",
                "vkCreateImagePipeSurfaceFUCHSIA",
            ]),
            handwritten_commands: list(&["vkCreateInstance"]),
            disabled_extensions: list(&["VK_FUCHSIA_imagepipe_surface"]),
            ignored_simplified_commands: list(&[
                "CreateGraphicsPipelines",
                "CreateComputePipelines",
                "CreateSharedSwapchainsKHR",
            ]),
            count_types: list(&["uint32_t"]),
            not_length_types: list(&["RROutput"]),
            targets: table(&[
                ("Android", list(&["VK_KHR_android_surface"])),
                (
                    "Linux",
                    list(&[
                        "VK_KHR_xlib_surface",
                        "VK_KHR_xcb_surface",
                        "VK_KHR_wayland_surface",
                        "VK_KHR_mir_surface",
                    ]),
                ),
                (
                    "Windows",
                    list(&[
                        "VK_KHR_win32_surface",
                        "VK_NV_external_memory_win32",
                        "VK_NV_win32_keyed_mutex",
                    ]),
                ),
                ("iOS", list(&["VK_MVK_ios_surface"])),
            ]),
            strict_tables: false,
        }
    }
}

impl GeneratorOptions {
    /// Load options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::malformed("generator options", e.to_string()))
    }

    /// Options with no build targets, for analysing a document in isolation
    pub fn without_targets(mut self) -> Self {
        self.targets.clear();
        self
    }

    /// Add or replace one build target. Returns self for method chaining.
    pub fn with_target(mut self, name: &str, extensions: &[&str]) -> Self {
        self.targets.insert(name.to_string(), list(extensions));
        self
    }

    /// Whether a raw type name can carry an element count
    pub fn is_count_type(&self, raw_type: &str) -> bool {
        self.count_types.iter().any(|t| t == raw_type)
            && !self.not_length_types.iter().any(|t| t == raw_type)
    }

    /// Report one table entry that matched nothing
    ///
    /// Stale entries are expected when the tables target a newer or older
    /// document revision, so they only warn unless `strict_tables` is set.
    pub fn report_stale(&self, table: &str, entry: &str) -> Result<()> {
        if self.strict_tables {
            return Err(Error::StaleTable {
                table: table.to_string(),
                entry: entry.to_string(),
            });
        }
        tracing::warn!("table {} has no match for '{}'", table, entry);
        Ok(())
    }

    /// Check every table entry against the registered entities and the
    /// document's commands and extensions
    ///
    /// Returns the number of stale entries; under `strict_tables` the first
    /// stale entry is an error.
    pub fn validate_tables(&self, registry: &TypeRegistry, doc: &RegistryDocument) -> Result<usize> {
        let commands: BTreeSet<String> = doc.command_names().collect();
        let public_commands: BTreeSet<&str> = commands
            .iter()
            .map(|c| c.strip_prefix(self.command_prefix.as_str()).unwrap_or(c.as_str()))
            .collect();
        let enumerations: BTreeSet<&str> =
            registry.enumerations().map(|(e, _)| e.name.as_str()).collect();
        let members: BTreeSet<&str> = registry
            .composites()
            .flat_map(|(_, c)| c.members.iter().map(|m| m.name.as_str()))
            .collect();

        let mut stale = Vec::new();
        for name in &self.denied_types {
            if registry.lookup(name).is_none() {
                stale.push(("denied_types", name.as_str()));
            }
        }
        for name in self.member_rewrites.keys() {
            if !enumerations.contains(name.as_str()) {
                stale.push(("member_rewrites", name.as_str()));
            }
        }
        for name in self.field_counters.keys() {
            if !members.contains(name.as_str()) {
                stale.push(("field_counters", name.as_str()));
            }
        }
        for (table, entries) in [
            ("disabled_commands", &self.disabled_commands),
            ("handwritten_commands", &self.handwritten_commands),
        ] {
            for name in entries {
                if !commands.contains(name) {
                    stale.push((table, name.as_str()));
                }
            }
        }
        for name in &self.ignored_simplified_commands {
            if !public_commands.contains(name.as_str()) {
                stale.push(("ignored_simplified_commands", name.as_str()));
            }
        }
        for name in &self.disabled_extensions {
            if doc.extension(name).is_none() {
                stale.push(("disabled_extensions", name.as_str()));
            }
        }

        for (table, entry) in &stale {
            self.report_stale(table, entry)?;
        }
        Ok(stale.len())
    }
}
