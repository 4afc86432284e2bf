//! Whole-pipeline runs over the synthetic sample document

mod common;

use bindspec::{
    CompilationContext, Error, ErrorSeverity, GeneratorOptions, RegistryDocument, ShapeKind,
};
use common::*;
use serde_json::json;
use std::collections::BTreeMap;

fn matched_tables(options: GeneratorOptions) -> GeneratorOptions {
    let mut options = options;
    options.strict_tables = true;
    options.denied_types = vec!["XlibSurfaceCreateInfoKhr".to_string()];
    options.member_rewrites = BTreeMap::from([
        ("SampleCountFlags".to_string(), "Count".to_string()),
        ("QueryResultFlags".to_string(), "Result".to_string()),
    ]);
    options.field_counters = BTreeMap::from([
        ("Code".to_string(), "CodeSize".to_string()),
        ("MemoryTypes".to_string(), "MemoryTypeCount".to_string()),
    ]);
    options.disabled_commands = vec![
        "vkCreateWin32SurfaceKHR".to_string(),
        "vkCreateXlibSurfaceKHR".to_string(),
    ];
    options.handwritten_commands = vec!["vkCreateInstance".to_string()];
    options.ignored_simplified_commands = vec!["GetQueryPoolResults".to_string()];
    options.disabled_extensions = Vec::new();
    options
}

#[test]
fn test_status_code_round_trip() {
    let model = compile_sample();
    let command = model.command("vkGetSemaphoreCounterValue").unwrap();
    let result = model.type_named("Result").unwrap().as_enumeration().unwrap();

    assert!(command.check_status(0, result).is_ok());

    let err = command.check_status(1, result).unwrap_err();
    assert_eq!(
        err,
        Error::NativeStatus {
            command: "vkGetSemaphoreCounterValue".to_string(),
            code: 1,
            status: Some("NotReady".to_string()),
        }
    );
    assert_eq!(err.classify(), ErrorSeverity::Recoverable);
    assert_eq!(err.native_status(), Some(1));

    let unknown = command.check_status(42, result).unwrap_err();
    assert_eq!(unknown.to_string(), "vkGetSemaphoreCounterValue failed with status 42");
}

#[test]
fn test_value_returning_command_never_fails() {
    let model = compile_sample();
    let result = model.type_named("Result").unwrap().as_enumeration().unwrap();

    let props = model.command("vkGetPhysicalDeviceProperties").unwrap();
    assert!(props.check_status(-1, result).is_ok());
}

#[test]
fn test_strict_tables_reject_stale_entries() {
    let mut options = sample_options();
    options.strict_tables = true;

    let err = CompilationContext::new(options)
        .compile(&sample_document())
        .unwrap_err();
    assert!(matches!(err, Error::StaleTable { .. }));
    assert_eq!(err.classify(), ErrorSeverity::Fatal);
}

#[test]
fn test_strict_tables_accept_matching_entries() {
    let options = matched_tables(sample_options());
    let model = CompilationContext::new(options)
        .compile(&sample_document())
        .unwrap();

    let query = model.command("vkGetQueryPoolResults").unwrap();
    assert!(query.shape(ShapeKind::Simplified).is_none());
}

#[test]
fn test_stale_entries_only_warn_by_default() {
    let options = sample_options().with_target("Android", &[]);
    assert!(!options.strict_tables);
    assert!(CompilationContext::new(options)
        .compile(&sample_document())
        .is_ok());
}

#[test]
fn test_name_map_round_trip() {
    let model = compile_sample();
    let map = &model.name_map;

    assert_eq!(map.canonical("VkResult"), Some("Result"));
    assert_eq!(map.canonical("VK_NOT_READY"), Some("Result.NotReady"));
    assert_eq!(map.canonical("VkExtent2D"), Some("Extent2D"));
    assert_eq!(map.raw("Extent2D"), Some("VkExtent2D"));
    assert_eq!(map.raw("Result.ErrorSurfaceLostKhr"), Some("VK_ERROR_SURFACE_LOST_KHR"));
    assert_eq!(map.canonical("SECURITY_ATTRIBUTES"), None);
}

#[test]
fn test_vendor_tags_in_document_order() {
    let model = compile_sample();
    let tags: Vec<&str> = model.vendor_tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["KHR", "EXT", "NV"]);
    assert_eq!(model.vendor_tags[0].canonical, "Khr");
}

#[test]
fn test_model_serializes_to_json() {
    let model = compile_sample();
    let text = model.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert!(value["commands"].as_array().unwrap().len() >= 9);
    assert_eq!(value["handwritten_commands"], json!(["vkCreateInstance"]));
    assert_eq!(
        value["command_aliases"]["vkGetSemaphoreCounterValueKHR"],
        json!("vkGetSemaphoreCounterValue")
    );
    assert_eq!(value["name_map"]["composites"]["VkRect2D"], json!("Rect2D"));

    let wait = value["commands"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["command"]["name"] == json!("vkWaitForFences"))
        .unwrap();
    assert_eq!(wait["strategy"]["strategy"], json!("passthrough"));
    assert_eq!(wait["shapes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_compile_from_json_document() {
    let doc = RegistryDocument::from_json(
        r#"{
            "name": "registry",
            "children": [
                { "name": "tags", "children": [
                    { "name": "tag", "attributes": { "name": "KHR" } }
                ] },
                { "name": "types", "children": [
                    { "name": "type", "attributes": { "category": "struct", "name": "VkExtent2D" } }
                ] }
            ]
        }"#,
    )
    .unwrap();

    let model = CompilationContext::new(GeneratorOptions::default().without_targets())
        .compile(&doc)
        .unwrap();
    assert!(model.type_named("Extent2D").is_some());
    assert_eq!(model.vendor_tags.len(), 1);
}

#[test]
fn test_options_from_json_override() {
    let options = GeneratorOptions::from_json(
        r#"{ "targets": { "Windows": ["VK_KHR_win32_surface"] }, "handwritten_commands": [] }"#,
    )
    .unwrap();
    let model = CompilationContext::new(options)
        .compile(&sample_document())
        .unwrap();

    assert!(model.command("vkCreateInstance").is_some());
    assert!(model.handwritten_commands.is_empty());
    assert_eq!(model.scopes.len(), 1);
}

#[test]
fn test_non_registry_root_is_malformed() {
    let err = RegistryDocument::new(bindspec::Element::new("not-a-registry")).unwrap_err();
    assert!(matches!(err, Error::MalformedInput { .. }));
}
