//! Synthetic registry fixture shared by the integration tests

#![allow(dead_code)]

use bindspec::{
    BindingModel, CompilationContext, Element, GeneratorOptions, Node, RegistryDocument,
};

// ---------------------------------------------------------------------------
// Element builders
// ---------------------------------------------------------------------------

pub fn platform_type(name: &str, requires: &str) -> Element {
    Element::new("type")
        .with_attr("requires", requires)
        .with_attr("name", name)
}

pub fn enum_type(name: &str) -> Element {
    Element::new("type")
        .with_attr("category", "enum")
        .with_attr("name", name)
}

pub fn basetype(name: &str, target: &str) -> Element {
    Element::new("type")
        .with_attr("category", "basetype")
        .with_text("typedef ")
        .with_text_child("type", target)
        .with_text(" ")
        .with_text_child("name", name)
        .with_text(";")
}

pub fn bitmask(name: &str, bits: Option<&str>) -> Element {
    let e = Element::new("type").with_attr("category", "bitmask");
    let e = match bits {
        Some(bits) => e.with_attr("requires", bits),
        None => e,
    };
    e.with_text("typedef ")
        .with_text_child("type", "VkFlags")
        .with_text(" ")
        .with_text_child("name", name)
        .with_text(";")
}

pub fn funcpointer(name: &str) -> Element {
    Element::new("type")
        .with_attr("category", "funcpointer")
        .with_text("typedef void (VKAPI_PTR *")
        .with_text_child("name", name)
        .with_text(")(void);")
}

pub fn handle(name: &str, macro_name: &str, parent: Option<&str>) -> Element {
    let e = Element::new("type").with_attr("category", "handle");
    let e = match parent {
        Some(p) => e.with_attr("parent", p),
        None => e,
    };
    e.with_text_child("type", macro_name)
        .with_text("(")
        .with_text_child("name", name)
        .with_text(")")
}

pub fn alias(category: &str, name: &str, target: &str) -> Element {
    Element::new("type")
        .with_attr("category", category)
        .with_attr("name", name)
        .with_attr("alias", target)
}

/// `<tag><type>ty</type> <name>name</name></tag>`
pub fn value(tag: &str, ty: &str, name: &str) -> Element {
    Element::new(tag)
        .with_text_child("type", ty)
        .with_text(" ")
        .with_text_child("name", name)
}

/// `ty* name`
pub fn pointer(tag: &str, ty: &str, name: &str) -> Element {
    Element::new(tag)
        .with_text_child("type", ty)
        .with_text("* ")
        .with_text_child("name", name)
}

/// `const ty* name`
pub fn const_pointer(tag: &str, ty: &str, name: &str) -> Element {
    Element::new(tag)
        .with_text("const ")
        .with_text_child("type", ty)
        .with_text("* ")
        .with_text_child("name", name)
}

/// `ty name[len]`
pub fn array(tag: &str, ty: &str, name: &str, len: &str) -> Element {
    value(tag, ty, name).with_text(format!("[{}]", len))
}

/// `ty name[CONSTANT]`
pub fn constant_array(tag: &str, ty: &str, name: &str, constant: &str) -> Element {
    value(tag, ty, name)
        .with_text("[")
        .with_text_child("enum", constant)
        .with_text("]")
}

pub fn s_type(values: &str) -> Element {
    value("member", "VkStructureType", "sType").with_attr("values", values)
}

pub fn p_next() -> Element {
    const_pointer("member", "void", "pNext").with_attr("optional", "true")
}

pub fn composite(category: &str, name: &str, members: Vec<Element>) -> Element {
    members.into_iter().fold(
        Element::new("type")
            .with_attr("category", category)
            .with_attr("name", name),
        Element::with_child,
    )
}

pub fn structure(name: &str, members: Vec<Element>) -> Element {
    composite("struct", name, members)
}

pub fn enum_block(name: &str, kind: Option<&str>, entries: Vec<Element>) -> Element {
    let block = Element::new("enums").with_attr("name", name);
    let block = match kind {
        Some(k) => block.with_attr("type", k),
        None => block,
    };
    entries.into_iter().fold(block, Element::with_child)
}

pub fn enum_value(name: &str, value: &str) -> Element {
    Element::new("enum")
        .with_attr("name", name)
        .with_attr("value", value)
}

pub fn enum_bit(name: &str, bitpos: u32) -> Element {
    Element::new("enum")
        .with_attr("name", name)
        .with_attr("bitpos", bitpos.to_string())
}

pub fn enum_offset(extends: &str, name: &str, offset: u32, negative: bool) -> Element {
    let e = Element::new("enum")
        .with_attr("extends", extends)
        .with_attr("name", name)
        .with_attr("offset", offset.to_string());
    if negative {
        e.with_attr("dir", "-")
    } else {
        e
    }
}

pub fn command(ret: &str, name: &str, params: Vec<Element>) -> Element {
    params.into_iter().fold(
        Element::new("command").with_child(
            Element::new("proto")
                .with_text_child("type", ret)
                .with_text(" ")
                .with_text_child("name", name),
        ),
        Element::with_child,
    )
}

pub fn command_alias(name: &str, target: &str) -> Element {
    Element::new("command")
        .with_attr("name", name)
        .with_attr("alias", target)
}

pub fn require(types: &[&str], commands: &[&str], enums: Vec<Element>) -> Element {
    let mut r = Element::new("require");
    for t in types {
        r = r.with_child(Element::new("type").with_attr("name", *t));
    }
    for c in commands {
        r = r.with_child(Element::new("command").with_attr("name", *c));
    }
    enums.into_iter().fold(r, Element::with_child)
}

pub fn extension(
    name: &str,
    number: u32,
    platform: Option<&str>,
    supported: &str,
    requires: Vec<Element>,
) -> Element {
    let e = Element::new("extension")
        .with_attr("name", name)
        .with_attr("number", number.to_string())
        .with_attr("supported", supported);
    let e = match platform {
        Some(p) => e.with_attr("platform", p),
        None => e,
    };
    requires.into_iter().fold(e, Element::with_child)
}

pub fn feature(name: &str, number: &str, requires: Vec<Element>) -> Element {
    requires.into_iter().fold(
        Element::new("feature")
            .with_attr("api", "vulkan")
            .with_attr("name", name)
            .with_attr("number", number),
        Element::with_child,
    )
}

fn section(name: &str, children: Vec<Element>) -> Element {
    children.into_iter().fold(Element::new(name), Element::with_child)
}

fn tag(name: &str) -> Element {
    Element::new("tag").with_attr("name", name)
}

fn platform(name: &str, protect: &str) -> Element {
    Element::new("platform")
        .with_attr("name", name)
        .with_attr("protect", protect)
}

// ---------------------------------------------------------------------------
// Sample registry
// ---------------------------------------------------------------------------

fn sample_types() -> Element {
    section(
        "types",
        vec![
            platform_type("void", "vk_platform"),
            platform_type("char", "vk_platform"),
            platform_type("float", "vk_platform"),
            platform_type("uint32_t", "vk_platform"),
            platform_type("uint64_t", "vk_platform"),
            platform_type("int32_t", "vk_platform"),
            platform_type("size_t", "vk_platform"),
            platform_type("HWND", "windows.h"),
            platform_type("Display", "X11/Xlib.h"),
            basetype("VkFlags", "uint32_t"),
            basetype("VkBool32", "uint32_t"),
            basetype("VkDeviceSize", "uint64_t"),
            bitmask("VkCullModeFlags", Some("VkCullModeFlagBits")),
            bitmask("VkSampleCountFlags", Some("VkSampleCountFlagBits")),
            bitmask("VkQueryResultFlags", None),
            handle("VkInstance", "VK_DEFINE_HANDLE", None),
            handle("VkPhysicalDevice", "VK_DEFINE_HANDLE", Some("VkInstance")),
            handle("VkDevice", "VK_DEFINE_HANDLE", Some("VkPhysicalDevice")),
            handle("VkFence", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkDevice")),
            handle("VkSemaphore", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkDevice")),
            handle("VkBuffer", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkDevice")),
            handle("VkQueryPool", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkDevice")),
            handle("VkDescriptorSet", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkDevice")),
            handle("VkSurfaceKHR", "VK_DEFINE_NON_DISPATCHABLE_HANDLE", Some("VkInstance")),
            alias("handle", "VkSemaphoreKHR", "VkSemaphore"),
            enum_type("VkResult"),
            enum_type("VkStructureType"),
            enum_type("VkFormat"),
            enum_type("VkCullModeFlagBits"),
            enum_type("VkSampleCountFlagBits"),
            enum_type("VkPresentModeKHR"),
            enum_type("VkColorSpaceKHR"),
            funcpointer("PFN_vkVoidFunction"),
            structure(
                "VkExtent2D",
                vec![value("member", "uint32_t", "width"), value("member", "uint32_t", "height")],
            ),
            structure(
                "VkOffset2D",
                vec![value("member", "int32_t", "x"), value("member", "int32_t", "y")],
            ),
            structure(
                "VkRect2D",
                vec![value("member", "VkOffset2D", "offset"), value("member", "VkExtent2D", "extent")],
            ),
            composite(
                "union",
                "VkClearColorValue",
                vec![
                    array("member", "float", "float32", "4"),
                    array("member", "int32_t", "int32", "4"),
                ],
            ),
            structure(
                "VkPhysicalDeviceProperties",
                vec![
                    value("member", "uint32_t", "apiVersion"),
                    constant_array("member", "char", "deviceName", "VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"),
                    value("member", "VkSampleCountFlags", "framebufferColorSampleCounts"),
                ],
            ),
            structure("VkMemoryType", vec![value("member", "uint32_t", "heapIndex")]),
            structure(
                "VkPhysicalDeviceMemoryProperties",
                vec![
                    value("member", "uint32_t", "memoryTypeCount"),
                    constant_array("member", "VkMemoryType", "memoryTypes", "VK_MAX_MEMORY_TYPES"),
                ],
            ),
            structure(
                "VkBindBatch",
                vec![array("member", "VkBindInfo", "infos", "2")],
            ),
            structure("VkBindInfo", vec![value("member", "VkBufferBinding", "binding")]),
            structure(
                "VkBufferBinding",
                vec![
                    value("member", "VkBuffer", "buffer"),
                    value("member", "VkDeviceSize", "offset"),
                ],
            ),
            structure(
                "VkDeviceCreateInfo",
                vec![
                    s_type("VK_STRUCTURE_TYPE_DEVICE_CREATE_INFO"),
                    p_next(),
                    value("member", "uint32_t", "enabledLayerCount"),
                    Element::new("member")
                        .with_attr("len", "enabledLayerCount,null-terminated")
                        .with_text("const ")
                        .with_text_child("type", "char")
                        .with_text("* const* ")
                        .with_text_child("name", "ppEnabledLayerNames"),
                ],
            ),
            structure(
                "VkPhysicalDeviceFeatures2",
                vec![
                    s_type("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2"),
                    pointer("member", "void", "pNext"),
                    value("member", "VkBool32", "robustBufferAccess"),
                ],
            )
            .with_attr("structextends", "VkDeviceCreateInfo"),
            alias("struct", "VkPhysicalDeviceFeatures2KHR", "VkPhysicalDeviceFeatures2"),
            structure(
                "VkShaderModuleCreateInfo",
                vec![
                    s_type("VK_STRUCTURE_TYPE_SHADER_MODULE_CREATE_INFO"),
                    p_next(),
                    value("member", "size_t", "codeSize"),
                    const_pointer("member", "uint32_t", "pCode")
                        .with_attr("len", "latexmath:[\\textrm{codeSize} \\over 4]"),
                ],
            ),
            structure(
                "VkDescriptorSetAllocateInfo",
                vec![
                    s_type("VK_STRUCTURE_TYPE_DESCRIPTOR_SET_ALLOCATE_INFO"),
                    p_next(),
                    value("member", "uint32_t", "descriptorSetCount"),
                ],
            ),
            structure(
                "VkWin32SurfaceCreateInfoKHR",
                vec![
                    s_type("VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR"),
                    p_next(),
                    value("member", "HWND", "hwnd"),
                ],
            ),
            structure(
                "VkXlibSurfaceCreateInfoKHR",
                vec![p_next(), pointer("member", "Display", "dpy")],
            ),
            structure("VkCounterKHR", vec![value("member", "uint32_t", "unit")]),
            structure("VkCounterDescriptionKHR", vec![value("member", "uint32_t", "flags")]),
            structure("VkDisabledInfoEXT", vec![value("member", "uint32_t", "x")]),
        ],
    )
}

fn sample_enums() -> Vec<Element> {
    vec![
        enum_block(
            "API Constants",
            None,
            vec![
                enum_value("VK_MAX_PHYSICAL_DEVICE_NAME_SIZE", "256"),
                enum_value("VK_MAX_MEMORY_TYPES", "32"),
                enum_value("VK_LOD_CLAMP_NONE", "1000.0F"),
                enum_value("VK_REMAINING_MIP_LEVELS", "(~0U)"),
            ],
        ),
        enum_block(
            "VkResult",
            Some("enum"),
            vec![
                enum_value("VK_SUCCESS", "0"),
                enum_value("VK_NOT_READY", "1"),
                enum_value("VK_TIMEOUT", "2"),
                enum_value("VK_ERROR_OUT_OF_HOST_MEMORY", "-1"),
            ],
        ),
        enum_block(
            "VkStructureType",
            Some("enum"),
            vec![
                enum_value("VK_STRUCTURE_TYPE_APPLICATION_INFO", "0"),
                enum_value("VK_STRUCTURE_TYPE_DEVICE_CREATE_INFO", "3"),
                enum_value("VK_STRUCTURE_TYPE_SHADER_MODULE_CREATE_INFO", "16"),
                enum_value("VK_STRUCTURE_TYPE_DESCRIPTOR_SET_ALLOCATE_INFO", "34"),
            ],
        ),
        enum_block(
            "VkFormat",
            Some("enum"),
            vec![
                enum_value("VK_FORMAT_UNDEFINED", "0"),
                enum_value("VK_FORMAT_R8_UNORM", "9"),
            ],
        ),
        enum_block(
            "VkCullModeFlagBits",
            Some("bitmask"),
            vec![
                enum_value("VK_CULL_MODE_NONE", "0"),
                enum_bit("VK_CULL_MODE_FRONT_BIT", 0),
                enum_bit("VK_CULL_MODE_BACK_BIT", 1),
                enum_value("VK_CULL_MODE_FRONT_AND_BACK", "0x00000003"),
            ],
        ),
        enum_block(
            "VkSampleCountFlagBits",
            Some("bitmask"),
            vec![
                enum_bit("VK_SAMPLE_COUNT_1_BIT", 0),
                enum_bit("VK_SAMPLE_COUNT_4_BIT", 2),
            ],
        ),
        enum_block(
            "VkPresentModeKHR",
            Some("enum"),
            vec![
                enum_value("VK_PRESENT_MODE_IMMEDIATE_KHR", "0"),
                enum_value("VK_PRESENT_MODE_FIFO_KHR", "2"),
            ],
        ),
        enum_block(
            "VkColorSpaceKHR",
            Some("enum"),
            vec![enum_value("VK_COLOR_SPACE_SRGB_NONLINEAR_KHR", "0")],
        ),
    ]
}

fn sample_commands() -> Element {
    section(
        "commands",
        vec![
            command("VkResult", "vkCreateInstance", vec![pointer("param", "VkInstance", "pInstance")]),
            command(
                "VkResult",
                "vkEnumeratePhysicalDevices",
                vec![
                    value("param", "VkInstance", "instance"),
                    pointer("param", "uint32_t", "pPhysicalDeviceCount"),
                    pointer("param", "VkPhysicalDevice", "pPhysicalDevices")
                        .with_attr("optional", "true")
                        .with_attr("len", "pPhysicalDeviceCount"),
                ],
            ),
            command(
                "void",
                "vkGetPhysicalDeviceProperties",
                vec![
                    value("param", "VkPhysicalDevice", "physicalDevice"),
                    pointer("param", "VkPhysicalDeviceProperties", "pProperties"),
                ],
            ),
            command("void", "vkDestroyDevice", vec![value("param", "VkDevice", "device")]),
            command(
                "VkResult",
                "vkWaitForFences",
                vec![
                    value("param", "VkDevice", "device"),
                    value("param", "uint32_t", "fenceCount"),
                    const_pointer("param", "VkFence", "pFences").with_attr("len", "fenceCount"),
                    value("param", "VkBool32", "waitAll"),
                    value("param", "uint64_t", "timeout"),
                ],
            ),
            command(
                "VkResult",
                "vkGetSemaphoreCounterValue",
                vec![
                    value("param", "VkDevice", "device"),
                    value("param", "VkSemaphore", "semaphore"),
                    pointer("param", "uint64_t", "pValue"),
                ],
            ),
            command_alias("vkGetSemaphoreCounterValueKHR", "vkGetSemaphoreCounterValue"),
            command(
                "VkResult",
                "vkAllocateDescriptorSets",
                vec![
                    value("param", "VkDevice", "device"),
                    const_pointer("param", "VkDescriptorSetAllocateInfo", "pAllocateInfo"),
                    pointer("param", "VkDescriptorSet", "pDescriptorSets")
                        .with_attr("len", "pAllocateInfo->descriptorSetCount"),
                ],
            ),
            command(
                "VkResult",
                "vkGetQueryPoolResults",
                vec![
                    value("param", "VkDevice", "device"),
                    value("param", "VkQueryPool", "queryPool"),
                    value("param", "uint32_t", "firstQuery"),
                    value("param", "uint32_t", "queryCount"),
                    value("param", "size_t", "dataSize"),
                    pointer("param", "void", "pData").with_attr("len", "dataSize"),
                    value("param", "VkDeviceSize", "stride"),
                    value("param", "VkQueryResultFlags", "flags").with_attr("optional", "true"),
                ],
            ),
            command(
                "VkResult",
                "vkEnumerateCountersKHR",
                vec![
                    value("param", "VkPhysicalDevice", "physicalDevice"),
                    value("param", "uint32_t", "queueFamilyIndex"),
                    pointer("param", "uint32_t", "pCounterCount"),
                    pointer("param", "VkCounterKHR", "pCounters").with_attr("len", "pCounterCount"),
                    pointer("param", "VkCounterDescriptionKHR", "pCounterDescriptions")
                        .with_attr("len", "pCounterCount"),
                ],
            ),
            command(
                "PFN_vkVoidFunction",
                "vkGetDeviceProcAddr",
                vec![
                    value("param", "VkDevice", "device"),
                    const_pointer("param", "char", "pName").with_attr("len", "null-terminated"),
                ],
            ),
            command(
                "VkResult",
                "vkCreateWin32SurfaceKHR",
                vec![
                    value("param", "VkInstance", "instance"),
                    const_pointer("param", "VkWin32SurfaceCreateInfoKHR", "pCreateInfo"),
                    pointer("param", "VkSurfaceKHR", "pSurface"),
                ],
            ),
            command(
                "VkResult",
                "vkCreateXlibSurfaceKHR",
                vec![
                    value("param", "VkInstance", "instance"),
                    const_pointer("param", "VkXlibSurfaceCreateInfoKHR", "pCreateInfo"),
                    pointer("param", "VkSurfaceKHR", "pSurface"),
                ],
            ),
            command("void", "vkDisabledCommandEXT", vec![value("param", "VkDevice", "device")]),
        ],
    )
}

fn sample_features() -> Vec<Element> {
    vec![
        feature(
            "VK_VERSION_1_0",
            "1.0",
            vec![require(
                &[
                    "VkExtent2D",
                    "VkOffset2D",
                    "VkRect2D",
                    "VkDeviceCreateInfo",
                    "VkPhysicalDeviceProperties",
                    "VkResult",
                    "VkStructureType",
                    "VkFence",
                    "VkSemaphore",
                ],
                &[
                    "vkCreateInstance",
                    "vkEnumeratePhysicalDevices",
                    "vkGetPhysicalDeviceProperties",
                    "vkDestroyDevice",
                    "vkWaitForFences",
                    "vkAllocateDescriptorSets",
                    "vkGetQueryPoolResults",
                    "vkGetDeviceProcAddr",
                ],
                vec![],
            )],
        ),
        feature(
            "VK_VERSION_1_1",
            "1.1",
            vec![require(
                &["VkPhysicalDeviceFeatures2"],
                &["vkGetSemaphoreCounterValue"],
                vec![enum_offset(
                    "VkStructureType",
                    "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2",
                    0,
                    false,
                )
                .with_attr("extnumber", "60")],
            )],
        ),
    ]
}

fn sample_extensions() -> Element {
    section(
        "extensions",
        vec![
            extension(
                "VK_KHR_surface",
                1,
                None,
                "vulkan",
                vec![require(
                    &["VkSurfaceKHR", "VkPresentModeKHR", "VkColorSpaceKHR"],
                    &[],
                    vec![
                        enum_offset("VkResult", "VK_ERROR_SURFACE_LOST_KHR", 0, true),
                        Element::new("enum")
                            .with_attr("extends", "VkColorSpaceKHR")
                            .with_attr("name", "VK_COLORSPACE_SRGB_NONLINEAR_KHR")
                            .with_attr("alias", "VK_COLOR_SPACE_SRGB_NONLINEAR_KHR"),
                    ],
                )],
            ),
            extension(
                "VK_KHR_xlib_surface",
                5,
                Some("xlib"),
                "vulkan",
                vec![require(
                    &["VkXlibSurfaceCreateInfoKHR"],
                    &["vkCreateXlibSurfaceKHR"],
                    vec![],
                )],
            ),
            extension(
                "VK_KHR_win32_surface",
                10,
                Some("win32"),
                "vulkan",
                vec![require(
                    &["VkWin32SurfaceCreateInfoKHR"],
                    &["vkCreateWin32SurfaceKHR"],
                    vec![enum_offset(
                        "VkStructureType",
                        "VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR",
                        0,
                        false,
                    )],
                )],
            ),
            extension(
                "VK_KHR_counters",
                30,
                None,
                "vulkan",
                vec![require(
                    &["VkCounterKHR", "VkCounterDescriptionKHR"],
                    &["vkEnumerateCountersKHR"],
                    vec![],
                )],
            ),
            extension(
                "VK_EXT_disabled_thing",
                99,
                None,
                "disabled",
                vec![require(
                    &["VkDisabledInfoEXT"],
                    &["vkDisabledCommandEXT"],
                    vec![enum_offset("VkResult", "VK_ERROR_DISABLED_EXT", 0, true)],
                )],
            ),
            extension(
                "VK_KHR_semaphore_counter",
                208,
                None,
                "vulkan",
                vec![require(
                    &["VkSemaphoreKHR"],
                    &["vkGetSemaphoreCounterValueKHR"],
                    vec![],
                )],
            ),
        ],
    )
}

/// Root element of the sample registry
pub fn sample_root() -> Element {
    let mut root = Element::new("registry")
        .with_child(section(
            "platforms",
            vec![
                platform("xlib", "VK_USE_PLATFORM_XLIB_KHR"),
                platform("win32", "VK_USE_PLATFORM_WIN32_KHR"),
            ],
        ))
        .with_child(section("tags", vec![tag("KHR"), tag("EXT"), tag("NV")]))
        .with_child(sample_types());
    for block in sample_enums() {
        root = root.with_child(block);
    }
    root = root.with_child(sample_commands());
    for f in sample_features() {
        root = root.with_child(f);
    }
    root.with_child(sample_extensions())
}

/// The sample registry as a document
pub fn sample_document() -> RegistryDocument {
    RegistryDocument::new(sample_root()).expect("sample root is a registry")
}

/// Default options with two build targets over the sample extensions
pub fn sample_options() -> GeneratorOptions {
    GeneratorOptions::default()
        .without_targets()
        .with_target("Windows", &["VK_KHR_win32_surface"])
        .with_target("Linux", &["VK_KHR_xlib_surface"])
        .with_target("Counters", &["VK_KHR_semaphore_counter", "VK_KHR_counters"])
}

/// Compile the sample registry with the sample options
pub fn compile_sample() -> BindingModel {
    CompilationContext::new(sample_options())
        .compile(&sample_document())
        .expect("sample registry compiles")
}

/// Compile the sample registry with extra commands appended to `commands`
pub fn compile_with_commands(extra: Vec<Element>) -> BindingModel {
    let mut root = sample_root();
    for node in root.children.iter_mut() {
        if let Node::Element(section) = node {
            if section.name == "commands" {
                section
                    .children
                    .extend(extra.iter().cloned().map(Node::Element));
            }
        }
    }
    let doc = RegistryDocument::new(root).expect("sample root is a registry");
    CompilationContext::new(sample_options())
        .compile(&doc)
        .expect("extended sample registry compiles")
}
