//! Parameter entities and role assignment

use crate::config::GeneratorOptions;
use crate::document::Element;
use crate::naming::NameTranslator;
use crate::registry::composite::{parse_declarator, Declarator};
use crate::registry::{ArrayLength, EntityKind, TypeRegistry};
use crate::{Error, Result};
use serde::Serialize;

/// Where an array's element count comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LengthSource {
    /// A sibling parameter, by raw name
    Parameter {
        /// Raw parameter name
        name: String,
    },
    /// A member reached through a sibling (`pAllocateInfo->descriptorSetCount`)
    Field {
        /// Raw name of the sibling parameter
        parameter: String,
        /// Member path below the parameter
        path: Vec<String>,
    },
}

impl LengthSource {
    /// Parse a `len` reference; nested paths use `->` or `::`
    pub fn parse(reference: &str) -> Self {
        let normalized = reference.replace("::", "->");
        let mut parts = normalized.split("->").map(|p| p.trim().to_string());
        let head = parts.next().unwrap_or_default();
        let path: Vec<String> = parts.filter(|p| !p.is_empty()).collect();
        if path.is_empty() {
            LengthSource::Parameter { name: head }
        } else {
            LengthSource::Field {
                parameter: head,
                path,
            }
        }
    }

    /// Raw name of the parameter the count is read from
    pub fn parameter(&self) -> &str {
        match self {
            LengthSource::Parameter { name } => name,
            LengthSource::Field { parameter, .. } => parameter,
        }
    }

    /// Whether the count is a sibling parameter rather than a nested field
    pub fn is_direct(&self) -> bool {
        matches!(self, LengthSource::Parameter { .. })
    }
}

/// How the value of a parameter's type crosses the native boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    /// Primitive or enumeration passed by value
    Value,
    /// Opaque handle
    Handle,
    /// Composite with a flat layout
    FlatComposite,
    /// Composite accessed through a native pointer
    MarshalledComposite,
    /// Type with no known layout (`void`, platform opaques)
    Opaque,
}

/// Role of a parameter in the public call shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ParameterRole {
    /// Handle the command is bound to; elided from the public signature
    BoundSelf,
    /// Required input
    Input,
    /// Input pointer that may be absent
    OptionalInput,
    /// NUL-terminated string input
    Text,
    /// Untyped byte buffer written by the native call
    RawBuffer {
        /// Byte length source
        length: LengthSource,
    },
    /// Array input with a length source
    InputArray {
        /// Element count source
        count: LengthSource,
    },
    /// Single-value output written by the native call
    Output,
    /// Array output written by the native call
    OutputArray {
        /// Element count source
        count: LengthSource,
    },
    /// Element count of another parameter
    Count {
        /// Raw name of the first array it counts
        array: String,
        /// Whether the count can be derived from the array value's size
        derivable: bool,
    },
}

impl ParameterRole {
    /// Whether the role is a synthesizable output (single value, array or
    /// byte buffer)
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            ParameterRole::Output
                | ParameterRole::OutputArray { .. }
                | ParameterRole::RawBuffer { .. }
        )
    }

    /// Length source of an array role
    pub fn length(&self) -> Option<&LengthSource> {
        match self {
            ParameterRole::RawBuffer { length } => Some(length),
            ParameterRole::InputArray { count } | ParameterRole::OutputArray { count } => {
                Some(count)
            }
            _ => None,
        }
    }
}

/// One native parameter with its computed role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterEntity {
    /// Display name (`pCreateInfo` → `CreateInfo`)
    pub name: String,
    /// Raw parameter name
    pub raw_name: String,
    /// Canonical name of the declared type
    pub declared_type: String,
    /// Raw declared type
    pub raw_type: String,
    /// Declared as a pointer
    pub is_pointer: bool,
    /// Pointer to const
    pub is_const: bool,
    /// Pointer to pointer
    pub is_double_pointer: bool,
    /// First entry of the `optional` attribute
    pub optional: bool,
    /// Element count reference from `len`
    pub len: Option<LengthSource>,
    /// Inline array length
    pub fixed_length: Option<ArrayLength>,
    /// How values of the declared type cross the boundary
    pub treatment: Treatment,
    /// Computed role
    #[serde(flatten)]
    pub role: ParameterRole,
}

impl ParameterEntity {
    /// Whether the native call writes through this parameter
    pub fn is_written(&self) -> bool {
        self.is_pointer && !self.is_const
    }
}

/// Boundary treatment of a canonical type name
pub fn treatment_of(registry: &TypeRegistry, declared_type: &str) -> Result<Treatment> {
    let entity = registry.resolve(declared_type)?;
    Ok(match &entity.kind {
        EntityKind::Primitive { width } if width.is_value() => Treatment::Value,
        EntityKind::Primitive { .. } => Treatment::Opaque,
        EntityKind::Enumeration(_) => Treatment::Value,
        EntityKind::Handle(_) => Treatment::Handle,
        EntityKind::Composite(c) if c.needs_marshalling => Treatment::MarshalledComposite,
        EntityKind::Composite(_) => Treatment::FlatComposite,
        EntityKind::Alias { .. } => Treatment::Opaque,
    })
}

/// Parse every `param` of a command and assign roles
///
/// `bound` is true when the first parameter binds the command to a handle.
pub fn parse_parameters(
    command: &Element,
    owner: &str,
    registry: &TypeRegistry,
    names: &NameTranslator,
    bound: bool,
) -> Result<Vec<ParameterEntity>> {
    let mut declarators = Vec::new();
    for param in command.elements("param") {
        declarators.push(parse_declarator(param, owner, &registry.constants)?);
    }

    let mut params = Vec::with_capacity(declarators.len());
    for (i, decl) in declarators.iter().enumerate() {
        let declared_type = registry
            .resolve_raw(&decl.raw_type)
            .map(|e| e.name.clone())
            .map_err(|_| Error::unknown("type", decl.raw_type.as_str(), owner))?;
        let len = match decl.length_reference() {
            Some(reference) => {
                let source = LengthSource::parse(reference);
                if !declarators.iter().any(|d| d.raw_name == source.parameter()) {
                    return Err(Error::unknown("length parameter", source.parameter(), owner));
                }
                Some(source)
            }
            None => None,
        };

        let role = initial_role(decl, len.as_ref(), i == 0 && bound);
        params.push(ParameterEntity {
            name: names.parameter_name(&decl.raw_name, decl.is_pointer),
            raw_name: decl.raw_name.clone(),
            treatment: treatment_of(registry, &declared_type)?,
            declared_type,
            raw_type: decl.raw_type.clone(),
            is_pointer: decl.is_pointer,
            is_const: decl.is_const,
            is_double_pointer: decl.is_double_pointer,
            optional: decl.optional,
            len,
            fixed_length: decl.fixed_length.clone(),
            role,
        });
    }

    link_counts(&mut params);
    Ok(params)
}

fn initial_role(decl: &Declarator, len: Option<&LengthSource>, bound_self: bool) -> ParameterRole {
    if bound_self {
        return ParameterRole::BoundSelf;
    }
    if decl.is_text() && decl.is_const {
        return ParameterRole::Text;
    }
    let writable = decl.is_pointer && !decl.is_const;
    match (writable, len) {
        (true, Some(length)) if decl.raw_type == "void" => ParameterRole::RawBuffer {
            length: length.clone(),
        },
        (true, Some(count)) => ParameterRole::OutputArray {
            count: count.clone(),
        },
        (true, None) => ParameterRole::Output,
        (false, Some(count)) if decl.is_pointer => ParameterRole::InputArray {
            count: count.clone(),
        },
        _ if decl.optional && decl.is_pointer => ParameterRole::OptionalInput,
        _ => ParameterRole::Input,
    }
}

/// Mark parameters referenced as direct lengths as counts
///
/// A count is derivable when at least one input array it sizes is passed
/// by the caller and the count itself is passed by value.
fn link_counts(params: &mut [ParameterEntity]) {
    let links: Vec<(String, String, bool)> = params
        .iter()
        .filter_map(|p| {
            let source = p.role.length()?;
            if !source.is_direct() {
                return None;
            }
            let derivable = matches!(p.role, ParameterRole::InputArray { .. });
            Some((source.parameter().to_string(), p.raw_name.clone(), derivable))
        })
        .collect();

    for (count, array, derivable) in links {
        let Some(param) = params.iter_mut().find(|p| p.raw_name == count) else {
            continue;
        };
        let derivable = derivable && !param.is_pointer;
        match &mut param.role {
            ParameterRole::Count {
                derivable: existing,
                ..
            } => *existing = *existing || derivable,
            ParameterRole::BoundSelf => {}
            role => *role = ParameterRole::Count { array, derivable },
        }
    }
}

/// Whether `raw_type` may act as an element count
pub fn is_count_candidate(options: &GeneratorOptions, param: &ParameterEntity) -> bool {
    options.is_count_type(&param.raw_type) && param.fixed_length.is_none()
}
