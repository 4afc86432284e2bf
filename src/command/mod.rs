//! # Command Classifier
//!
//! Turns a flat native parameter list into public call shapes.
//!
//! ```text
//! <command> ──▶ parameters + roles (params.rs)
//!           ──▶ return strategy   (Passthrough | SingleValue
//!                                  | FillKnownLength | QueryThenFill)
//!           ──▶ call shapes       (Raw, plus Simplified when an input
//!                                  array's length is derivable) (shape.rs)
//! ```
//!
//! Alias commands are skipped; they resolve to their target's
//! classification. Hand-written commands are recorded as visible but are
//! never classified.

pub mod params;
pub mod shape;

pub use params::{LengthSource, ParameterEntity, ParameterRole, Treatment};
pub use shape::{ArgumentPlan, CallShape, NativeArg, PublicParameter, ShapeKind};

use crate::config::GeneratorOptions;
use crate::document::{Element, RegistryDocument};
use crate::naming::NameTranslator;
use crate::registry::{Enumeration, NativeWidth, TypeRegistry};
use crate::scope::CommandAliases;
use crate::{Error, Result};
use serde::Serialize;

/// How a command reports failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultConvention {
    /// The native return value is handed back as is
    ReturnsValueDirectly,
    /// The native return is a status code; non-success raises an error
    StatusCode,
}

/// How the public return value is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ReturnStrategy {
    /// The native return value (or nothing) is returned unchanged
    Passthrough,
    /// The value written to one output parameter is returned
    SingleValue {
        /// Raw name of the output parameter
        output: String,
    },
    /// One native call fills an array whose length is already known
    FillKnownLength {
        /// Raw name of the output array
        output: String,
        /// Where the length is read from
        length: LengthSource,
    },
    /// Two native calls: the first obtains the count, the second fills a
    /// buffer of that size
    QueryThenFill {
        /// Raw name of the count parameter
        count: String,
        /// Raw name of the output array
        output: String,
    },
}

/// Public return type of a call shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "returns", content = "type", rename_all = "snake_case")]
pub enum PublicReturn {
    /// Nothing
    Void,
    /// One value of a canonical type
    Value(String),
    /// An array of a canonical type
    Array(String),
}

/// A native function declaration with classified parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEntity {
    /// Raw command name
    pub name: String,
    /// Canonical return type
    pub return_type: String,
    /// Raw return type
    pub raw_return_type: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterEntity>,
    /// Failure reporting convention
    pub result_convention: ResultConvention,
}

impl CommandEntity {
    /// Parameter by raw name
    pub fn parameter(&self, raw: &str) -> Option<&ParameterEntity> {
        self.parameters.iter().find(|p| p.raw_name == raw)
    }
}

/// Classification result of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandClassification {
    /// The classified command
    pub command: CommandEntity,
    /// Public name (method name when bound)
    pub public_name: String,
    /// Canonical name of the handle the command is bound to
    pub bound_handle: Option<String>,
    /// Return synthesis
    pub strategy: ReturnStrategy,
    /// Public return type
    pub returns: PublicReturn,
    /// Raw shape, then the simplified shape when one applies
    pub shapes: Vec<CallShape>,
    /// Known limitations of the derived shapes
    pub limitations: Vec<String>,
    /// Canonical name of the success status member
    pub success_member: String,
}

impl CommandClassification {
    /// Shape of the given kind
    pub fn shape(&self, kind: ShapeKind) -> Option<&CallShape> {
        self.shapes.iter().find(|s| s.kind == kind)
    }

    /// Turn a native status code into a result
    ///
    /// Commands that do not return a status always succeed. For the rest,
    /// any code other than the success member's value is an error naming
    /// the matching status member when one exists.
    pub fn check_status(&self, code: i64, result_enum: &Enumeration) -> Result<()> {
        if self.command.result_convention != ResultConvention::StatusCode {
            return Ok(());
        }
        let success = result_enum.value_of(&self.success_member).unwrap_or(0);
        if code == success {
            return Ok(());
        }
        Err(Error::NativeStatus {
            command: self.command.name.clone(),
            code,
            status: result_enum.member_by_value(code).map(|m| m.name.clone()),
        })
    }
}

/// Classifies every command of a document against a finished registry
pub struct Classifier<'a> {
    registry: &'a TypeRegistry,
    options: &'a GeneratorOptions,
    names: &'a NameTranslator,
    aliases: &'a CommandAliases,
}

impl<'a> Classifier<'a> {
    /// Create a classifier
    pub fn new(
        registry: &'a TypeRegistry,
        options: &'a GeneratorOptions,
        names: &'a NameTranslator,
        aliases: &'a CommandAliases,
    ) -> Self {
        Self {
            registry,
            options,
            names,
            aliases,
        }
    }

    /// Classify every non-alias, non-handwritten command in document order
    pub fn classify_all(&self, doc: &RegistryDocument) -> Result<Vec<CommandClassification>> {
        let mut out = Vec::new();
        for element in doc.commands() {
            if let Some(classification) = self.classify(element)? {
                out.push(classification);
            }
        }

        tracing::info!(
            "classified {} commands ({} with limitations)",
            out.len(),
            out.iter().filter(|c| !c.limitations.is_empty()).count()
        );
        Ok(out)
    }

    /// Classify one `command` element
    ///
    /// Returns `None` for alias commands and hand-written commands.
    pub fn classify(&self, element: &Element) -> Result<Option<CommandClassification>> {
        let Some(proto) = element.element("proto") else {
            if let Some(name) = element.attr("name") {
                if self.aliases.is_alias(name) {
                    tracing::debug!("{} is an alias, skipped", name);
                    return Ok(None);
                }
            }
            return Err(Error::malformed("command", "declaration without a proto"));
        };

        let raw_name = proto
            .child_text("name")
            .ok_or_else(|| Error::malformed("command", "proto without a name"))?;
        if self.aliases.is_alias(&raw_name) {
            tracing::debug!("{} is an alias, skipped", raw_name);
            return Ok(None);
        }
        if self.options.handwritten_commands.contains(&raw_name) {
            tracing::debug!("{} is wrapped by hand, not classified", raw_name);
            return Ok(None);
        }

        let raw_return = proto
            .child_text("type")
            .ok_or_else(|| Error::malformed(raw_name.as_str(), "proto without a return type"))?;
        let return_type = self
            .registry
            .resolve_raw(&raw_return)
            .map(|e| e.name.clone())
            .map_err(|_| Error::unknown("type", raw_return.as_str(), raw_name.as_str()))?;

        let bound_handle = self.bound_handle(element);
        let parameters = params::parse_parameters(
            element,
            &raw_name,
            self.registry,
            self.names,
            bound_handle.is_some(),
        )?;

        let result_convention = if raw_return == self.options.status_type {
            ResultConvention::StatusCode
        } else {
            ResultConvention::ReturnsValueDirectly
        };

        let command = CommandEntity {
            name: raw_name.clone(),
            return_type,
            raw_return_type: raw_return.clone(),
            parameters,
            result_convention,
        };

        let mut limitations = Vec::new();
        let synthesizes =
            raw_return == "void" || result_convention == ResultConvention::StatusCode;
        let strategy = if synthesizes {
            self.derive_strategy(&command, &mut limitations)
        } else {
            ReturnStrategy::Passthrough
        };
        let returns = public_return(&command, &strategy);

        let public_name = match &bound_handle {
            Some(handle) => self.names.method_name(&raw_name, handle),
            None => self.names.command_name(&raw_name),
        };

        let mut shapes = vec![CallShape::build(
            ShapeKind::Raw,
            &public_name,
            &command.parameters,
        )];
        if self.wants_simplified(&command) {
            shapes.push(CallShape::build(
                ShapeKind::Simplified,
                &public_name,
                &command.parameters,
            ));
        }

        for limitation in &limitations {
            tracing::debug!("{}: {}", raw_name, limitation);
        }

        Ok(Some(CommandClassification {
            command,
            public_name,
            bound_handle,
            strategy,
            returns,
            shapes,
            limitations,
            success_member: self.options.success_member.clone(),
        }))
    }

    /// Canonical name of the handle the first parameter binds to, if it is
    /// a handle passed by value
    fn bound_handle(&self, element: &Element) -> Option<String> {
        let first = element.element("param")?;
        let raw_type = first.child_text("type")?;
        let by_value = !first.value().contains('*');
        if !by_value {
            return None;
        }
        self.registry
            .handle_of_raw(raw_type.trim())
            .map(|h| h.name.clone())
    }

    fn wants_simplified(&self, command: &CommandEntity) -> bool {
        let has_input_array = command.parameters.iter().any(|p| {
            matches!(
                p.role,
                ParameterRole::Count {
                    derivable: true,
                    ..
                }
            )
        });
        has_input_array
            && !self
                .options
                .ignored_simplified_commands
                .contains(&self.names.command_name(&command.name))
    }

    fn derive_strategy(
        &self,
        command: &CommandEntity,
        limitations: &mut Vec<String>,
    ) -> ReturnStrategy {
        let params = &command.parameters;
        let outputs: Vec<&ParameterEntity> = params.iter().filter(|p| p.role.is_output()).collect();

        match outputs.as_slice() {
            [] => return ReturnStrategy::Passthrough,
            [only] => {
                if let Some(strategy) = single_output_strategy(command, only) {
                    return strategy;
                }
            }
            _ => {}
        }

        for pair in params.windows(2) {
            let (count, data) = (&pair[0], &pair[1]);
            if !params::is_count_candidate(self.options, count) || !data.role.is_output() {
                continue;
            }
            let ignored: Vec<&str> = outputs
                .iter()
                .filter(|p| p.raw_name != data.raw_name)
                .map(|p| p.raw_name.as_str())
                .collect();
            if !ignored.is_empty() {
                limitations.push(format!(
                    "outputs {} are not part of the public return",
                    ignored.join(", ")
                ));
            }
            return if count.is_written() {
                ReturnStrategy::QueryThenFill {
                    count: count.raw_name.clone(),
                    output: data.raw_name.clone(),
                }
            } else {
                ReturnStrategy::FillKnownLength {
                    output: data.raw_name.clone(),
                    length: LengthSource::Parameter {
                        name: count.raw_name.clone(),
                    },
                }
            };
        }

        limitations.push(format!(
            "no return synthesis for outputs {}; left as native out parameters",
            outputs
                .iter()
                .map(|p| p.raw_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        ReturnStrategy::Passthrough
    }
}

fn single_output_strategy(
    command: &CommandEntity,
    output: &ParameterEntity,
) -> Option<ReturnStrategy> {
    match &output.role {
        ParameterRole::Output => Some(ReturnStrategy::SingleValue {
            output: output.raw_name.clone(),
        }),
        ParameterRole::OutputArray { count } | ParameterRole::RawBuffer { length: count } => {
            let counter = command.parameter(count.parameter())?;
            if count.is_direct() && counter.is_written() {
                Some(ReturnStrategy::QueryThenFill {
                    count: counter.raw_name.clone(),
                    output: output.raw_name.clone(),
                })
            } else {
                Some(ReturnStrategy::FillKnownLength {
                    output: output.raw_name.clone(),
                    length: count.clone(),
                })
            }
        }
        _ => None,
    }
}

fn public_return(command: &CommandEntity, strategy: &ReturnStrategy) -> PublicReturn {
    let type_of = |raw: &str| match command.parameter(raw) {
        Some(p) if matches!(p.role, ParameterRole::RawBuffer { .. }) => {
            NativeWidth::U8.canonical_name().to_string()
        }
        Some(p) => p.declared_type.clone(),
        None => String::new(),
    };
    match strategy {
        ReturnStrategy::SingleValue { output } => PublicReturn::Value(type_of(output)),
        ReturnStrategy::FillKnownLength { output, .. }
        | ReturnStrategy::QueryThenFill { output, .. } => PublicReturn::Array(type_of(output)),
        ReturnStrategy::Passthrough => match command.result_convention {
            ResultConvention::StatusCode => PublicReturn::Void,
            ResultConvention::ReturnsValueDirectly if command.raw_return_type == "void" => {
                PublicReturn::Void
            }
            ResultConvention::ReturnsValueDirectly => {
                PublicReturn::Value(command.return_type.clone())
            }
        },
    }
}
