//! Public call shapes and their lowering onto the native argument list
//!
//! A call shape is the signature the wrapper exposes plus a plan saying,
//! for every native parameter, where its value comes from:
//!
//! ```text
//! public args ──▶ plan ──▶ native args
//!   [handle, infos]         Public(0)       → handle
//!                           CountOf(1)      → len(infos)
//!                           Public(1)       → infos
//!                           Slot            → wrapper-owned output
//! ```

use super::params::{ParameterEntity, ParameterRole};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Which variant of a command a shape describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Arrays and their lengths are both explicit
    Raw,
    /// Lengths of input arrays are derived from the arrays
    Simplified,
}

/// One parameter of a public call shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicParameter {
    /// Display name
    pub name: String,
    /// Raw name of the native parameter it feeds
    pub raw_name: String,
    /// Canonical type name
    pub declared_type: String,
    /// Role of the native parameter
    pub role: ParameterRole,
    /// Whether the value may be omitted (`null`); only optional input
    /// pointers qualify
    pub optional: bool,
    /// Whether this is the method receiver
    pub receiver: bool,
}

/// Where a native argument's value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ArgumentPlan {
    /// The public argument at `index`
    Public {
        /// Public argument index
        index: usize,
    },
    /// Element count of the public array argument at `index`
    CountOf {
        /// Public argument index of the array
        index: usize,
        /// Other arrays sharing the count, which must match in length
        siblings: Vec<usize>,
    },
    /// Storage allocated by the wrapper and written by the native call
    Slot,
}

/// A lowered native argument
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NativeArg {
    /// Value passed through from the caller
    Value(Value),
    /// Count derived from an array argument
    DerivedCount(u64),
    /// Optional argument left out by the caller
    Absent,
    /// Wrapper-owned output storage
    Slot,
}

/// One public signature of a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallShape {
    /// Raw or simplified
    pub kind: ShapeKind,
    /// Public name
    pub public_name: String,
    /// Public parameters, receiver first when bound
    pub parameters: Vec<PublicParameter>,
    /// One plan entry per native parameter
    pub plan: Vec<ArgumentPlan>,
}

impl CallShape {
    /// Build a shape over classified native parameters
    ///
    /// Outputs and output counts become wrapper-owned slots. The simplified
    /// shape also hides counts whose value is derivable from an input array.
    pub fn build(kind: ShapeKind, public_name: &str, params: &[ParameterEntity]) -> Self {
        let mut parameters = Vec::new();
        let mut public_index = vec![None; params.len()];

        for (i, param) in params.iter().enumerate() {
            let hidden = match &param.role {
                role if role.is_output() => true,
                ParameterRole::Count { .. } if param.is_written() => true,
                ParameterRole::Count { derivable, .. } => {
                    kind == ShapeKind::Simplified && *derivable
                }
                _ => false,
            };
            if hidden {
                continue;
            }
            public_index[i] = Some(parameters.len());
            parameters.push(PublicParameter {
                name: param.name.clone(),
                raw_name: param.raw_name.clone(),
                declared_type: param.declared_type.clone(),
                role: param.role.clone(),
                optional: param.optional && param.is_pointer,
                receiver: param.role == ParameterRole::BoundSelf,
            });
        }

        let plan = params
            .iter()
            .enumerate()
            .map(|(i, param)| match public_index[i] {
                Some(index) => ArgumentPlan::Public { index },
                None if param.is_written() => ArgumentPlan::Slot,
                None => {
                    let arrays: Vec<usize> = params
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| {
                            p.role
                                .length()
                                .is_some_and(|l| l.is_direct() && l.parameter() == param.raw_name)
                        })
                        .filter_map(|(j, _)| public_index[j])
                        .collect();
                    match arrays.split_first() {
                        Some((first, rest)) => ArgumentPlan::CountOf {
                            index: *first,
                            siblings: rest.to_vec(),
                        },
                        None => ArgumentPlan::Slot,
                    }
                }
            })
            .collect();

        Self {
            kind,
            public_name: public_name.to_string(),
            parameters,
            plan,
        }
    }

    /// Map public argument values onto the native argument list
    ///
    /// Counts of a simplified shape are taken from the array's element
    /// count; arrays sharing a count must agree. Raw shapes pass every
    /// value through without checking it against anything.
    pub fn lower(&self, args: &[Value]) -> Result<Vec<NativeArg>> {
        if args.len() != self.parameters.len() {
            return Err(self.mismatch(format!(
                "expected {} arguments, got {}",
                self.parameters.len(),
                args.len()
            )));
        }

        let mut native = Vec::with_capacity(self.plan.len());
        for step in &self.plan {
            native.push(match step {
                ArgumentPlan::Public { index } => {
                    let param = &self.parameters[*index];
                    match &args[*index] {
                        Value::Null if param.optional => NativeArg::Absent,
                        Value::Null => {
                            return Err(self.mismatch(format!("{} is required", param.name)))
                        }
                        value => NativeArg::Value(value.clone()),
                    }
                }
                ArgumentPlan::CountOf { index, siblings } => {
                    let count = self.element_count(args, *index)?;
                    for sibling in siblings {
                        let other = self.element_count(args, *sibling)?;
                        if other != count {
                            return Err(self.mismatch(format!(
                                "{} has {} elements but {} has {}",
                                self.parameters[*sibling].name,
                                other,
                                self.parameters[*index].name,
                                count
                            )));
                        }
                    }
                    NativeArg::DerivedCount(count)
                }
                ArgumentPlan::Slot => NativeArg::Slot,
            });
        }
        Ok(native)
    }

    fn element_count(&self, args: &[Value], index: usize) -> Result<u64> {
        let param = &self.parameters[index];
        match &args[index] {
            Value::Array(items) => Ok(items.len() as u64),
            Value::String(bytes) => Ok(bytes.len() as u64),
            Value::Null if param.optional => Ok(0),
            other => Err(self.mismatch(format!(
                "{} must be an array, got {}",
                param.name, other
            ))),
        }
    }

    fn mismatch(&self, reason: String) -> Error {
        Error::ArgumentMismatch {
            shape: format!("{} ({:?})", self.public_name, self.kind),
            reason,
        }
    }

    /// Public parameter by display name
    pub fn parameter(&self, name: &str) -> Option<&PublicParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
