//! # Marshalling Analyzer
//!
//! Decides for every composite whether it can be mapped as a flat value or
//! must be wrapped behind a native pointer.
//!
//! ```text
//! pass 0: all flags false
//! pass n: flag(C) = any member of C
//!                     is a pointer
//!                   | names a handle
//!                   | is a fixed array of handles or marshalled composites
//!                   | names a composite flagged in pass n-1
//! stop when a pass changes nothing
//! ```
//!
//! The predicate only ever turns true when a dependency does, so the flagged
//! set grows monotonically and the loop ends after at most one pass per link
//! of the longest dependency chain.

use crate::registry::{Arity, EntityKind, MemberEntity, TypeId, TypeRegistry};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of the fixpoint, kept for diagnostics and property tests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarshallingReport {
    /// Canonical names flagged after each pass, in pass order
    pub passes: Vec<BTreeSet<String>>,
}

impl MarshallingReport {
    /// Number of evaluation passes, including the final no-change pass
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Composites needing marshalling at the fixpoint
    pub fn marshalled(&self) -> BTreeSet<String> {
        self.passes.last().cloned().unwrap_or_default()
    }

    /// Whether every pass kept all names flagged by the pass before it
    pub fn is_monotone(&self) -> bool {
        self.passes.windows(2).all(|w| w[0].is_subset(&w[1]))
    }
}

/// Whether one member forces its composite behind indirection, given the
/// current flags of other composites
pub fn member_needs_marshalling(registry: &TypeRegistry, member: &MemberEntity) -> Result<bool> {
    if member.is_pointer {
        return Ok(true);
    }

    let declared = registry.resolve(&member.declared_type)?;
    let by_value_needs = match &declared.kind {
        EntityKind::Handle(_) => true,
        EntityKind::Composite(c) => c.needs_marshalling,
        EntityKind::Primitive { width } => !width.is_value(),
        EntityKind::Enumeration(_) | EntityKind::Alias { .. } => false,
    };

    Ok(match member.arity {
        Arity::Scalar | Arity::FixedArray { .. } => by_value_needs,
        Arity::LengthLinkedArray { .. } => true,
    })
}

fn composite_needs_marshalling(registry: &TypeRegistry, id: TypeId) -> Result<bool> {
    let Some(composite) = registry.get(id).as_composite() else {
        return Ok(false);
    };
    for member in &composite.members {
        if member_needs_marshalling(registry, member)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run the fixpoint and store the flags on every composite
pub fn analyze(registry: &mut TypeRegistry) -> Result<MarshallingReport> {
    let composites = registry.composite_ids();
    for id in &composites {
        registry.set_needs_marshalling(*id, false);
    }

    let mut report = MarshallingReport::default();
    loop {
        let mut next = Vec::with_capacity(composites.len());
        for id in &composites {
            next.push(composite_needs_marshalling(registry, *id)?);
        }

        let mut changed = false;
        let mut flagged = BTreeSet::new();
        for (id, needs) in composites.iter().zip(next) {
            let entity = registry.get(*id);
            let before = entity.as_composite().is_some_and(|c| c.needs_marshalling);
            if needs {
                flagged.insert(entity.name.clone());
            }
            if before != needs {
                changed = true;
                registry.set_needs_marshalling(*id, needs);
            }
        }
        report.passes.push(flagged);

        if !changed {
            break;
        }
    }

    tracing::info!(
        "marshalling fixpoint converged after {} passes: {} of {} composites need marshalling",
        report.pass_count(),
        report.marshalled().len(),
        composites.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Composite, CompositeKind, Handle, NativeWidth};

    fn scalar(name: &str, ty: &str, is_pointer: bool) -> MemberEntity {
        MemberEntity {
            name: name.to_string(),
            raw_name: name.to_string(),
            declared_type: ty.to_string(),
            raw_type: ty.to_string(),
            is_pointer,
            is_const_pointer: false,
            is_double_pointer: false,
            optional: false,
            arity: Arity::Scalar,
            counter: None,
            values: None,
        }
    }

    fn composite(registry: &mut TypeRegistry, name: &str, members: Vec<MemberEntity>) -> TypeId {
        let mut c = Composite::new(CompositeKind::Struct);
        c.members = members;
        registry.register(name, name, EntityKind::Composite(c))
    }

    fn base_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register("u32", "u32", EntityKind::Primitive { width: NativeWidth::U32 });
        registry.register(
            "Fence",
            "Fence",
            EntityKind::Handle(Handle {
                dispatchable: false,
                parent: None,
                methods: vec![],
            }),
        );
        registry
    }

    #[test]
    fn test_chain_propagates() {
        let mut registry = base_registry();
        let leaf = composite(&mut registry, "Leaf", vec![scalar("fence", "Fence", false)]);
        let mid = composite(&mut registry, "Mid", vec![scalar("leaf", "Leaf", false)]);
        let top = composite(&mut registry, "Top", vec![scalar("mid", "Mid", false)]);
        let flat = composite(&mut registry, "Flat", vec![scalar("x", "u32", false)]);

        let report = analyze(&mut registry).unwrap();

        for id in [leaf, mid, top] {
            assert!(registry.get(id).as_composite().unwrap().needs_marshalling);
        }
        assert!(!registry.get(flat).as_composite().unwrap().needs_marshalling);
        assert!(report.is_monotone());
        assert_eq!(report.pass_count(), 4);
    }

    #[test]
    fn test_fixed_array_of_flat_values_is_flat() {
        let mut registry = base_registry();
        let mut member = scalar("values", "u32", false);
        member.arity = Arity::FixedArray {
            length: crate::registry::ArrayLength::Literal(4),
        };
        let id = composite(&mut registry, "Values", vec![member]);
        analyze(&mut registry).unwrap();
        assert!(!registry.get(id).as_composite().unwrap().needs_marshalling);
    }

    #[test]
    fn test_pointer_member_marshals() {
        let mut registry = base_registry();
        let id = composite(&mut registry, "Info", vec![scalar("pNext", "u32", true)]);
        analyze(&mut registry).unwrap();
        assert!(registry.get(id).as_composite().unwrap().needs_marshalling);
    }

    #[test]
    fn test_reanalysis_is_stable() {
        let mut registry = base_registry();
        composite(&mut registry, "Leaf", vec![scalar("fence", "Fence", false)]);
        let first = analyze(&mut registry).unwrap();
        let second = analyze(&mut registry).unwrap();
        assert_eq!(first.marshalled(), second.marshalled());
    }
}
