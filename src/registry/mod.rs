//! # Type Registry
//!
//! Accumulates every declared type of the document keyed by canonical name
//! and resolves alias chains to a single concrete entity.
//!
//! ## Registration order
//!
//! ```text
//! builtins / platform types / funcpointers     (includes)
//!   → basetypes, API constants                 (typedefs)
//!   → bitmasks, enums, enum members            (enums.rs)
//!   → handles                                  (handles.rs)
//!   → struct/union shells → members            (composite.rs)
//! ```
//!
//! Entities live in an arena indexed by [`TypeId`]. Aliases are ordinary
//! entities holding the canonical name of their target; [`TypeRegistry::resolve`]
//! follows the chain and rejects cycles.

pub mod builder;
pub mod composite;
pub mod enums;
pub mod handles;
pub mod types;

pub use builder::RegistryBuilder;
pub use types::{
    ArrayLength, Arity, Composite, CompositeKind, EntityKind, EnumMember, Enumeration, Handle,
    MemberEntity, NativeWidth, TypeEntity, TypeId,
};

use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A platform from the document's `platforms` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    /// Platform name (`win32`, `android`, ...)
    pub name: String,
    /// Preprocessor macro guarding the platform's declarations
    pub protect: Option<String>,
}

/// All registered types of one compilation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeRegistry {
    entities: Vec<TypeEntity>,
    #[serde(skip)]
    by_name: BTreeMap<String, TypeId>,
    #[serde(skip)]
    by_raw: BTreeMap<String, TypeId>,
    /// Evaluated integer API constants, by raw name
    pub constants: BTreeMap<String, i64>,
    /// Platforms declared by the document
    pub platforms: Vec<Platform>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under its canonical name
    ///
    /// Registering a canonical name that is already known returns the existing
    /// id and only records `raw_name` as another spelling of it.
    pub fn register(
        &mut self,
        raw_name: &str,
        name: &str,
        kind: EntityKind,
    ) -> TypeId {
        if let Some(&id) = self.by_name.get(name) {
            self.by_raw.entry(raw_name.to_string()).or_insert(id);
            return id;
        }
        let id = TypeId(self.entities.len());
        self.entities.push(TypeEntity {
            name: name.to_string(),
            raw_name: raw_name.to_string(),
            kind,
        });
        self.by_name.insert(name.to_string(), id);
        self.by_raw.entry(raw_name.to_string()).or_insert(id);
        id
    }

    /// Record another raw spelling for an existing entity
    pub fn add_raw_name(&mut self, raw_name: &str, id: TypeId) {
        self.by_raw.entry(raw_name.to_string()).or_insert(id);
    }

    /// Entity by id
    pub fn get(&self, id: TypeId) -> &TypeEntity {
        &self.entities[id.0]
    }

    /// Mutable entity by id
    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeEntity {
        &mut self.entities[id.0]
    }

    /// Id of a canonical name, without alias resolution
    pub fn id_of(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Id of a raw name, without alias resolution
    pub fn id_of_raw(&self, raw: &str) -> Option<TypeId> {
        self.by_raw.get(raw).copied()
    }

    /// Entity by canonical name, without alias resolution
    pub fn lookup(&self, name: &str) -> Option<&TypeEntity> {
        self.id_of(name).map(|id| self.get(id))
    }

    /// Entity by raw name, without alias resolution
    pub fn lookup_raw(&self, raw: &str) -> Option<&TypeEntity> {
        self.id_of_raw(raw).map(|id| self.get(id))
    }

    /// Canonical name registered for a raw name
    pub fn canonical_of_raw(&self, raw: &str) -> Option<&str> {
        self.lookup_raw(raw).map(|e| e.name.as_str())
    }

    /// Follow an alias chain from `id` to its concrete entity
    pub fn resolve_id(&self, id: TypeId) -> Result<TypeId> {
        let mut current = id;
        let mut seen = BTreeSet::new();
        loop {
            let entity = self.get(current);
            let target = match &entity.kind {
                EntityKind::Alias { target } => target,
                _ => return Ok(current),
            };
            if !seen.insert(current) {
                return Err(Error::AliasCycle {
                    name: entity.name.clone(),
                });
            }
            current = self
                .id_of(target)
                .ok_or_else(|| Error::unknown("alias target", target.as_str(), &entity.name))?;
        }
    }

    /// Resolve a canonical name through aliases to its concrete entity
    pub fn resolve(&self, name: &str) -> Result<&TypeEntity> {
        let id = self
            .id_of(name)
            .ok_or_else(|| Error::unknown("type", name, "registry lookup"))?;
        Ok(self.get(self.resolve_id(id)?))
    }

    /// Resolve a raw name through aliases to its concrete entity
    pub fn resolve_raw(&self, raw: &str) -> Result<&TypeEntity> {
        let id = self
            .id_of_raw(raw)
            .ok_or_else(|| Error::unknown("type", raw, "registry lookup"))?;
        Ok(self.get(self.resolve_id(id)?))
    }

    /// Check every alias in the registry resolves to a concrete entity
    pub fn check_aliases(&self) -> Result<()> {
        for (i, entity) in self.entities.iter().enumerate() {
            if entity.is_alias() {
                self.resolve_id(TypeId(i))?;
            }
        }
        Ok(())
    }

    /// All entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = (TypeId, &TypeEntity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (TypeId(i), e))
    }

    /// Number of registered entities, aliases included
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of all composites, in registration order
    pub fn composite_ids(&self) -> Vec<TypeId> {
        self.entities()
            .filter(|(_, e)| e.as_composite().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// All enumerations
    pub fn enumerations(&self) -> impl Iterator<Item = (&TypeEntity, &Enumeration)> {
        self.entities
            .iter()
            .filter_map(|e| e.as_enumeration().map(|en| (e, en)))
    }

    /// All composites
    pub fn composites(&self) -> impl Iterator<Item = (&TypeEntity, &Composite)> {
        self.entities
            .iter()
            .filter_map(|e| e.as_composite().map(|c| (e, c)))
    }

    /// All handles
    pub fn handles(&self) -> impl Iterator<Item = (&TypeEntity, &Handle)> {
        self.entities
            .iter()
            .filter_map(|e| e.as_handle().map(|h| (e, h)))
    }

    /// Resolved handle data for a raw type name, if it names a handle
    pub fn handle_of_raw(&self, raw: &str) -> Option<&TypeEntity> {
        self.resolve_raw(raw)
            .ok()
            .filter(|e| e.as_handle().is_some())
    }

    /// Attach a command to a handle's method list
    pub fn bind_method(&mut self, handle: TypeId, command_raw: &str) {
        if let EntityKind::Handle(h) = &mut self.get_mut(handle).kind {
            if !h.methods.iter().any(|m| m == command_raw) {
                h.methods.push(command_raw.to_string());
            }
        }
    }

    /// Set the marshalling flag of a composite
    pub fn set_needs_marshalling(&mut self, id: TypeId, value: bool) {
        if let EntityKind::Composite(c) = &mut self.get_mut(id).kind {
            c.needs_marshalling = value;
        }
    }

    /// Whether a canonical name resolves to a composite needing marshalling
    pub fn needs_marshalling(&self, name: &str) -> bool {
        self.resolve(name)
            .ok()
            .and_then(TypeEntity::as_composite)
            .is_some_and(|c| c.needs_marshalling)
    }
}
