//! Entity definitions held by the [`TypeRegistry`](super::TypeRegistry)

use serde::{Deserialize, Serialize};

/// Native representation of a primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeWidth {
    /// `void`
    Void,
    /// `char`
    Char,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Pointer-sized unsigned integer
    USize,
    /// Pointer-sized opaque value
    Pointer,
    /// Platform type with no known layout; only usable behind a pointer
    Opaque,
}

impl NativeWidth {
    /// Canonical name of the primitive entity for this width
    pub fn canonical_name(&self) -> &'static str {
        match self {
            NativeWidth::Void => "void",
            NativeWidth::Char => "char",
            NativeWidth::I8 => "i8",
            NativeWidth::U8 => "u8",
            NativeWidth::I16 => "i16",
            NativeWidth::U16 => "u16",
            NativeWidth::I32 => "i32",
            NativeWidth::U32 => "u32",
            NativeWidth::I64 => "i64",
            NativeWidth::U64 => "u64",
            NativeWidth::F32 => "f32",
            NativeWidth::F64 => "f64",
            NativeWidth::USize => "usize",
            NativeWidth::Pointer => "pointer",
            NativeWidth::Opaque => "opaque",
        }
    }

    /// Size in bytes on a 64-bit target, `None` for `void` and opaque types
    pub fn size_bytes(&self) -> Option<usize> {
        match self {
            NativeWidth::Void | NativeWidth::Opaque => None,
            NativeWidth::Char | NativeWidth::I8 | NativeWidth::U8 => Some(1),
            NativeWidth::I16 | NativeWidth::U16 => Some(2),
            NativeWidth::I32 | NativeWidth::U32 | NativeWidth::F32 => Some(4),
            NativeWidth::I64
            | NativeWidth::U64
            | NativeWidth::F64
            | NativeWidth::USize
            | NativeWidth::Pointer => Some(8),
        }
    }

    /// Whether a value of this width can be stored inline in a flat struct
    pub fn is_value(&self) -> bool {
        !matches!(self, NativeWidth::Void | NativeWidth::Opaque)
    }
}

/// Index of an entity in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) usize);

impl TypeId {
    /// Arena position
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One registered type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeEntity {
    /// Canonical display name, unique within the registry
    pub name: String,
    /// Raw name of the declaration that first registered this entity
    pub raw_name: String,
    /// Kind-specific data
    #[serde(flatten)]
    pub kind: EntityKind,
}

/// Kind-specific data of a [`TypeEntity`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    /// Built-in, basic or platform type with a fixed mapping
    Primitive {
        /// Native representation
        width: NativeWidth,
    },
    /// Opaque native handle
    Handle(Handle),
    /// Enumeration or bitmask
    Enumeration(Enumeration),
    /// Structure or union
    Composite(Composite),
    /// Synonym for another entity
    Alias {
        /// Canonical name of the aliased entity (may itself be an alias)
        target: String,
    },
}

/// Opaque handle data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handle {
    /// Dispatchable handles are pointer-sized, the rest are 64-bit integers
    pub dispatchable: bool,
    /// Raw name of the parent handle, if declared
    pub parent: Option<String>,
    /// Raw names of commands bound to this handle as methods
    pub methods: Vec<String>,
}

impl Handle {
    /// Native width of a handle value
    pub fn width(&self) -> NativeWidth {
        if self.dispatchable {
            NativeWidth::Pointer
        } else {
            NativeWidth::U64
        }
    }
}

/// One enumeration member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    /// Canonical member name
    pub name: String,
    /// Raw member name; empty for the implicit `None` member
    pub raw_name: String,
    /// Literal value
    pub value: i64,
}

/// Enumeration data; members keep registration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enumeration {
    /// Bitmask enumerations always start with `None = 0`
    pub is_bitmask: bool,
    /// Members in registration order
    pub members: Vec<EnumMember>,
}

impl Enumeration {
    /// Member by canonical name
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Member by raw name
    pub fn member_by_raw(&self, raw: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.raw_name == raw)
    }

    /// First member carrying the given value
    pub fn member_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    /// Value of a member by canonical name
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.member(name).map(|m| m.value)
    }
}

/// Structure or union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    /// `struct`
    Struct,
    /// `union`
    Union,
}

/// Length of a fixed-size array member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLength {
    /// Literal length (`float color[4]`)
    Literal(u64),
    /// Named API constant and its evaluated value
    Constant {
        /// Raw constant name
        name: String,
        /// Evaluated length
        value: u64,
    },
}

impl ArrayLength {
    /// Element count
    pub fn count(&self) -> u64 {
        match self {
            ArrayLength::Literal(n) => *n,
            ArrayLength::Constant { value, .. } => *value,
        }
    }
}

/// How many values a member holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "arity", rename_all = "snake_case")]
pub enum Arity {
    /// A single value
    Scalar,
    /// Inline array with a compile-time length
    FixedArray {
        /// Array length
        length: ArrayLength,
    },
    /// Array whose count is carried by another member
    LengthLinkedArray {
        /// Raw name of the counting member; may be a `->`/`::` path
        length_member: String,
    },
}

impl Arity {
    /// Whether the member is any kind of array
    pub fn is_array(&self) -> bool {
        !matches!(self, Arity::Scalar)
    }
}

/// One member of a composite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberEntity {
    /// Display name
    pub name: String,
    /// Raw member name
    pub raw_name: String,
    /// Canonical name of the declared type (resolve through the registry)
    pub declared_type: String,
    /// Raw declared type name
    pub raw_type: String,
    /// Declared as `T*`
    pub is_pointer: bool,
    /// Declared as `const T*`
    pub is_const_pointer: bool,
    /// Declared as `T**` or `T* const*`
    pub is_double_pointer: bool,
    /// Marked optional in the document
    pub optional: bool,
    /// Scalar or array shape
    #[serde(flatten)]
    pub arity: Arity,
    /// Raw name of the member counting a fixed array's used entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<String>,
    /// Raw values pinned by the document (`sType` values)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
}

/// Composite data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    /// Struct or union
    pub composite_kind: CompositeKind,
    /// Members in declaration order
    pub members: Vec<MemberEntity>,
    /// Computed by the marshalling fixpoint
    pub needs_marshalling: bool,
    /// Canonical name of the structure this one extends
    pub extends: Option<String>,
    /// Raw structure-type enum value from the `sType` member
    pub structure_type: Option<String>,
    /// Declared outside the document; layout is fixed by the platform
    pub foreign: bool,
    /// Returned from the API only, never passed in
    pub returned_only: bool,
}

impl Composite {
    /// An empty composite of the given kind
    pub fn new(composite_kind: CompositeKind) -> Self {
        Self {
            composite_kind,
            members: Vec::new(),
            needs_marshalling: false,
            extends: None,
            structure_type: None,
            foreign: false,
            returned_only: false,
        }
    }

    /// Member by raw name
    pub fn member_by_raw(&self, raw: &str) -> Option<&MemberEntity> {
        self.members.iter().find(|m| m.raw_name == raw)
    }
}

impl TypeEntity {
    /// Whether this entity is an alias
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, EntityKind::Alias { .. })
    }

    /// Handle data, if this is a handle
    pub fn as_handle(&self) -> Option<&Handle> {
        match &self.kind {
            EntityKind::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Enumeration data, if this is an enumeration
    pub fn as_enumeration(&self) -> Option<&Enumeration> {
        match &self.kind {
            EntityKind::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    /// Composite data, if this is a composite
    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.kind {
            EntityKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Primitive width, if this is a primitive
    pub fn as_primitive(&self) -> Option<NativeWidth> {
        match &self.kind {
            EntityKind::Primitive { width } => Some(*width),
            _ => None,
        }
    }

    /// Short kind label for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EntityKind::Primitive { .. } => "primitive",
            EntityKind::Handle(_) => "handle",
            EntityKind::Enumeration(_) => "enumeration",
            EntityKind::Composite(_) => "composite",
            EntityKind::Alias { .. } => "alias",
        }
    }
}
