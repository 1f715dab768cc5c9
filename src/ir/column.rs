//! Column descriptors and related identifier primitives (C1).

use core::fmt;

/// A closed enumeration of host-language type tags a column or parameter can carry.
///
/// `Decimal` is represented as a string host-type to preserve arbitrary
/// precision — callers must not coerce decimal values to floating point.
/// `Any` is the fallback for a host type the caller's type-mapping layer does
/// not recognize; the core never rejects it, and never silently coerces it to
/// something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int32,
    Int64,
    Float64,
    Decimal,
    Bool,
    String,
    Time,
    Bytes,
    Json,
    Any,
}

impl TypeTag {
    /// The opaque wire-form string for this tag, exchanged verbatim with
    /// downstream code generators.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Time => "time",
            Self::Bytes => "bytes",
            Self::Json => "json",
            Self::Any => "any",
        }
    }

    /// Parses a wire-form host-type string. Unknown strings map to `Any`
    /// rather than failing — see the "unknown host-type fallback" decision in
    /// `DESIGN.md`.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "float64" => Self::Float64,
            "decimal" => Self::Decimal,
            "bool" => Self::Bool,
            "string" => Self::String,
            "time" => Self::Time,
            "bytes" => Self::Bytes,
            "json" => Self::Json,
            _ => Self::Any,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column descriptor: a reference to a named column on a named table.
///
/// Table/column identity and host type are plain runtime fields rather than
/// associated constants on a generated type, since the IR carries no static
/// typing of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The table this column is qualified by in generated SQL.
    pub table: String,
    /// The column name.
    pub name: String,
    /// The host-language type tag.
    pub host_type: TypeTag,
    /// Whether the column may hold SQL NULL.
    pub nullable: bool,
}

impl Column {
    /// Creates a column descriptor with an unspecified (`Any`) host type and
    /// `nullable = false`. Use [`Column::of_type`] and [`Column::nullable`] to
    /// refine it.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            host_type: TypeTag::Any,
            nullable: false,
        }
    }

    /// Sets the host-type tag.
    #[must_use]
    pub const fn of_type(mut self, host_type: TypeTag) -> Self {
        self.host_type = host_type;
        self
    }

    /// Marks the column nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A table reference in a FROM clause.
///
/// `alias`, when set, overrides `name` as the qualifier used for column
/// rendering and for the `AS` clause in generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableRef {
    /// The table (or CTE) name.
    pub name: String,
    /// An optional alias.
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates an unaliased table reference.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The qualifier to use when rendering columns against this table: the
    /// alias if present, otherwise the table name.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The ordered parameter metadata a compiled query consumes.
///
/// `host_type` is the opaque wire-form string (see [`TypeTag::as_str`]), kept
/// as a plain string here because `ParamInfo` is exchanged with downstream
/// code generation and is not interpreted further by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// The parameter name as referenced by `Expr::Param`.
    pub name: String,
    /// The opaque host-type tag string.
    pub host_type: String,
}

impl ParamInfo {
    /// Creates a new `ParamInfo`.
    #[must_use]
    pub fn new(name: impl Into<String>, host_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            host_type: host_type.as_str().to_string(),
        }
    }
}
