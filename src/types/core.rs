//! Host-side static type representation
//!
//! A deliberately small model of what the host type-checker hands the hook:
//! numeric primitives, the generic annotation wrapper carrying unit metadata,
//! and the recovery types. The extractor reads these; nothing mutates them.

use crate::extract::UnitMeta;
use crate::types::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of a variable or expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int,
    Float,
    Str,

    /// Generic annotation wrapper: a payload type plus arbitrary metadata.
    /// The runtime representation is the payload alone; the metadata exists
    /// only for analysis.
    Annotated { payload: Box<Type>, meta: UnitMeta },

    /// No static information available
    Unknown,
    /// Error type (for recovery; analysis continues)
    Error,
}

impl Type {
    /// Wrap `payload` with annotation metadata
    pub fn annotated(payload: Type, meta: UnitMeta) -> Type {
        Type::Annotated {
            payload: Box::new(payload),
            meta,
        }
    }

    /// Wrap `payload` with an already-computed unit, as checkers do for
    /// their result types
    pub fn with_unit(payload: Type, unit: Unit) -> Type {
        Type::annotated(payload, UnitMeta::Resolved(unit))
    }

    /// The type ignoring any annotation wrapper
    pub fn payload(&self) -> &Type {
        match self {
            Type::Annotated { payload, .. } => payload.payload(),
            other => other,
        }
    }

    /// Check if this type is numeric (through annotations)
    pub fn is_numeric(&self) -> bool {
        matches!(self.payload(), Type::Int | Type::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "str"),
            Type::Annotated { payload, meta } => write!(f, "Annotated[{payload}, {meta}]"),
            Type::Unknown => write!(f, "<unknown>"),
            Type::Error => write!(f, "<error>"),
        }
    }
}
