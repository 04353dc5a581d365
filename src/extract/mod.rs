//! Annotation extraction: from host static types to units
//!
//! The extractor is strictly fail-open. A type that is not an annotation
//! wrapper, metadata the host could not shape into an expression, or a name
//! the unit table does not know all yield `None`, and the caller skips the
//! check. Unannotated numeric code must never produce false positives.

pub mod parse;

use crate::types::{Type, Unit, UnitError, UnitTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit expression as written in annotation metadata, e.g. `pq.meter / pq.second`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaExpr {
    /// Dotted name; only the final segment names the unit (`pq.meter` -> `meter`)
    Path(Vec<String>),
    Mul(Box<MetaExpr>, Box<MetaExpr>),
    Div(Box<MetaExpr>, Box<MetaExpr>),
    Pow(Box<MetaExpr>, i64),
    /// Integer literal; pure numbers are dimensionless
    Int(i64),
}

impl MetaExpr {
    pub fn name(name: &str) -> MetaExpr {
        MetaExpr::Path(vec![name.to_string()])
    }

    pub fn path(segments: &[&str]) -> MetaExpr {
        MetaExpr::Path(segments.iter().map(|s| s.to_string()).collect())
    }

    pub fn mul(self, rhs: MetaExpr) -> MetaExpr {
        MetaExpr::Mul(Box::new(self), Box::new(rhs))
    }

    pub fn div(self, rhs: MetaExpr) -> MetaExpr {
        MetaExpr::Div(Box::new(self), Box::new(rhs))
    }

    pub fn pow(self, exponent: i64) -> MetaExpr {
        MetaExpr::Pow(Box::new(self), exponent)
    }
}

impl fmt::Display for MetaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaExpr::Path(segments) => write!(f, "{}", segments.join(".")),
            MetaExpr::Mul(a, b) => write!(f, "{a}*{b}"),
            MetaExpr::Div(a, b) => write!(f, "{a}/{b}"),
            MetaExpr::Pow(a, n) => write!(f, "{a}^{n}"),
            MetaExpr::Int(n) => write!(f, "{n}"),
        }
    }
}

/// Metadata attached to an annotation wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitMeta {
    /// Unit expression as written in source
    Expr(MetaExpr),
    /// Unit already computed by a checker; lets chained calls keep checking
    Resolved(Unit),
    /// Metadata the host recognized as present but could not interpret
    Opaque(String),
}

impl fmt::Display for UnitMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitMeta::Expr(expr) => write!(f, "{expr}"),
            UnitMeta::Resolved(unit) => write!(f, "{unit}"),
            UnitMeta::Opaque(text) => write!(f, "{text}"),
        }
    }
}

/// Locate and evaluate the unit attached to a static type
///
/// Returns `None` when the type carries no resolvable unit information.
pub fn extract_unit(ty: &Type, table: &UnitTable) -> Option<Unit> {
    let Type::Annotated { meta, .. } = ty else {
        return None;
    };
    match meta {
        UnitMeta::Resolved(unit) => Some(unit.clone()),
        UnitMeta::Expr(expr) => eval_meta(expr, table),
        UnitMeta::Opaque(text) => {
            tracing::trace!(meta = %text, "opaque annotation metadata, skipping");
            None
        }
    }
}

/// Interpret a metadata expression against the unit table, failing open
pub fn eval_meta(expr: &MetaExpr, table: &UnitTable) -> Option<Unit> {
    match eval_meta_strict(expr, table) {
        Ok(unit) => Some(unit),
        Err(err) => {
            tracing::trace!(%err, "unresolvable unit metadata, skipping");
            None
        }
    }
}

/// Interpret a metadata expression, naming what failed to resolve
///
/// Backs [`UnitTable::parse`]; annotation extraction goes through the
/// fail-open [`eval_meta`] instead.
pub fn eval_meta_strict(expr: &MetaExpr, table: &UnitTable) -> Result<Unit, UnitError> {
    match expr {
        MetaExpr::Path(segments) => {
            let name = segments
                .last()
                .ok_or_else(|| UnitError::Malformed(expr.to_string()))?;
            table
                .resolve(name)
                .ok_or_else(|| UnitError::UnknownUnit(name.clone()))
        }
        MetaExpr::Mul(a, b) => {
            Ok(eval_meta_strict(a, table)?.multiply(&eval_meta_strict(b, table)?))
        }
        MetaExpr::Div(a, b) => {
            Ok(eval_meta_strict(a, table)?.divide(&eval_meta_strict(b, table)?))
        }
        MetaExpr::Pow(a, n) => Ok(eval_meta_strict(a, table)?.power(*n)),
        MetaExpr::Int(_) => Ok(Unit::dimensionless()),
    }
}
