//! Function-call checking: the hook invoked once per analyzed call site
//!
//! Per call the path is: registry lookup (miss -> default type unchanged),
//! operand unit extraction (any missing unit -> unit-agnostic pass-through),
//! rule application (additive requires identical units, multiplicative
//! computes the product or quotient unit), and the outcome (annotated result
//! type, or a diagnostic plus a recovery type). There is no fatal state: a
//! bad expression never halts the analysis run.

use crate::common::Span;
use crate::diagnostics::{Reporter, Severity, UnitDiagnostic};
use crate::extract;
use crate::registry::Registry;
use crate::types::{Type, Unit, UnitTable};
use miette::NamedSource;

/// Everything a checker may inspect about one call expression
pub struct FunctionContext<'a> {
    /// Fully-qualified name of the callee, e.g. `builtins.int.__add__`
    pub callee: &'a str,
    /// Static types of the operands, in call order (receiver first)
    pub arg_types: &'a [Type],
    /// Return type the host inferred before unit checking
    pub default_return_type: Type,
    /// Call-site location
    pub span: Span,
    /// Named units visible to annotations
    pub units: &'a UnitTable,
    reporter: &'a mut Reporter,
}

impl<'a> FunctionContext<'a> {
    pub fn new(
        callee: &'a str,
        arg_types: &'a [Type],
        default_return_type: Type,
        span: Span,
        units: &'a UnitTable,
        reporter: &'a mut Reporter,
    ) -> Self {
        Self {
            callee,
            arg_types,
            default_return_type,
            span,
            units,
            reporter,
        }
    }

    /// Emit a diagnostic through the host's reporting channel
    pub fn report(&mut self, severity: Severity, diagnostic: UnitDiagnostic) {
        self.reporter.report(severity, diagnostic);
    }

    pub fn error(&mut self, diagnostic: UnitDiagnostic) {
        self.reporter.error(diagnostic);
    }

    pub fn note(&mut self, diagnostic: UnitDiagnostic) {
        self.reporter.note(diagnostic);
    }

    /// Source attachment for diagnostics at this call site
    pub fn named_source(&self) -> NamedSource<String> {
        self.reporter.named_source()
    }
}

/// Resolve and run the checker for `ctx.callee`, if any
///
/// A registry miss leaves the host's default return type unchanged.
pub fn dispatch(registry: &Registry, ctx: &mut FunctionContext) -> Type {
    match registry.lookup(ctx.callee) {
        Some(checker) => {
            tracing::debug!(callee = ctx.callee, "dispatching unit checker");
            checker(ctx)
        }
        None => {
            tracing::trace!(callee = ctx.callee, "no checker registered");
            ctx.default_return_type.clone()
        }
    }
}

/// Units of both operands of a binary call, or None for unit-agnostic calls
fn binary_units(ctx: &FunctionContext) -> Option<(Unit, Unit)> {
    if ctx.arg_types.len() != 2 {
        return None;
    }
    let left = extract::extract_unit(&ctx.arg_types[0], ctx.units)?;
    let right = extract::extract_unit(&ctx.arg_types[1], ctx.units)?;
    Some((left, right))
}

/// Additive operators: both operands must carry identical units
///
/// The result keeps the shared unit, so chains like `(a + b) + c` stay
/// checked. `m + cm` is rejected; the fix is an explicit conversion factor
/// (a value annotated `m/cm`), never an implicit rescale.
pub fn check_additive(ctx: &mut FunctionContext) -> Type {
    let Some((left, right)) = binary_units(ctx) else {
        return ctx.default_return_type.clone();
    };
    if left.compatible_for_addition(&right) {
        tracing::trace!(unit = %left, "additive operands agree");
        return Type::with_unit(ctx.default_return_type.payload().clone(), left);
    }
    let diagnostic = UnitDiagnostic::IncompatibleAdd {
        left: left.to_string(),
        right: right.to_string(),
        span: ctx.span.into(),
        src: ctx.named_source(),
    };
    ctx.error(diagnostic);
    Type::Error
}

/// Comparison operators: operands must carry identical units
///
/// The comparison's own type (bool) is kept even on mismatch; only the
/// diagnostic marks the error.
pub fn check_comparison(ctx: &mut FunctionContext) -> Type {
    let Some((left, right)) = binary_units(ctx) else {
        return ctx.default_return_type.clone();
    };
    if !left.compatible_for_addition(&right) {
        let diagnostic = UnitDiagnostic::IncompatibleCompare {
            left: left.to_string(),
            right: right.to_string(),
            span: ctx.span.into(),
            src: ctx.named_source(),
        };
        ctx.error(diagnostic);
    }
    ctx.default_return_type.clone()
}

fn is_division(callee: &str) -> bool {
    callee.ends_with("__truediv__")
        || callee.ends_with("__floordiv__")
        || callee.ends_with("__div__")
}

/// Multiplicative operators: the result unit is the product or quotient
///
/// Cancellation to a dimensionless result drops the annotation entirely; the
/// value is a pure number from then on.
pub fn check_multiplicative(ctx: &mut FunctionContext) -> Type {
    let Some((left, right)) = binary_units(ctx) else {
        return ctx.default_return_type.clone();
    };
    let unit = if is_division(ctx.callee) {
        left.divide(&right)
    } else {
        left.multiply(&right)
    };
    tracing::trace!(%unit, "multiplicative result unit");
    let payload = ctx.default_return_type.payload().clone();
    if unit.is_dimensionless() {
        payload
    } else {
        Type::with_unit(payload, unit)
    }
}

/// Wire the numeric operator families of the host's builtins
pub fn register_builtin_checkers(registry: &mut Registry) {
    const ADDITIVE: &[&str] = &["__add__", "__radd__", "__sub__", "__rsub__"];
    const COMPARISON: &[&str] = &["__eq__", "__ne__", "__lt__", "__le__", "__gt__", "__ge__"];
    const MULTIPLICATIVE: &[&str] = &["__mul__", "__rmul__", "__truediv__", "__rtruediv__"];

    for ty in ["int", "float"] {
        for op in ADDITIVE {
            registry.register(&format!("builtins.{ty}.{op}"), &[], check_additive);
        }
        for op in COMPARISON {
            registry.register(&format!("builtins.{ty}.{op}"), &[], check_comparison);
        }
        for op in MULTIPLICATIVE {
            registry.register(&format!("builtins.{ty}.{op}"), &[], check_multiplicative);
        }
    }
}
