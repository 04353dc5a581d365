//! Integration tests for call-site checking
//!
//! Drives the full dispatch path the way a host type-checker would: one
//! `check_call` per call expression, a `Reporter` per file, analysis always
//! continuing past diagnostics.

use pretty_assertions::assert_eq;
use quantcheck::common::Span;
use quantcheck::diagnostics::{Reporter, SourceFile, UnitDiagnostic};
use quantcheck::types::units::si;
use quantcheck::{QuantityPlugin, Type};

fn reporter() -> Reporter {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Reporter::new(SourceFile::new(
        "example.py",
        "x + y\nd = x / t\nv * t\nx < y\n",
    ))
}

fn meters(payload: Type) -> Type {
    Type::with_unit(payload, si::meter())
}

fn seconds(payload: Type) -> Type {
    Type::with_unit(payload, si::second())
}

// ==================== Additive Tests ====================

#[test]
fn test_adding_meters_to_seconds_is_reported() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Int), seconds(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__add__",
        &args,
        Type::Int,
        Span::new(0, 5),
        &mut reporter,
    );

    assert_eq!(result, Type::Error);
    assert_eq!(reporter.error_count(), 1);
    assert!(matches!(
        reporter.errors()[0],
        UnitDiagnostic::IncompatibleAdd { .. }
    ));
}

#[test]
fn test_analysis_continues_after_a_mismatch() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let bad = [meters(Type::Int), seconds(Type::Int)];
    plugin.check_call(
        "builtins.int.__add__",
        &bad,
        Type::Int,
        Span::new(0, 5),
        &mut reporter,
    );

    // a later, well-unitted call site still checks normally
    let good = [meters(Type::Int), meters(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__add__",
        &good,
        Type::Int,
        Span::new(6, 11),
        &mut reporter,
    );

    assert_eq!(result, meters(Type::Int));
    assert_eq!(reporter.error_count(), 1);
}

#[test]
fn test_adding_equal_units_keeps_the_unit() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Int), meters(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__add__",
        &args,
        Type::Int,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, meters(Type::Int));
    assert!(!reporter.has_errors());
}

#[test]
fn test_meter_plus_centimeter_needs_explicit_conversion() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let cm = Type::with_unit(
        Type::Int,
        plugin.units().resolve("cm").expect("cm is defined"),
    );
    let args = [meters(Type::Int), cm.clone()];
    let result = plugin.check_call(
        "builtins.int.__add__",
        &args,
        Type::Int,
        Span::dummy(),
        &mut reporter,
    );

    // no implicit rescale, even though both are lengths
    assert_eq!(result, Type::Error);
    assert!(reporter.has_errors());

    // the documented fix: multiply by a value annotated m/cm, then add
    let mut reporter = self::reporter();
    let m_per_cm = Type::with_unit(
        Type::Float,
        si::meter().divide(&plugin.units().resolve("cm").unwrap()),
    );
    let scaled = plugin.check_call(
        "builtins.int.__mul__",
        &[cm, m_per_cm],
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );
    assert_eq!(scaled, meters(Type::Float));

    let result = plugin.check_call(
        "builtins.float.__add__",
        &[meters(Type::Int), scaled],
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );
    assert_eq!(result, meters(Type::Float));
    assert!(!reporter.has_errors());
}

// ==================== Fail-Open Tests ====================

#[test]
fn test_plain_operand_passes_through() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [Type::Int, meters(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__add__",
        &args,
        Type::Int,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, Type::Int);
    assert!(!reporter.has_errors());
}

#[test]
fn test_unregistered_callee_keeps_default_type() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    assert!(plugin.get_function_hook("builtins.len").is_none());

    let args = [meters(Type::Int)];
    let result = plugin.check_call(
        "builtins.len",
        &args,
        Type::Int,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, Type::Int);
    assert!(!reporter.has_errors());
}

// ==================== Multiplicative Tests ====================

#[test]
fn test_multiplication_cancels_dimensions() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    // velocity * time = distance
    let velocity = Type::with_unit(Type::Float, si::meter().divide(&si::second()));
    let args = [velocity, seconds(Type::Float)];
    let result = plugin.check_call(
        "builtins.float.__mul__",
        &args,
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, meters(Type::Float));
    assert!(!reporter.has_errors());
}

#[test]
fn test_division_computes_quotient_unit() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Float), seconds(Type::Float)];
    let result = plugin.check_call(
        "builtins.float.__truediv__",
        &args,
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );

    let velocity = Type::with_unit(Type::Float, si::meter().divide(&si::second()));
    assert_eq!(result, velocity);
}

#[test]
fn test_full_cancellation_drops_the_annotation() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Float), meters(Type::Float)];
    let result = plugin.check_call(
        "builtins.float.__truediv__",
        &args,
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );

    // m / m is a pure number
    assert_eq!(result, Type::Float);
}

#[test]
fn test_chained_result_feeds_the_next_check() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    // (m/s * s) + m : the multiplicative result participates in the addition
    let velocity = Type::with_unit(Type::Float, si::meter().divide(&si::second()));
    let distance = plugin.check_call(
        "builtins.float.__mul__",
        &[velocity, seconds(Type::Float)],
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );

    let result = plugin.check_call(
        "builtins.float.__add__",
        &[distance, meters(Type::Float)],
        Type::Float,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, meters(Type::Float));
    assert!(!reporter.has_errors());
}

// ==================== Comparison Tests ====================

#[test]
fn test_comparing_mismatched_units_is_reported_but_stays_bool() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Int), seconds(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__lt__",
        &args,
        Type::Bool,
        Span::new(18, 23),
        &mut reporter,
    );

    assert_eq!(result, Type::Bool);
    assert_eq!(reporter.error_count(), 1);
    assert!(matches!(
        reporter.errors()[0],
        UnitDiagnostic::IncompatibleCompare { .. }
    ));
}

#[test]
fn test_comparing_equal_units_is_silent() {
    let plugin = QuantityPlugin::new();
    let mut reporter = reporter();

    let args = [meters(Type::Int), meters(Type::Int)];
    let result = plugin.check_call(
        "builtins.int.__ge__",
        &args,
        Type::Bool,
        Span::dummy(),
        &mut reporter,
    );

    assert_eq!(result, Type::Bool);
    assert!(!reporter.has_errors());
}
