//! Integration tests for annotation extraction
//!
//! Tests for:
//! - Metadata evaluation and the expression -> Unit round trip
//! - Textual unit-expression parsing
//! - Fail-open behavior on anything unresolvable

use pretty_assertions::assert_eq;
use quantcheck::extract::parse::parse_meta;
use quantcheck::extract::{MetaExpr, UnitMeta, eval_meta, extract_unit};
use quantcheck::types::units::si;
use quantcheck::types::{Type, Unit, UnitTable};

// ==================== Round-Trip Tests ====================

#[test]
fn test_round_trip_simple_unit() {
    let table = UnitTable::with_defaults();
    let ty = Type::annotated(Type::Int, UnitMeta::Expr(MetaExpr::path(&["pq", "meter"])));

    assert_eq!(extract_unit(&ty, &table), Some(si::meter()));
}

#[test]
fn test_round_trip_compound_unit() {
    let table = UnitTable::with_defaults();
    let expr = MetaExpr::path(&["pq", "meter"]).div(MetaExpr::path(&["pq", "second"]));
    let ty = Type::annotated(Type::Float, UnitMeta::Expr(expr));

    let direct = si::meter().divide(&si::second());
    assert_eq!(extract_unit(&ty, &table), Some(direct));
}

#[test]
fn test_round_trip_through_text() {
    let table = UnitTable::with_defaults();
    let expr = parse_meta("pq.meter / pq.second").expect("parses");
    let ty = Type::annotated(Type::Float, UnitMeta::Expr(expr));

    assert_eq!(
        extract_unit(&ty, &table),
        Some(si::meter().divide(&si::second()))
    );
}

#[test]
fn test_resolved_metadata_survives_unchanged() {
    let table = UnitTable::with_defaults();
    let unit = si::meter().power(2);
    let ty = Type::with_unit(Type::Float, unit.clone());

    assert_eq!(extract_unit(&ty, &table), Some(unit));
}

// ==================== Expression Evaluation Tests ====================

#[test]
fn test_power_and_literal_evaluation() {
    let table = UnitTable::with_defaults();

    let accel = MetaExpr::name("m").div(MetaExpr::name("s").pow(2));
    let expected = si::meter().divide(&si::second().power(2));
    assert_eq!(eval_meta(&accel, &table), Some(expected));

    // integer literals are dimensionless: 1/s is a frequency
    let hz = MetaExpr::Int(1).div(MetaExpr::name("s"));
    assert_eq!(eval_meta(&hz, &table), Some(si::second().invert()));
}

#[test]
fn test_cancellation_in_metadata() {
    let table = UnitTable::with_defaults();
    let expr = MetaExpr::name("m")
        .mul(MetaExpr::name("s"))
        .div(MetaExpr::name("m").mul(MetaExpr::name("s")));
    assert_eq!(eval_meta(&expr, &table), Some(Unit::dimensionless()));
}

// ==================== Fail-Open Tests ====================

#[test]
fn test_unannotated_types_have_no_unit() {
    let table = UnitTable::with_defaults();
    assert_eq!(extract_unit(&Type::Int, &table), None);
    assert_eq!(extract_unit(&Type::Float, &table), None);
    assert_eq!(extract_unit(&Type::Unknown, &table), None);
    assert_eq!(extract_unit(&Type::Error, &table), None);
}

#[test]
fn test_unknown_unit_name_fails_open() {
    let table = UnitTable::with_defaults();
    let ty = Type::annotated(Type::Int, UnitMeta::Expr(MetaExpr::name("cubit")));
    assert_eq!(extract_unit(&ty, &table), None);

    // one bad leaf poisons the whole expression, silently
    let expr = MetaExpr::name("m").mul(MetaExpr::name("cubit"));
    let ty = Type::annotated(Type::Int, UnitMeta::Expr(expr));
    assert_eq!(extract_unit(&ty, &table), None);
}

#[test]
fn test_opaque_metadata_fails_open() {
    let table = UnitTable::with_defaults();
    let ty = Type::annotated(Type::Int, UnitMeta::Opaque("a docstring".into()));
    assert_eq!(extract_unit(&ty, &table), None);
}

// ==================== Textual Parsing Tests ====================

#[test]
fn test_parse_forms() {
    assert_eq!(parse_meta("meter"), Some(MetaExpr::name("meter")));
    assert_eq!(
        parse_meta("pq.meter"),
        Some(MetaExpr::path(&["pq", "meter"]))
    );
    assert_eq!(parse_meta("m^2"), Some(MetaExpr::name("m").pow(2)));
    assert_eq!(parse_meta("m**2"), Some(MetaExpr::name("m").pow(2)));
    assert_eq!(parse_meta("s^-1"), Some(MetaExpr::name("s").pow(-1)));
}

#[test]
fn test_parse_respects_precedence() {
    // a / b * c groups left to right
    let expected = MetaExpr::name("a")
        .div(MetaExpr::name("b"))
        .mul(MetaExpr::name("c"));
    assert_eq!(parse_meta("a / b * c"), Some(expected));

    // power binds tighter than division
    let expected = MetaExpr::name("m").div(MetaExpr::name("s").pow(2));
    assert_eq!(parse_meta("m / s^2"), Some(expected));
}

#[test]
fn test_malformed_text_fails_open() {
    assert_eq!(parse_meta(""), None);
    assert_eq!(parse_meta("3 +"), None);
    assert_eq!(parse_meta("m /"), None);
    assert_eq!(parse_meta("(m * s"), None);
    assert_eq!(parse_meta("m ^ s"), None);
    assert_eq!(parse_meta("£"), None);
}
