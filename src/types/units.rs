//! Unit algebra over named base units
//!
//! A [`Unit`] is a normalized mapping from base-unit symbol to a signed
//! rational exponent. Multiplication adds exponents, division subtracts them,
//! and zero exponents are dropped eagerly so equality is plain structural
//! comparison. Scale factors live in the [`UnitTable`], not in the unit
//! itself: `cm` and `m` are distinct symbols, so `m/cm` is a real conversion
//! unit and addition across them is rejected until an explicit factor appears.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Errors from unit construction and table lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),
    #[error("malformed unit expression `{0}`")]
    Malformed(String),
    #[error("zeroth root of a unit is undefined")]
    ZeroRoot,
    #[error("rational exponent denominator must be nonzero")]
    ZeroDenominator,
}

/// Exact signed rational, always reduced with a positive denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    num: i64,
    den: i64,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    pub fn int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn new(num: i64, den: i64) -> Result<Self, UnitError> {
        if den == 0 {
            return Err(UnitError::ZeroDenominator);
        }
        Ok(Self::reduced(num, den))
    }

    /// Invariant: `den != 0`
    fn reduced(mut num: i64, mut den: i64) -> Self {
        if den < 0 {
            num = -num;
            den = -den;
        }
        let g = gcd(num, den);
        if g > 1 {
            num /= g;
            den /= g;
        }
        if num == 0 {
            den = 1;
        }
        Self { num, den }
    }

    pub fn numer(&self) -> i64 {
        self.num
    }

    pub fn denom(&self) -> i64 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Multiply by an integer (used for unit powers)
    pub fn scale(self, n: i64) -> Self {
        Self::reduced(self.num * n, self.den)
    }

    /// Divide by a nonzero integer (used for unit roots)
    fn div_int(self, n: i64) -> Self {
        Self::reduced(self.num, self.den * n)
    }

    /// Approximate value, for scale-factor arithmetic only
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        Rational::reduced(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Required operations of a unit representation
///
/// One concrete implementation exists ([`Unit`]); the trait is the seam for
/// alternative engines (e.g. a fixed-dimension vector for a closed unit set).
pub trait UnitAlgebra: Sized {
    fn multiply(&self, other: &Self) -> Self;
    fn divide(&self, other: &Self) -> Self;
    fn equal(&self, other: &Self) -> bool;
}

/// A physical dimension as exponents over base-unit symbols
///
/// Immutable; every operation returns a fresh normalized unit. The empty
/// mapping is dimensionless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Unit {
    exponents: BTreeMap<String, Rational>,
}

impl Unit {
    /// The unit of pure numbers
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single base unit with exponent 1
    pub fn base(symbol: &str) -> Self {
        let mut exponents = BTreeMap::new();
        exponents.insert(symbol.to_string(), Rational::ONE);
        Self { exponents }
    }

    /// Build from symbol/exponent pairs; duplicate symbols sum, and zero
    /// exponents are dropped
    pub fn from_exponents<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Rational)>,
        S: Into<String>,
    {
        let mut exponents: BTreeMap<String, Rational> = BTreeMap::new();
        for (symbol, exp) in pairs {
            let entry = exponents.entry(symbol.into()).or_insert(Rational::ZERO);
            *entry = *entry + exp;
        }
        exponents.retain(|_, e| !e.is_zero());
        Self { exponents }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Exponent of `symbol`, zero if absent
    pub fn exponent(&self, symbol: &str) -> Rational {
        self.exponents
            .get(symbol)
            .copied()
            .unwrap_or(Rational::ZERO)
    }

    pub fn exponents(&self) -> impl Iterator<Item = (&str, Rational)> {
        self.exponents.iter().map(|(s, e)| (s.as_str(), *e))
    }

    /// Entry-wise combination of two exponent maps, dropping zero results
    fn combine(&self, other: &Unit, f: impl Fn(Rational, Rational) -> Rational) -> Unit {
        let mut exponents = self.exponents.clone();
        for (symbol, exp) in &other.exponents {
            let combined = f(self.exponent(symbol), *exp);
            if combined.is_zero() {
                exponents.remove(symbol);
            } else {
                exponents.insert(symbol.clone(), combined);
            }
        }
        Unit { exponents }
    }

    pub fn multiply(&self, other: &Unit) -> Unit {
        self.combine(other, |a, b| a + b)
    }

    pub fn divide(&self, other: &Unit) -> Unit {
        self.combine(other, |a, b| a - b)
    }

    /// Negate all exponents
    pub fn invert(&self) -> Unit {
        Unit {
            exponents: self
                .exponents
                .iter()
                .map(|(s, e)| (s.clone(), -*e))
                .collect(),
        }
    }

    /// Raise to an integer power; `power(0)` is dimensionless
    pub fn power(&self, n: i64) -> Unit {
        if n == 0 {
            return Unit::dimensionless();
        }
        Unit {
            exponents: self
                .exponents
                .iter()
                .map(|(s, e)| (s.clone(), e.scale(n)))
                .collect(),
        }
    }

    /// Take the nth root, producing rational exponents (e.g. sqrt of area)
    pub fn nth_root(&self, n: i64) -> Result<Unit, UnitError> {
        if n == 0 {
            return Err(UnitError::ZeroRoot);
        }
        Ok(Unit {
            exponents: self
                .exponents
                .iter()
                .map(|(s, e)| (s.clone(), e.div_int(n)))
                .collect(),
        })
    }

    /// Addition and subtraction require identical units; `cm + m` is rejected
    /// even though both are lengths
    pub fn compatible_for_addition(&self, other: &Unit) -> bool {
        self == other
    }

    /// Human-readable rendering, e.g. `kg m/s^2`
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl UnitAlgebra for Unit {
    fn multiply(&self, other: &Self) -> Self {
        Unit::multiply(self, other)
    }

    fn divide(&self, other: &Self) -> Self {
        Unit::divide(self, other)
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }
}

fn write_term(out: &mut String, symbol: &str, exp: Rational) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(symbol);
    if exp != Rational::ONE {
        if exp.is_integer() {
            out.push_str(&format!("^{exp}"));
        } else {
            out.push_str(&format!("^({exp})"));
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponents.is_empty() {
            return write!(f, "1");
        }
        let mut num = String::new();
        let mut den = String::new();
        for (symbol, exp) in &self.exponents {
            if exp.numer() > 0 {
                write_term(&mut num, symbol, *exp);
            } else {
                write_term(&mut den, symbol, -*exp);
            }
        }
        if num.is_empty() {
            num.push('1');
        }
        if den.is_empty() {
            write!(f, "{num}")
        } else {
            write!(f, "{num}/{den}")
        }
    }
}

/// One named base unit: its physical dimension and the factor to that
/// dimension's reference unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseUnit {
    pub symbol: String,
    pub dimension: String,
    pub scale: f64,
}

/// Registry of known base units and their spelled-out names
///
/// Built once at plugin initialization, read-only afterwards. Resolution is
/// how annotation metadata names (`meter`, `mL`, `hr`) become [`Unit`]s;
/// dimensions and scales support compatibility queries and conversion
/// factors, never implicit conversion.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    bases: FxHashMap<String, BaseUnit>,
    names: FxHashMap<String, String>,
}

impl UnitTable {
    /// Empty table; units must be defined before they resolve
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the SI and medical units of [`si`] and
    /// [`medical`]
    pub fn with_defaults() -> Self {
        let mut table = Self::new();

        // Length
        table.define("m", "length", 1.0, &["meter", "metre"]);
        table.define("cm", "length", 1e-2, &["centimeter", "centimetre"]);
        table.define("mm", "length", 1e-3, &["millimeter", "millimetre"]);
        table.define("km", "length", 1e3, &["kilometer", "kilometre"]);

        // Mass
        table.define("kg", "mass", 1.0, &["kilogram"]);
        table.define("g", "mass", 1e-3, &["gram"]);
        table.define("mg", "mass", 1e-6, &["milligram"]);
        table.define("ug", "mass", 1e-9, &["mcg", "microgram"]);

        // Time
        table.define("s", "time", 1.0, &["second", "sec"]);
        table.define("ms", "time", 1e-3, &["millisecond"]);
        table.define("min", "time", 60.0, &["minute"]);
        table.define("h", "time", 3600.0, &["hr", "hour"]);

        // Volume
        table.define("L", "volume", 1.0, &["l", "liter", "litre"]);
        table.define("mL", "volume", 1e-3, &["ml", "milliliter", "millilitre"]);

        // Substance and temperature
        table.define("mol", "substance", 1.0, &["mole"]);
        table.define("K", "temperature", 1.0, &["kelvin"]);

        table
    }

    /// Register a base unit under its symbol and any aliases; last wins
    pub fn define(&mut self, symbol: &str, dimension: &str, scale: f64, aliases: &[&str]) {
        self.bases.insert(
            symbol.to_string(),
            BaseUnit {
                symbol: symbol.to_string(),
                dimension: dimension.to_string(),
                scale,
            },
        );
        self.names.insert(symbol.to_string(), symbol.to_string());
        for alias in aliases {
            self.names.insert(alias.to_string(), symbol.to_string());
        }
    }

    /// Resolve a spelled-out name or alias to its base unit
    pub fn resolve(&self, name: &str) -> Option<Unit> {
        self.names.get(name).map(|symbol| Unit::base(symbol))
    }

    /// Strict counterpart to annotation extraction: resolve a textual unit
    /// expression like `mg/mL`, failing loudly instead of open
    ///
    /// Annotation checking must stay silent on unknown metadata; this path is
    /// for hosts validating configured or user-supplied unit names, where
    /// silence would hide a typo.
    pub fn parse(&self, source: &str) -> Result<Unit, UnitError> {
        let expr = crate::extract::parse::parse_meta(source)
            .ok_or_else(|| UnitError::Malformed(source.to_string()))?;
        crate::extract::eval_meta_strict(&expr, self)
    }

    pub fn base_unit(&self, symbol: &str) -> Option<&BaseUnit> {
        self.bases.get(symbol)
    }

    /// Aggregate a unit's exponents per physical dimension; None if any
    /// symbol is not in the table
    fn dimension_vector(&self, unit: &Unit) -> Option<BTreeMap<String, Rational>> {
        let mut dims: BTreeMap<String, Rational> = BTreeMap::new();
        for (symbol, exp) in unit.exponents() {
            let base = self.bases.get(symbol)?;
            let entry = dims.entry(base.dimension.clone()).or_insert(Rational::ZERO);
            *entry = *entry + exp;
        }
        dims.retain(|_, e| !e.is_zero());
        Some(dims)
    }

    /// Same physical dimensions, possibly different scales (`h` vs `min`)
    pub fn is_compatible(&self, a: &Unit, b: &Unit) -> bool {
        match (self.dimension_vector(a), self.dimension_vector(b)) {
            (Some(da), Some(db)) => da == db,
            _ => false,
        }
    }

    /// Multiplicative factor turning one `a` into `b`-many units, defined
    /// only for compatible units: `conversion_factor(h, min) == 60`
    pub fn conversion_factor(&self, a: &Unit, b: &Unit) -> Option<f64> {
        if !self.is_compatible(a, b) {
            return None;
        }
        Some(self.si_scale(a)? / self.si_scale(b)?)
    }

    fn si_scale(&self, unit: &Unit) -> Option<f64> {
        let mut scale = 1.0;
        for (symbol, exp) in unit.exponents() {
            let base = self.bases.get(symbol)?;
            scale *= base.scale.powf(exp.to_f64());
        }
        Some(scale)
    }
}

/// Ready-made SI base units
pub mod si {
    use super::Unit;

    pub fn meter() -> Unit {
        Unit::base("m")
    }

    pub fn second() -> Unit {
        Unit::base("s")
    }

    pub fn kilogram() -> Unit {
        Unit::base("kg")
    }

    pub fn kelvin() -> Unit {
        Unit::base("K")
    }

    pub fn mole() -> Unit {
        Unit::base("mol")
    }
}

/// Units common in dosage and concentration expressions
pub mod medical {
    use super::Unit;

    pub fn milligram() -> Unit {
        Unit::base("mg")
    }

    pub fn microgram() -> Unit {
        Unit::base("ug")
    }

    pub fn milliliter() -> Unit {
        Unit::base("mL")
    }

    pub fn hour() -> Unit {
        Unit::base("h")
    }

    pub fn minute() -> Unit {
        Unit::base("min")
    }
}
