//! Static-type and unit machinery
//!
//! This module implements the two value domains the checker moves between:
//! - Host static types, including the generic annotation wrapper
//! - Physical units as normalized exponent maps, with their algebra

pub mod core;
pub mod units;

pub use self::core::Type;
pub use units::{BaseUnit, Rational, Unit, UnitAlgebra, UnitError, UnitTable, medical, si};
