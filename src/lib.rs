//! quantcheck: dimensional analysis for annotated static types
//!
//! Most libraries handle physical quantities as runtime objects. This crate
//! instead moves the units into type annotations: values stay purely numeric
//! at runtime while a host type-checker, through the plugin in this crate,
//! carries out the dimensional analysis during its analysis pass.
//!
//! ```python
//! x: Annotated[int, pq.meter] = 3
//! y: Annotated[int, pq.cm] = 4
//! x + y                  # error reported at analysis time
//! cm_to_m: Annotated[float, pq.m / pq.cm] = 0.01
//! x + y * cm_to_m        # ok: cm cancels, both sides are meters
//! ```
//!
//! # Architecture
//!
//! ```text
//! host call site → plugin hook lookup → registry → checker
//!                                                   │
//!                          annotation extractor ←───┤
//!                          unit algebra         ←───┤
//!                          diagnostics          ←───┘
//! ```
//!
//! Checking fails open: a value without resolvable unit metadata is simply
//! not checked. It fails closed on addition: `m + cm` needs an explicit
//! conversion factor, never an implicit rescale.

pub mod check;
pub mod common;
pub mod diagnostics;
pub mod extract;
pub mod plugin;
pub mod registry;
pub mod types;

// Re-export diagnostics for convenience
pub use diagnostics::{Reporter, Severity, SourceFile, UnitDiagnostic};

// Re-exports for convenience
pub use check::FunctionContext;
pub use plugin::{QuantityPlugin, plugin};
pub use registry::{CheckerFn, Registry};
pub use types::{Type, Unit, UnitTable};

/// Plugin version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
