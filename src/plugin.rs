//! Plugin entry point: what the host type-checker loads and wires in
//!
//! The host resolves [`plugin`] from its configuration, calls it with its own
//! version string, and drives analysis through the returned
//! [`QuantityPlugin`]: `get_function_hook` once per distinct callable name
//! (the host caches the result), then the returned checker for every call
//! site with that name.

use crate::check::{self, FunctionContext};
use crate::common::Span;
use crate::diagnostics::Reporter;
use crate::registry::{CheckerFn, Registry};
use crate::types::{Type, UnitTable};

/// Oldest host version the hook protocol is known to work with
pub const MIN_HOST_VERSION: &str = "1.0";

/// Check operations on annotated numeric types
///
/// Owns the checker registry and the unit table; both are built here, during
/// the host's single-threaded plugin-load phase, and read-only afterwards.
/// Independent instances are fully isolated, so tests may build as many as
/// they like.
#[derive(Debug, Clone)]
pub struct QuantityPlugin {
    registry: Registry,
    units: UnitTable,
}

impl QuantityPlugin {
    /// Plugin with the builtin operator checkers and the default unit table
    pub fn new() -> Self {
        Self::with_units(UnitTable::with_defaults())
    }

    /// Plugin with a caller-provided unit table (e.g. a domain-specific set)
    pub fn with_units(units: UnitTable) -> Self {
        let mut registry = Registry::new();
        check::register_builtin_checkers(&mut registry);
        Self { registry, units }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access, for hosts adding domain checkers before
    /// analysis starts
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    /// The host's hook-lookup protocol: called once per distinct callable
    /// name; `None` means no unit checking for that callable
    pub fn get_function_hook(&self, fullname: &str) -> Option<CheckerFn> {
        self.registry.lookup(fullname)
    }

    /// Full dispatch path for one call site: lookup, extraction, rule
    /// application, outcome
    pub fn check_call(
        &self,
        callee: &str,
        arg_types: &[Type],
        default_return_type: Type,
        span: Span,
        reporter: &mut Reporter,
    ) -> Type {
        let mut ctx = FunctionContext::new(
            callee,
            arg_types,
            default_return_type,
            span,
            &self.units,
            reporter,
        );
        check::dispatch(&self.registry, &mut ctx)
    }
}

impl Default for QuantityPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point the host resolves from its configuration
pub fn plugin(host_version: &str) -> QuantityPlugin {
    if version_before(host_version, MIN_HOST_VERSION) {
        tracing::warn!(
            host_version,
            min = MIN_HOST_VERSION,
            "host older than the oldest tested version; hook protocol may differ"
        );
    } else {
        tracing::debug!(host_version, "quantcheck plugin loaded");
    }
    QuantityPlugin::new()
}

/// Compare dotted numeric version prefixes; non-numeric tails are ignored
fn version_before(version: &str, reference: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map_while(|part| part.parse::<u64>().ok())
            .collect()
    };
    parse(version) < parse(reference)
}
