//! Registry construction for the knowledge artifact model

use crate::kind::Kind;
use hed_binder::{BinderOptions, TypeRegistry};
use hed_diagnostics::Result;
use std::sync::LazyLock;

static DEFAULT_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(|| {
    build_registry(BinderOptions::default())
        .unwrap_or_else(|err| panic!("built-in knowledge artifact schema is invalid: {err}"))
});

/// Register every [`Kind`] into `registry`, nested types first
pub fn register_all(registry: &mut TypeRegistry) -> Result<()> {
    for kind in Kind::ALL {
        registry.register(kind.class())?;
    }
    log::debug!("Registered {} knowledge artifact classes", Kind::ALL.len());
    Ok(())
}

/// Build a registry holding the full model under custom binder options
pub fn build_registry(options: BinderOptions) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new(options)?;
    register_all(&mut registry)?;
    Ok(registry)
}

/// Shared registry built with default options
pub fn default_registry() -> &'static TypeRegistry {
    &DEFAULT_REGISTRY
}
