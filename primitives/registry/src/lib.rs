#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Converter Registry: the process-wide memo of model and union converters.
//!
//! Generated models describe their schema once; this crate builds that schema
//! on first use and hands out `'static` references afterwards. Entries are
//! keyed by type identity and never removed.
//!
//! Building happens outside the lock and insertion keeps the first entry, so
//! concurrent first use is safe without further coordination: building is
//! idempotent and side-effect free.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::{OnceLock, PoisonError, RwLock};

use schema::{Converter, Model, ModelRef, ModelSchema};

#[derive(Clone, Copy)]
struct ModelEntry {
    schema: &'static ModelSchema,
    converter: &'static Converter,
}

/// A registry of memoized converters.
///
/// Use [`ConverterRegistry::global`]; the free functions of this crate are
/// shorthands for it.
#[derive(Default)]
pub struct ConverterRegistry {
    /// Model schemas and converters by model type
    models: RwLock<HashMap<TypeId, ModelEntry>>,
    /// Model schemas by model name
    names: RwLock<BTreeMap<&'static str, &'static ModelSchema>>,
    /// Non-model converters (unions) by owning type
    converters: RwLock<HashMap<TypeId, &'static Converter>>,
}

impl ConverterRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static ConverterRegistry {
        static GLOBAL: OnceLock<ConverterRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ConverterRegistry::default)
    }

    fn model_entry<M: Model>(&self) -> ModelEntry {
        let key = TypeId::of::<M>();
        if let Some(entry) =
            self.models.read().unwrap_or_else(PoisonError::into_inner).get(&key).copied()
        {
            return entry;
        }

        // Built without holding the lock: a schema may resolve other models.
        let schema: &'static ModelSchema = Box::leak(Box::new(M::schema()));
        let converter: &'static Converter =
            Box::leak(Box::new(Converter::Model(ModelRef::new(model_schema::<M>))));

        let entry = *self
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(ModelEntry { schema, converter });
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.schema.name, entry.schema);
        logging::trace("REGISTRY", &format!("registered model {}", entry.schema.name));
        entry
    }

    /// Schema of model `M`, built on first use.
    pub fn schema_of<M: Model>(&self) -> &'static ModelSchema { self.model_entry::<M>().schema }

    /// Converter of model `M`, built on first use.
    pub fn converter_of<M: Model>(&self) -> &'static Converter {
        self.model_entry::<M>().converter
    }

    /// Converter owned by type `T`, built with `build` on first use.
    ///
    /// Generated unions use this to share one converter per union type.
    pub fn memoize<T: 'static>(&self, build: impl FnOnce() -> Converter) -> &'static Converter {
        let key = TypeId::of::<T>();
        if let Some(converter) =
            self.converters.read().unwrap_or_else(PoisonError::into_inner).get(&key).copied()
        {
            return converter;
        }

        let built: &'static Converter = Box::leak(Box::new(build()));
        *self.converters.write().unwrap_or_else(PoisonError::into_inner).entry(key).or_insert(built)
    }
}

/// Read-only interface to the `ConverterRegistry`.
///
/// Provides a clean API for inspecting registered models without exposing
/// mutation capabilities.
pub trait ConverterRegistryReader {
    /// Names of all registered models, sorted.
    fn list_models(&self) -> Vec<&'static str>;

    /// Get a registered model schema by name.
    ///
    /// Returns `None` if no model with the given name has been registered yet.
    fn get_model(&self, name: &str) -> Option<&'static ModelSchema>;

    /// Number of registered models.
    fn model_count(&self) -> usize;
}

impl ConverterRegistryReader for ConverterRegistry {
    fn list_models(&self) -> Vec<&'static str> {
        self.names.read().unwrap_or_else(PoisonError::into_inner).keys().copied().collect()
    }

    fn get_model(&self, name: &str) -> Option<&'static ModelSchema> {
        self.names.read().unwrap_or_else(PoisonError::into_inner).get(name).copied()
    }

    fn model_count(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Schema of model `M` from the global registry.
pub fn model_schema<M: Model>() -> &'static ModelSchema {
    ConverterRegistry::global().schema_of::<M>()
}

/// Converter of model `M` from the global registry.
pub fn model_converter<M: Model>() -> &'static Converter {
    ConverterRegistry::global().converter_of::<M>()
}

/// A lazy model converter for use inside schemas.
///
/// Unlike [`model_converter`] this does not build `M`'s schema, so a model
/// may reference itself.
pub fn model_ref<M: Model>() -> Converter { Converter::Model(ModelRef::new(model_schema::<M>)) }

/// Converter owned by `T` from the global registry.
pub fn memoize<T: 'static>(build: impl FnOnce() -> Converter) -> &'static Converter {
    ConverterRegistry::global().memoize::<T>(build)
}
