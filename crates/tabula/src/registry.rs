use crate::ModelDef;

use indexmap::IndexMap;
use tabula_core::{
    schema::{factory_key, table_name},
    Error, Result,
};

use std::fmt;

type Factory = Box<dyn Fn() -> ModelDef + Send + Sync>;

/// Model factories keyed by canonical table name (`race_event` and
/// `RaceEvent` both resolve to `model_raceevent`).
#[derive(Default)]
pub struct Registry {
    factories: IndexMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registers a factory for `table`. The closure receives an empty
    /// definition for the table and returns it with its fields and relations
    /// declared.
    pub fn register<F>(&mut self, table: &str, factory: F)
    where
        F: Fn(ModelDef) -> ModelDef + Send + Sync + 'static,
    {
        let table = table_name(table);
        let key = factory_key(&table);

        self.factories
            .insert(key, Box::new(move || factory(ModelDef::new(&table))));
    }

    pub fn contains(&self, table: &str) -> bool {
        self.factories.contains_key(&factory_key(table))
    }

    /// Produces a fresh definition for `table`, if one is registered.
    pub fn get(&self, table: &str) -> Option<ModelDef> {
        self.factories.get(&factory_key(table)).map(|factory| factory())
    }

    pub fn resolve(&self, table: &str) -> Result<ModelDef> {
        self.get(table)
            .ok_or_else(|| Error::unknown_model(factory_key(table)))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
