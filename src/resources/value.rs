//! ST-010: `Local::Value` — a named constant inside the resource graph.

use crate::core::error::Result;
use crate::core::resource::{Properties, Resource};
use crate::core::value::Value;

/// Exposes its required `Value` property unchanged.
#[derive(Debug, Default)]
pub struct ValueResource {
    properties: Properties,
    value: Value,
}

impl Resource for ValueResource {
    fn set_properties(&mut self, properties: Properties) {
        self.properties = properties;
    }

    fn create(&mut self) -> Result<()> {
        self.value = self.properties.require::<Value>("Value")?;
        Ok(())
    }

    fn get(&self) -> Value {
        self.value.clone()
    }
}
