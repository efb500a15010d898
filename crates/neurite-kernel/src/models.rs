/*!
Synapse model registry.

Maps model names to ids, holds per-model default attribute values and the
model properties the connection core consults. Defaults are kept in a
`BTreeMap` so attribute pipelines are assembled in a stable order.
*/

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::values::SpecValue;
use crate::SynapseModelId;

/// A registered synapse model.
#[derive(Debug, Clone)]
pub struct SynapseModel {
    pub name: String,
    defaults: BTreeMap<String, SpecValue>,
    requires_symmetric: bool,
}

/// Registry of synapse models.
pub struct SynapseRegistry {
    models: Vec<SynapseModel>,
    by_name: AHashMap<String, SynapseModelId>,
}

impl SynapseRegistry {
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            by_name: AHashMap::new(),
        }
    }

    /// Registry pre-loaded with the stock models.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let mut defaults = BTreeMap::new();
        defaults.insert("weight".to_string(), SpecValue::Double(1.0));
        defaults.insert("delay".to_string(), SpecValue::Double(1.0));
        defaults.insert("receptor_type".to_string(), SpecValue::Long(0));
        registry.register("static_synapse", defaults.clone(), false);

        defaults.insert("alpha".to_string(), SpecValue::Double(1.0));
        defaults.insert("lambda".to_string(), SpecValue::Double(0.01));
        defaults.insert("mu_minus".to_string(), SpecValue::Double(1.0));
        defaults.insert("mu_plus".to_string(), SpecValue::Double(1.0));
        defaults.insert("tau_plus".to_string(), SpecValue::Double(20.0));
        registry.register("stdp_synapse", defaults, false);

        let mut gap = BTreeMap::new();
        gap.insert("weight".to_string(), SpecValue::Double(1.0));
        gap.insert("delay".to_string(), SpecValue::Double(1.0));
        gap.insert("receptor_type".to_string(), SpecValue::Long(0));
        registry.register("gap_junction", gap, true);

        registry
    }

    /// Register a model; later registrations shadow earlier names.
    pub fn register(
        &mut self,
        name: &str,
        defaults: BTreeMap<String, SpecValue>,
        requires_symmetric: bool,
    ) -> SynapseModelId {
        let id = self.models.len();
        self.models.push(SynapseModel {
            name: name.to_string(),
            defaults,
            requires_symmetric,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn resolve(&self, name: &str) -> Option<SynapseModelId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: SynapseModelId) -> &str {
        &self.models[id].name
    }

    /// Default attribute values of the model, in stable iteration order.
    pub fn defaults(&self, id: SynapseModelId) -> &BTreeMap<String, SpecValue> {
        &self.models[id].defaults
    }

    /// Whether connections of this model must come in symmetric pairs.
    pub fn requires_symmetric(&self, id: SynapseModelId) -> bool {
        self.models[id].requires_symmetric
    }

    /// Whether `param` is a settable attribute of the model.
    pub fn has_param(&self, id: SynapseModelId, param: &str) -> bool {
        self.models[id].defaults.contains_key(param)
    }
}

impl Default for SynapseRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_models() {
        let registry = SynapseRegistry::with_defaults();
        let stat = registry.resolve("static_synapse").unwrap();
        assert!(!registry.requires_symmetric(stat));
        assert!(registry.has_param(stat, "receptor_type"));
        assert!(!registry.has_param(stat, "tau_plus"));

        let stdp = registry.resolve("stdp_synapse").unwrap();
        assert!(registry.has_param(stdp, "tau_plus"));

        let gap = registry.resolve("gap_junction").unwrap();
        assert!(registry.requires_symmetric(gap));

        assert!(registry.resolve("quantum_synapse").is_none());
    }
}
