//! Record and sum declaration registries.
//!
//! Owned by one bind session and cleared at the start of every bind.
//! Variant names are global, so the registry also maps each variant to the
//! sum that declares it.

use crate::symbol::SymbolId;
use crate::types::{Substitution, Type};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub symbol: SymbolId,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct RecordDefinition {
    pub name: String,
    pub type_parameters: Vec<String>,
    /// Fields in declaration order.
    pub fields: IndexMap<String, FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct VariantDefinition {
    pub symbol: SymbolId,
    pub payload: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct SumDefinition {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub variants: IndexMap<String, VariantDefinition>,
}

/// Maps each generic parameter to the matching argument. Missing arguments
/// leave the parameter in place.
pub fn substitution_for(type_parameters: &[String], args: &[Type]) -> Substitution {
    type_parameters.iter().cloned().zip(args.iter().cloned()).collect()
}

impl RecordDefinition {
    /// The record type with its own parameters as arguments.
    pub fn self_type(&self) -> Type {
        Type::record(self.name.clone(), generic_args(&self.type_parameters))
    }

    pub fn field_type(&self, field: &str, args: &[Type]) -> Option<Type> {
        let def = self.fields.get(field)?;
        Some(def.ty.substitute(&substitution_for(&self.type_parameters, args)))
    }
}

impl SumDefinition {
    pub fn self_type(&self) -> Type {
        Type::sum(self.name.clone(), generic_args(&self.type_parameters))
    }

    pub fn payload_type(&self, variant: &str, args: &[Type]) -> Option<Option<Type>> {
        let def = self.variants.get(variant)?;
        Some(def.payload.as_ref().map(|p| p.substitute(&substitution_for(&self.type_parameters, args))))
    }
}

fn generic_args(type_parameters: &[String]) -> Vec<Type> {
    type_parameters.iter().map(|p| Type::generic(p.clone())).collect()
}

#[derive(Debug, Default)]
pub struct Registry {
    records: FxHashMap<String, RecordDefinition>,
    sums: FxHashMap<String, SumDefinition>,
    variant_owners: FxHashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.sums.clear();
        self.variant_owners.clear();
    }

    /// True if a record or sum with this name exists.
    pub fn is_type_name(&self, name: &str) -> bool {
        self.records.contains_key(name) || self.sums.contains_key(name)
    }

    /// Register a record name with no fields yet. Returns false on a clash
    /// with any existing record or sum name.
    pub fn declare_record(&mut self, name: &str, type_parameters: Vec<String>) -> bool {
        if self.is_type_name(name) {
            return false;
        }
        self.records.insert(
            name.to_string(),
            RecordDefinition {
                name: name.to_string(),
                type_parameters,
                fields: IndexMap::new(),
            },
        );
        true
    }

    pub fn declare_sum(&mut self, name: &str, type_parameters: Vec<String>) -> bool {
        if self.is_type_name(name) {
            return false;
        }
        self.sums.insert(
            name.to_string(),
            SumDefinition {
                name: name.to_string(),
                type_parameters,
                variants: IndexMap::new(),
            },
        );
        true
    }

    pub fn record(&self, name: &str) -> Option<&RecordDefinition> {
        self.records.get(name)
    }

    pub fn record_mut(&mut self, name: &str) -> Option<&mut RecordDefinition> {
        self.records.get_mut(name)
    }

    pub fn sum(&self, name: &str) -> Option<&SumDefinition> {
        self.sums.get(name)
    }

    /// Add a variant to `sum`. On a clash returns the name of the sum that
    /// already owns the variant.
    pub fn add_variant(&mut self, sum: &str, variant: &str, definition: VariantDefinition) -> Result<(), String> {
        if let Some(owner) = self.variant_owners.get(variant) {
            return Err(owner.clone());
        }
        let Some(def) = self.sums.get_mut(sum) else {
            return Err(sum.to_string());
        };
        def.variants.insert(variant.to_string(), definition);
        self.variant_owners.insert(variant.to_string(), sum.to_string());
        Ok(())
    }

    /// The sum declaring `variant`, with the variant's definition.
    pub fn variant(&self, variant: &str) -> Option<(&SumDefinition, &VariantDefinition)> {
        let owner = self.variant_owners.get(variant)?;
        let sum = self.sums.get(owner)?;
        Some((sum, sum.variants.get(variant)?))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn sum_count(&self) -> usize {
        self.sums.len()
    }
}
