//! Instruction-set provider.
//!
//! A [`Language`] maps operation names to handlers and carries the metadata
//! the evaluator needs to route implicit arguments.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::engine::instructions;
use crate::engine::runtime::Error;
use crate::engine::scope::Scope;
use crate::model::NodeList;

/// Handler for one instruction. `Ok(None)` means the instruction produced
/// nothing at all (as opposed to an empty list).
pub type InstructionHandler = fn(&Rc<Scope>) -> Result<Option<NodeList>, Error>;

/// Metadata describing one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSpec {
    /// Attribute that receives the `_implicit_argument` production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_attribute: Option<String>,
    /// Attributes the instruction reads.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl InstructionSpec {
    pub fn new(primary: Option<&str>, attributes: &[&str]) -> Self {
        Self {
            primary_attribute: primary.map(str::to_owned),
            attributes: attributes.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

/// Instruction metadata keyed by operation name.
pub type InstructionCatalog = BTreeMap<String, InstructionSpec>;

pub struct Language {
    name: String,
    handlers: HashMap<String, InstructionHandler>,
    catalog: InstructionCatalog,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), handlers: HashMap::new(), catalog: InstructionCatalog::new() }
    }

    /// The built-in instruction set.
    pub fn working_draft() -> Self {
        let mut language = Language::new("workingdraft");
        instructions::register_working_draft(&mut language);
        language
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&mut self, name: &str, spec: InstructionSpec, handler: InstructionHandler) {
        self.handlers.insert(name.to_owned(), handler);
        self.catalog.insert(name.to_owned(), spec);
    }

    /// Replace instruction metadata. Entries for names without a handler are
    /// kept but the instruction stays unknown at evaluation time.
    pub fn with_catalog(mut self, catalog: InstructionCatalog) -> Self {
        self.catalog.extend(catalog);
        self
    }

    /// Parse a catalog from its JSON form.
    pub fn catalog_from_json(json: &str) -> Result<InstructionCatalog, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn handler(&self, name: &str) -> Option<InstructionHandler> {
        self.handlers.get(name).copied()
    }

    pub fn spec(&self, name: &str) -> Option<&InstructionSpec> {
        self.catalog.get(name)
    }

    pub fn catalog(&self) -> &InstructionCatalog {
        &self.catalog
    }

    /// Whether `attribute` receives the implicit argument of `instruction`.
    pub fn is_primary_attribute(&self, instruction: &str, attribute: &str) -> bool {
        self.spec(instruction)
            .and_then(|spec| spec.primary_attribute.as_deref())
            .is_some_and(|primary| primary == attribute)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::working_draft()
    }
}

impl core::fmt::Debug for Language {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("instructions", &self.catalog.keys().collect::<Vec<_>>())
            .finish()
    }
}
