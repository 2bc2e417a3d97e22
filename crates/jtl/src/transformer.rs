use serde_json::Value;
use std::rc::Rc;

use crate::engine::language::Language;
use crate::engine::runtime::{Error, Limits};
use crate::engine::scope::{Scope, ScopeBuilder};
use crate::model::NodeList;

/// Configured entry point for running transformations.
///
/// ```
/// use serde_json::json;
///
/// let program = json!({
///     "JTL": "transformation",
///     "templates": [{ "JTL": "template", "produce": [{ "JTL": "literal", "value": "foo" }] }]
/// });
/// let result = jtl::Transformer::new().transform(json!({}), program).unwrap();
/// assert_eq!(result.to_values().unwrap(), vec![json!("foo")]);
/// ```
#[derive(Debug, Clone)]
pub struct Transformer {
    language: Rc<Language>,
    limits: Limits,
    variables: Vec<(String, Value)>,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer {
    pub fn new() -> Self {
        Self { language: Rc::new(Language::working_draft()), limits: Limits::default(), variables: Vec::new() }
    }

    pub fn with_language(mut self, language: impl Into<Rc<Language>>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Bind a global variable visible to every template.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.push((name.into(), value));
        self
    }

    pub fn language(&self) -> &Rc<Language> {
        &self.language
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Root scope carrying this configuration.
    pub fn root_scope(&self) -> Result<Rc<Scope>, Error> {
        let root = ScopeBuilder::new(Rc::clone(&self.language)).with_limits(self.limits).build()?;
        for (name, value) in &self.variables {
            root.declare_symbol(name, NodeList::of_value(value.clone()))?;
        }
        Ok(root)
    }

    pub fn transform(&self, input: Value, program: Value) -> Result<NodeList, Error> {
        tracing::debug!(language = self.language.name(), max_depth = self.limits.max_depth, "transform");
        self.root_scope()?.transform(input, program)
    }

    /// Run and render the result as JSON values.
    pub fn transform_values(&self, input: Value, program: Value) -> Result<Vec<Value>, Error> {
        self.transform(input, program)?.to_values()
    }
}

/// Run `program` over `input` with the built-in instruction set and default limits.
pub fn transform(input: Value, program: Value) -> Result<NodeList, Error> {
    Transformer::new().transform(input, program)
}
