//! Template registration and dispatch.

use serde_json::Value;
use std::rc::Rc;

use crate::consts::TEMPLATES;
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::model::{Document, NodeList, NodeRef, values_equal};

/// Dispatch request. Templates carrying a `name` only answer requests for
/// that name; unnamed templates answer every request.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub name: Option<Value>,
}

impl DispatchOptions {
    pub fn named(name: Value) -> Self {
        Self { name: Some(name) }
    }
}

impl Scope {
    /// Run `program` over `input` below this scope.
    pub fn transform(self: &Rc<Self>, input: Value, program: Value) -> Result<NodeList, Error> {
        let program = Document::new(program);
        let root = self
            .subscope()
            .with_current(Document::new(input))
            .with_instruction(program.root())
            .build()?;
        root.run_transformation()
    }

    /// Register the templates of the current instruction, then dispatch on the
    /// context node. Failing to match is `TransformationNoMatchingTemplate`.
    pub(crate) fn run_transformation(self: &Rc<Self>) -> Result<NodeList, Error> {
        let templates = self.evaluate_nodelist_by_attribute(TEMPLATES)?.ok_or_else(|| {
            self.error(
                ErrorKind::TransformationMissingRequiredAttribute,
                format!("transformation has no '{TEMPLATES}' production"),
            )
        })?;
        for entry in templates {
            match entry {
                NodeRef::Scope(template) => self.declare_template(template),
                other => {
                    return Err(self.error(
                        ErrorKind::TransformationUnexpectedType,
                        format!("'{TEMPLATES}' produced a {} instead of a template", other.value_type()?),
                    ));
                }
            }
        }
        tracing::debug!(count = self.templates().len(), "templates registered");
        self.apply_templates(&DispatchOptions::default())?
            .ok_or_else(|| self.error(ErrorKind::TransformationNoMatchingTemplate, "no template matched"))
    }

    /// Try the templates registered here from last to first, then defer along
    /// the caller chain. Every attempt runs against `self`.
    ///
    /// `None` means no template anywhere on the chain matched.
    pub fn apply_templates(self: &Rc<Self>, options: &DispatchOptions) -> Result<Option<NodeList>, Error> {
        let mut next = Some(Rc::clone(self));
        while let Some(scope) = next {
            for template in scope.templates().iter().rev() {
                if let Some(result) = self.apply_template(template, options)? {
                    tracing::debug!(depth = self.depth(), dispatcher_depth = scope.depth(), "template matched");
                    return Ok(Some(result));
                }
            }
            next = scope.caller().cloned();
        }
        tracing::debug!(depth = self.depth(), name = ?options.name, "no template matched");
        Ok(None)
    }

    /// Attempt a single template against this scope's context.
    pub fn apply_template(
        self: &Rc<Self>,
        template: &Rc<Scope>,
        options: &DispatchOptions,
    ) -> Result<Option<NodeList>, Error> {
        let mut merged = template.subscope().with_caller(Rc::clone(self)).with_iteration(self.iteration());
        if let Some(current) = self.current() {
            merged = merged.with_current(current.clone());
        }
        let merged = merged.build()?;

        if !merged.match_template(options)? {
            return Ok(None);
        }
        merged.require_attribute("produce").map(Some)
    }

    /// Check the template instruction of this scope against a request.
    pub fn match_template(self: &Rc<Self>, options: &DispatchOptions) -> Result<bool, Error> {
        if let Some(names) = self.evaluate_nodelist_by_attribute("name")? {
            let name = match names.as_slice() {
                [] => None,
                [only] => only.json()?.cloned(),
                _ => {
                    return Err(self.error(ErrorKind::ResultNodesMultipleNodes, "template name must be a single node"));
                }
            };
            let same = match (&name, &options.name) {
                (None, None) => true,
                (Some(a), Some(b)) => values_equal(a, b),
                _ => false,
            };
            if !same {
                return Ok(false);
            }
        }

        let Some(result) = self.evaluate_nodelist_by_attribute("match")? else {
            return Ok(true);
        };
        let Some(only) = result.exactly_one() else {
            return Err(self.error(ErrorKind::ResultNodesMultipleNodes, "template match must be a single node"));
        };
        match only.json()? {
            Some(Value::Bool(matched)) => Ok(*matched),
            _ => Err(self.error(ErrorKind::ResultNodeNotBoolean, "template match must be a boolean")),
        }
    }
}
