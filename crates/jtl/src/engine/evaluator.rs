//! Instruction evaluation protocol.

use serde_json::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::consts::{IMPLICIT_ARGUMENT, INSTRUCTION_TAG};
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::scope::Scope;
use crate::engine::stack::ensure_sufficient_stack;
use crate::model::{Node, NodeList};

impl Scope {
    /// Evaluate this scope's instruction with the handler the language binds
    /// to its operation name.
    ///
    /// Engine errors pass through unchanged. A panicking handler is reported
    /// as `ImplementationError` naming the instruction. Every nested
    /// evaluation passes through here, so this is where the stack is grown.
    pub fn evaluate_instruction(self: &Rc<Self>) -> Result<Option<NodeList>, Error> {
        let Some(instruction) = self.instruction_value() else {
            return Err(self.error(ErrorKind::ImplementationError, "scope has no instruction"));
        };
        let Value::Object(fields) = instruction else {
            return Err(self.error(ErrorKind::TransformationUnexpectedType, "instruction is not a JSON object"));
        };
        let Some(name) = fields.get(INSTRUCTION_TAG).and_then(Value::as_str) else {
            return Err(self.error(
                ErrorKind::TransformationUnknownInstruction,
                format!("object has no '{INSTRUCTION_TAG}' operation name"),
            ));
        };
        let Some(handler) = self.language().handler(name) else {
            return Err(self.error(
                ErrorKind::TransformationUnknownInstruction,
                format!("cannot understand '{name}'"),
            ));
        };

        tracing::trace!(instruction = name, iteration = self.iteration(), depth = self.depth(), "evaluate");
        match ensure_sufficient_stack(|| catch_unwind(AssertUnwindSafe(|| handler(self)))) {
            Ok(result) => result,
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else if let Some(s) = panic.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else {
                    "unknown panic".to_owned()
                };
                Err(self.error(ErrorKind::ImplementationError, format!("in {name} got error \"{message}\"")))
            }
        }
    }

    /// Resolve an attribute of the current instruction into a node list.
    ///
    /// The implicit argument is used when the language names `attribute` as
    /// the instruction's primary attribute; otherwise the explicit attribute.
    /// `None` when neither is present.
    pub fn evaluate_nodelist_by_attribute(self: &Rc<Self>, attribute: &str) -> Result<Option<NodeList>, Error> {
        let Some(instruction) = self.instruction() else {
            return Err(self.error(ErrorKind::ImplementationError, "scope has no instruction"));
        };
        let Some(Value::Object(fields)) = self.instruction_value() else {
            return Ok(None);
        };
        if fields.contains_key(IMPLICIT_ARGUMENT) {
            let name = fields.get(INSTRUCTION_TAG).and_then(Value::as_str).unwrap_or_default();
            if self.language().is_primary_attribute(name, attribute) {
                return self.production_result(&instruction.descend(IMPLICIT_ARGUMENT)).map(Some);
            }
        }
        if fields.contains_key(attribute) {
            return self.production_result(&instruction.descend(attribute)).map(Some);
        }
        Ok(None)
    }

    /// Whether the attribute would resolve to a production, without evaluating it.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        let Some(Value::Object(fields)) = self.instruction_value() else {
            return false;
        };
        let routed = fields.contains_key(IMPLICIT_ARGUMENT)
            && fields
                .get(INSTRUCTION_TAG)
                .and_then(Value::as_str)
                .is_some_and(|name| self.language().is_primary_attribute(name, attribute));
        routed || fields.contains_key(attribute)
    }

    /// Like [`Scope::evaluate_nodelist_by_attribute`], failing with
    /// `TransformationMissingRequiredAttribute` when the attribute is absent.
    pub fn require_attribute(self: &Rc<Self>, attribute: &str) -> Result<NodeList, Error> {
        self.evaluate_nodelist_by_attribute(attribute)?.ok_or_else(|| {
            self.error(
                ErrorKind::TransformationMissingRequiredAttribute,
                format!("missing required attribute '{attribute}'"),
            )
        })
    }

    /// Evaluate every instruction of a production, each in its own child
    /// scope, concatenating the results.
    pub fn production_result(self: &Rc<Self>, production: &Node) -> Result<NodeList, Error> {
        let Some(Value::Array(items)) = production.value()? else {
            return Err(self.error(ErrorKind::TransformationUnexpectedType, "production is not an array"));
        };
        let holder = match self.instruction() {
            Some(instruction) if instruction.same_node(production) => Rc::clone(self),
            _ => self.subscope().with_instruction(production.clone()).build()?,
        };
        let mut results = NodeList::new();
        for index in 0..items.len() {
            let element = holder.subscope().with_instruction(production.descend(index)).build()?;
            if let Some(result) = element.evaluate_instruction()? {
                results.push_member(result);
            }
        }
        Ok(results)
    }
}
