//! Execution context.
//!
//! A [`Scope`] ties together the context node, the instruction being
//! evaluated, a symbol table and a template registry. Scopes hang off two
//! independent chains: `parent` (lexical, for symbol lookup) and `caller`
//! (dynamic, for template dispatch fallback).

use compact_str::CompactString;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::consts::INSTRUCTION_TAG;
use crate::engine::language::Language;
use crate::engine::runtime::{Error, ErrorKind, Limits, ScopeTrace};
use crate::model::{Node, NodeList, NodeRef};

pub struct Scope {
    symbols: RefCell<HashMap<CompactString, NodeList>>,
    templates: RefCell<Vec<Rc<Scope>>>,
    current: Option<NodeRef>,
    parent: Option<Rc<Scope>>,
    caller: Option<Rc<Scope>>,
    instruction: Option<Node>,
    iteration: usize,
    subscope_iteration_index: Cell<usize>,
    language: Rc<Language>,
    limits: Limits,
    depth: usize,
}

/// Builder for root scopes and subscopes.
pub struct ScopeBuilder {
    symbols: HashMap<CompactString, NodeList>,
    current: Option<NodeRef>,
    parent: Option<Rc<Scope>>,
    caller: Option<Rc<Scope>>,
    instruction: Option<Node>,
    iteration: usize,
    language: Rc<Language>,
    limits: Limits,
}

impl ScopeBuilder {
    pub fn new(language: Rc<Language>) -> Self {
        Self {
            symbols: HashMap::new(),
            current: None,
            parent: None,
            caller: None,
            instruction: None,
            iteration: 0,
            language,
            limits: Limits::default(),
        }
    }

    pub fn with_current(mut self, current: impl Into<NodeRef>) -> Self {
        self.current = Some(current.into());
        self
    }

    pub fn with_instruction(mut self, instruction: Node) -> Self {
        self.instruction = Some(instruction);
        self
    }

    pub fn with_caller(mut self, caller: Rc<Scope>) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_symbol(mut self, name: &str, value: NodeList) -> Self {
        self.symbols.insert(CompactString::from(name), value);
        self
    }

    /// Finish the scope. Its depth is one more than its caller's; exceeding
    /// the configured ceiling is `TransformationInvalid`.
    pub fn build(self) -> Result<Rc<Scope>, Error> {
        let depth = self.caller.as_ref().map_or(0, |caller| caller.depth + 1);
        if depth > self.limits.max_depth {
            let message = format!("maximum scope depth of {} exceeded", self.limits.max_depth);
            return Err(match &self.caller {
                Some(caller) => caller.error(ErrorKind::TransformationInvalid, message),
                None => Error::new(ErrorKind::TransformationInvalid, message),
            });
        }
        Ok(self.finish(depth))
    }

    fn finish(self, depth: usize) -> Rc<Scope> {
        Rc::new(Scope {
            symbols: RefCell::new(self.symbols),
            templates: RefCell::new(Vec::new()),
            current: self.current,
            parent: self.parent,
            caller: self.caller,
            instruction: self.instruction,
            iteration: self.iteration,
            subscope_iteration_index: Cell::new(0),
            language: self.language,
            limits: self.limits,
            depth,
        })
    }
}

impl Scope {
    /// Fresh root scope with no context, instruction or callers.
    pub fn root(language: Rc<Language>, limits: Limits) -> Rc<Scope> {
        ScopeBuilder::new(language).with_limits(limits).finish(0)
    }

    /// Child scope inheriting context, iteration, instruction and language,
    /// with `self` as both parent and caller.
    pub fn subscope(self: &Rc<Self>) -> ScopeBuilder {
        ScopeBuilder {
            symbols: HashMap::new(),
            current: self.current.clone(),
            parent: Some(Rc::clone(self)),
            caller: Some(Rc::clone(self)),
            instruction: self.instruction.clone(),
            iteration: self.iteration,
            language: Rc::clone(&self.language),
            limits: self.limits,
        }
    }

    /// Like [`Scope::subscope`], numbering the child with this scope's next
    /// iteration index.
    pub fn numbered_subscope(self: &Rc<Self>) -> ScopeBuilder {
        let iteration = self.subscope_iteration_index.get();
        self.subscope_iteration_index.set(iteration + 1);
        self.subscope().with_iteration(iteration)
    }

    /// Detached closure over this scope's lexical environment.
    ///
    /// All symbols visible from here are copied in, the nearest binding of a
    /// name winning. The closure keeps the instruction but has no context,
    /// parent or caller.
    pub fn enclose(&self) -> Rc<Scope> {
        let mut symbols: HashMap<CompactString, NodeList> = HashMap::new();
        for scope in self.lexical_chain() {
            for (name, value) in scope.symbols.borrow().iter() {
                symbols.entry(name.clone()).or_insert_with(|| value.clone());
            }
        }
        Rc::new(Scope {
            symbols: RefCell::new(symbols),
            templates: RefCell::new(Vec::new()),
            current: None,
            parent: None,
            caller: None,
            instruction: self.instruction.clone(),
            iteration: 0,
            subscope_iteration_index: Cell::new(0),
            language: Rc::clone(&self.language),
            limits: self.limits,
            depth: self.depth,
        })
    }

    pub fn current(&self) -> Option<&NodeRef> {
        self.current.as_ref()
    }

    /// The context node as a one-element list, empty when there is none.
    pub fn current_list(&self) -> NodeList {
        self.current.iter().cloned().collect()
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    pub fn caller(&self) -> Option<&Rc<Scope>> {
        self.caller.as_ref()
    }

    pub fn instruction(&self) -> Option<&Node> {
        self.instruction.as_ref()
    }

    /// Resolved JSON value of the current instruction.
    pub fn instruction_value(&self) -> Option<&Value> {
        self.instruction.as_ref().and_then(|node| node.value().ok().flatten())
    }

    /// Operation name of the current instruction, if it is a tagged object.
    pub fn instruction_name(&self) -> Option<&str> {
        self.instruction_value()?.get(INSTRUCTION_TAG)?.as_str()
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn language(&self) -> &Rc<Language> {
        &self.language
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// This scope followed by its lexical ancestors.
    pub fn lexical_chain(&self) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self), |scope| scope.parent.as_deref())
    }

    pub fn get_symbol(&self, name: &str) -> Result<Option<NodeList>, Error> {
        self.check_symbol(name)?;
        Ok(self
            .lexical_chain()
            .find_map(|scope| scope.symbols.borrow().get(name).cloned()))
    }

    pub fn declare_symbol(&self, name: &str, value: NodeList) -> Result<(), Error> {
        self.check_symbol(name)?;
        let mut symbols = self.symbols.borrow_mut();
        if symbols.contains_key(name) {
            return Err(self.error(
                ErrorKind::TransformationVariableDeclarationFailed,
                format!("symbol '{name}' already declared in this scope"),
            ));
        }
        symbols.insert(CompactString::from(name), value);
        Ok(())
    }

    /// Rebind `name` in the nearest scope that declares it.
    pub fn update_symbol(&self, name: &str, value: NodeList) -> Result<(), Error> {
        self.check_symbol(name)?;
        let owner = self.lexical_chain().find(|scope| scope.symbols.borrow().contains_key(name));
        match owner {
            Some(scope) => {
                scope.symbols.borrow_mut().insert(CompactString::from(name), value);
                Ok(())
            }
            None => Err(self.error(
                ErrorKind::TransformationVariableDeclarationFailed,
                format!("symbol '{name}' not yet declared"),
            )),
        }
    }

    fn check_symbol(&self, name: &str) -> Result<(), Error> {
        if is_valid_symbol(name) {
            Ok(())
        } else {
            Err(self.error(ErrorKind::ResultNodesUnexpected, format!("invalid symbol name '{name}'")))
        }
    }

    pub fn declare_template(&self, template: Rc<Scope>) {
        self.templates.borrow_mut().push(template);
    }

    /// Snapshot of the templates registered here, in declaration order.
    pub fn templates(&self) -> Vec<Rc<Scope>> {
        self.templates.borrow().clone()
    }

    pub fn trace(&self) -> ScopeTrace {
        ScopeTrace {
            instruction: self.instruction_name().map(str::to_owned).or_else(|| {
                matches!(self.instruction_value(), Some(Value::Array(_))).then(|| "production".to_owned())
            }),
            instruction_pointer: self.instruction.as_ref().map(Node::pointer),
            current: self.current.as_ref().map(NodeRef::describe),
            iteration: self.iteration,
            depth: self.depth,
        }
    }

    /// Build an error originating from this scope.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        let error = Error::new(kind, message).with_scope(self.trace());
        tracing::debug!(kind = %error.kind, message = %error.message, depth = self.depth, "raising error");
        error
    }
}

/// Identifier syntax, checked against the whole name: a letter or underscore,
/// then letters, digits, `_` or `-`.
pub fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl core::fmt::Debug for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scope").field("trace", &self.trace()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo", true)]
    #[case("_foo-bar2", true)]
    #[case("Foo", true)]
    #[case("", false)]
    #[case("1foo", false)]
    #[case("-foo", false)]
    #[case("foo bar", false)]
    #[case("foo.bar", false)]
    fn symbol_syntax(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_symbol(name), valid);
    }
}
