pub mod dispatch;
pub mod evaluator;
pub mod instructions;
pub mod language;
pub mod runtime;
pub mod scope;
pub mod stack;
