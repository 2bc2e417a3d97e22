pub mod consts;
pub mod engine;
pub mod model;
pub mod transformer;

pub use engine::dispatch::DispatchOptions;
pub use engine::language::{InstructionCatalog, InstructionHandler, InstructionSpec, Language};
pub use engine::runtime::{Error, ErrorKind, Limits, ScopeTrace};
pub use engine::scope::{Scope, ScopeBuilder, is_valid_symbol};
pub use model::{Document, Member, Node, NodeArray, NodeList, NodeRef, PathSegment, ValueType, values_equal};
pub use transformer::{Transformer, transform};
