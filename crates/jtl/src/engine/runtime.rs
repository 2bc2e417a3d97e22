use core::fmt;
use std::sync::Arc;

/// Closed set of error kinds raised by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Engine-internal faults
    ImplementationError,
    ImplementationFeatureUnimplemented,
    ImplementationUnknownErrorType,
    // Malformed input document
    InputNotWellFormed,
    // Malformed or misbehaving instruction tree
    TransformationNotWellFormed,
    TransformationInvalid,
    TransformationUnexpectedType,
    TransformationUnknownInstruction,
    TransformationMissingRequiredAttribute,
    TransformationNoMatchingTemplate,
    TransformationVariableDeclarationFailed,
    TransformationUnknownVariable,
    // Arity violations on evaluated sub-productions
    ResultNodesUnexpected,
    ResultNodesUnexpectedNumber,
    ResultNodesNotEvenNumber,
    ResultNodesMultipleNodes,
    // Type violations on evaluated values
    ResultNodeUnexpectedType,
    ResultNodeNotBoolean,
    ResultNodeNotString,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 19] = [
        ErrorKind::ImplementationError,
        ErrorKind::ImplementationFeatureUnimplemented,
        ErrorKind::ImplementationUnknownErrorType,
        ErrorKind::InputNotWellFormed,
        ErrorKind::TransformationNotWellFormed,
        ErrorKind::TransformationInvalid,
        ErrorKind::TransformationUnexpectedType,
        ErrorKind::TransformationUnknownInstruction,
        ErrorKind::TransformationMissingRequiredAttribute,
        ErrorKind::TransformationNoMatchingTemplate,
        ErrorKind::TransformationVariableDeclarationFailed,
        ErrorKind::TransformationUnknownVariable,
        ErrorKind::ResultNodesUnexpected,
        ErrorKind::ResultNodesUnexpectedNumber,
        ErrorKind::ResultNodesNotEvenNumber,
        ErrorKind::ResultNodesMultipleNodes,
        ErrorKind::ResultNodeUnexpectedType,
        ErrorKind::ResultNodeNotBoolean,
        ErrorKind::ResultNodeNotString,
    ];

    pub fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            ImplementationError => "ImplementationError",
            ImplementationFeatureUnimplemented => "ImplementationFeatureUnimplemented",
            ImplementationUnknownErrorType => "ImplementationUnknownErrorType",
            InputNotWellFormed => "InputNotWellFormed",
            TransformationNotWellFormed => "TransformationNotWellFormed",
            TransformationInvalid => "TransformationInvalid",
            TransformationUnexpectedType => "TransformationUnexpectedType",
            TransformationUnknownInstruction => "TransformationUnknownInstruction",
            TransformationMissingRequiredAttribute => "TransformationMissingRequiredAttribute",
            TransformationNoMatchingTemplate => "TransformationNoMatchingTemplate",
            TransformationVariableDeclarationFailed => "TransformationVariableDeclarationFailed",
            TransformationUnknownVariable => "TransformationUnknownVariable",
            ResultNodesUnexpected => "ResultNodesUnexpected",
            ResultNodesUnexpectedNumber => "ResultNodesUnexpectedNumber",
            ResultNodesNotEvenNumber => "ResultNodesNotEvenNumber",
            ResultNodesMultipleNodes => "ResultNodesMultipleNodes",
            ResultNodeUnexpectedType => "ResultNodeUnexpectedType",
            ResultNodeNotBoolean => "ResultNodeNotBoolean",
            ResultNodeNotString => "ResultNodeNotString",
        }
    }

    /// Parse a kind from its canonical name. Names outside the taxonomy map to
    /// `ImplementationUnknownErrorType`.
    pub fn from_name(s: &str) -> Self {
        match s {
            // Older programs and test suites spell the attribute kind "Atrribute".
            "TransformationMissingRequiredAtrribute" => return ErrorKind::TransformationMissingRequiredAttribute,
            // Plural spelling used for string operands of `object` and `length`.
            "ResultNodesUnexpectedType" => return ErrorKind::ResultNodeUnexpectedType,
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .unwrap_or(ErrorKind::ImplementationUnknownErrorType)
    }

    /// True for faults of the engine itself rather than of the program or its input.
    pub fn is_implementation(&self) -> bool {
        matches!(
            self,
            ErrorKind::ImplementationError
                | ErrorKind::ImplementationFeatureUnimplemented
                | ErrorKind::ImplementationUnknownErrorType
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the scope an error originated from.
///
/// Scopes are reference counted and not thread-safe, so errors carry this
/// detached description instead of the scope itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTrace {
    /// Operation name of the instruction being evaluated, if it had one.
    pub instruction: Option<String>,
    /// JSON pointer of the instruction inside the program.
    pub instruction_pointer: Option<String>,
    /// JSON pointer of the context node, or a short tag for bundles and closures.
    pub current: Option<String>,
    pub iteration: usize,
    pub depth: usize,
}

impl fmt::Display for ScopeTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in {}", self.instruction.as_deref().unwrap_or("<no instruction>"))?;
        if let Some(pointer) = &self.instruction_pointer {
            write!(f, " at program{pointer}")?;
        }
        if let Some(current) = &self.current {
            write!(f, ", current {current}")?;
        }
        write!(f, ", iteration {}, depth {}", self.iteration, self.depth)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub scope: Option<ScopeTrace>,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into(), scope: None, source: None }
    }

    /// Error without a specific message; the kind name is reported instead.
    pub fn simple(kind: ErrorKind) -> Self {
        Self::new(kind, String::new())
    }

    pub fn not_implemented(feature: &str) -> Self {
        Self::new(
            ErrorKind::ImplementationFeatureUnimplemented,
            format!("not implemented: {feature}"),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn with_scope(mut self, scope: ScopeTrace) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::new(ErrorKind::InputNotWellFormed, e.to_string())
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Error {}]", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        if let Some(scope) = &self.scope {
            write!(f, " ({scope})")?;
        }
        Ok(())
    }
}

/// Resource ceilings applied to a transformation.
///
/// Evaluation is plain recursive descent, so unbounded recursion in a program
/// (or an endless `while` rewrite) would otherwise exhaust the stack or never
/// return. Exceeding a limit raises `TransformationInvalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum dynamic scope depth.
    pub max_depth: usize,
    /// Maximum number of worklist steps a single `while` may take.
    pub max_loop_iterations: usize,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 512;
    pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 100_000;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_loop_iterations(mut self, max_loop_iterations: usize) -> Self {
        self.max_loop_iterations = max_loop_iterations;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_loop_iterations: Self::DEFAULT_MAX_LOOP_ITERATIONS,
        }
    }
}
