/// Object key whose string value names the operation of an instruction.
pub const INSTRUCTION_TAG: &str = "JTL";

/// Object key holding a production routed to the instruction's primary attribute.
pub const IMPLICIT_ARGUMENT: &str = "_implicit_argument";

/// Operation name of the top-level program object.
pub const TRANSFORMATION: &str = "transformation";

/// Attribute of a transformation holding its template declarations.
pub const TEMPLATES: &str = "templates";
