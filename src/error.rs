use thiserror::Error;

/// Raised while compiling a profile. A profile that fails to compile is
/// discarded whole.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed object identifier '{0}'")]
    MalformedOid(String),

    #[error("unknown attribute type '{0}'")]
    UnknownAttributeType(String),

    #[error("invalid pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("more than one limit value for currency '{0}'")]
    DuplicateCurrency(String),

    #[error("invalid range for {field}: [{min}, {max}]")]
    InvalidRange { field: String, min: i64, max: i64 },

    #[error("invalid notBefore '{0}'")]
    InvalidNotBefore(String),

    #[error("invalid validity '{0}'")]
    InvalidValidity(String),

    #[error("missing {0}")]
    Missing(String),

    #[error("{field}: invalid value '{value}': {details}")]
    InvalidValue { field: String, value: String, details: String },

    #[error("subject attribute {attribute} is declared more than once")]
    DuplicateAttribute { attribute: String },

    #[error("extension {0} is declared more than once")]
    DuplicateExtension(String),

    #[error("subject attribute {attribute} must be mirrored into subjectAltName as {expected}")]
    MissingAltNameCoupling { attribute: String, expected: String },

    #[error("subject-to-altname mapping for {attribute} cannot target {target}: {details}")]
    InvalidAltNameTarget { attribute: String, target: String, details: String },

    #[error("extension {extension}: {details}")]
    InvalidExtension { extension: String, details: String },

    #[error("cannot process extensions: {}", .extensions.join(", "))]
    UnprocessableExtension { extensions: Vec<String> },
}

/// Per-request rejection. Never affects the compiled profile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("invalid argument {argument}: {details}")]
    InvalidArgument { argument: String, details: String },

    #[error("subject attribute {attribute} is not allowed")]
    DisallowedAttribute { attribute: String },

    #[error("subject attribute {attribute} is not allowed in the request")]
    AttributeNotOverridable { attribute: String },

    #[error("subject attribute {attribute} occurs {occurrences} times, not within [{min}, {max}]")]
    OccurrenceOutOfRange { attribute: String, occurrences: usize, min: u32, max: u32 },

    #[error("required subject attribute {attribute} is not present")]
    MissingRequiredAttribute { attribute: String },

    #[error("subject attribute {attribute} has invalid value '{value}': {details}")]
    InvalidAttributeValue { attribute: String, value: String, details: String },

    #[error("malformed extension {extension} in request: {details}")]
    MalformedRequestExtension { extension: String, details: String },

    #[error("extension {extension} needs request input: {details}")]
    MissingRequestInput { extension: String, details: String },

    #[error("extension {extension}: general name {tag} is not permitted")]
    GeneralNameNotPermitted { extension: String, tag: String },

    #[error("extension {extension}: {field} {value} is not within [{min}, {max}]")]
    OutOfRange { extension: String, field: String, value: String, min: i64, max: i64 },

    #[error("biometricInfo[{index}]: {details}")]
    BiometricNotPermitted { index: usize, details: String },

    #[error("public key not permitted: {details}")]
    KeyNotPermitted { details: String },

    #[error("cannot process extensions: {}", .extensions.join(", "))]
    UnprocessableExtension { extensions: Vec<String> },
}

/// Failure of `resolve_extensions`: either a request violation or a broken
/// internal invariant. The latter is a programming error and must be surfaced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Violation(#[from] PolicyViolation),

    #[error("internal invariant broken: {0}")]
    Invariant(String),
}
