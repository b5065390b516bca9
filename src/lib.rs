//! Certificate profile engine: compiles a declarative certificate profile
//! and, per request, works out the extensions an issuing CA places into the
//! certificate.

pub mod conf;
pub mod error;
pub mod profile;

pub use conf::ProfileConf;
pub use error::{ConfigError, PolicyViolation, ResolveError};
pub use profile::{ExtensionHook, ExtensionRequest, ExtensionValue, ExtensionValues, Profile};
