pub mod oids;
pub mod directory_string;
pub mod relative_distinguished_name;
pub mod name;
pub mod general_name;
pub mod algorithm_identifier;
pub mod key_algorithm_identifier;
pub mod signature_algorithm_identifier;
pub mod subject_public_key_info;
pub mod x509_version;
pub mod extensions;

pub use directory_string::*;
pub use relative_distinguished_name::*;
pub use name::*;
pub use general_name::*;
pub use algorithm_identifier::*;
pub use key_algorithm_identifier::*;
pub use signature_algorithm_identifier::*;
pub use subject_public_key_info::*;
pub use x509_version::*;
