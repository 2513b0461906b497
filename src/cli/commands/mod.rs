//! CLI command implementations

pub mod aggregate;
pub mod init;
pub mod publish;
pub mod validate;
