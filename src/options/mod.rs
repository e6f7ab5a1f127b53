//! @ai:module:intent Translation of harness options into the JMH CLI protocol
//! @ai:module:layer domain
//! @ai:module:public_api collect_arguments, validate, ProfilerSpec

pub mod converter;
pub mod validate;

pub use converter::collect_arguments;
pub use validate::ProfilerSpec;
