pub mod cleanup;
pub mod plan;
pub mod run;
pub mod session;
pub mod validate;
