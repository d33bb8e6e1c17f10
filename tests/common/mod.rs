//! Common test utilities for wayback-mirror E2E tests

#[allow(dead_code)]
pub mod archive;
#[allow(dead_code)]
pub mod assertions;
#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use archive::*;
#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
