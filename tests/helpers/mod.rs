//! Test helpers module
//!
//! Mock backend, in-process relay server and shared test data.

#![allow(dead_code)]

pub mod backend_mock;
pub mod relay_server;
pub mod test_data;

pub use backend_mock::*;
pub use relay_server::*;
pub use test_data::*;
