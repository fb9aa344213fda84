//! Workspace integration tests: the full secret → token → session pipeline
//! over an on-disk record store.

mod authorizer_test;
mod helpers;
mod session_test;
