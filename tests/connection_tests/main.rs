//! Connection Tests
//!
//! Request/response, pipelining and socket handling.

mod mock;

mod execute_tests;
