//! Unit tests for MCP client services.

mod client_tests;
