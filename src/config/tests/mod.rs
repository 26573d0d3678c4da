//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Layer builders shared by the other modules
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Mode and feed selection tests
//! - `validation`: Configuration consistency validation tests

mod helpers;
