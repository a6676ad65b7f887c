//! Common test utilities for regrid.
//!
//! This module provides shared utilities for the integration tests.

pub mod assertions;
pub mod test_grids;
