//! The `utils` module provides shared utilities used across the `dashpub`
//! application: the error taxonomy and logging setup.

pub mod error;
pub mod logging;
