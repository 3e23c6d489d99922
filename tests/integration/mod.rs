//! Integration tests for dil-release

mod helpers;
mod test_cli;
mod test_pipeline;
