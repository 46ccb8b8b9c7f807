//! Tests for command-line parsing and configuration resolution

mod args_tests;
