//! End-to-end loader tests.

mod decoding;
mod files;
mod scenarios;
