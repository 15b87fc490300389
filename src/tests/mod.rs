//! Scenario tests that drive the watch face through its host lifecycle.

mod cli_tests;
mod face_tests;
