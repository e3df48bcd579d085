//! Common test utilities module
//!
//! Provides shared utilities for tests including:
//! - Temporary file management
//! - Study table fixtures
#![allow(dead_code)]

pub mod test_utils;

pub use test_utils::{
    create_test_csv, get_temp_dir, rows, sample_study, test_temp_path, StudyFiles, TempTestFile,
    ANIMAL_HEADERS, RESULT_HEADERS,
};
