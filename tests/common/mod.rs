//! Common test utilities
//!
//! This module is shared across all integration tests

use takabot::storage::db::DbPool;
use takabot::storage::create_pool;
use tempfile::NamedTempFile;

/// A registry backed by a throwaway SQLite file.
///
/// The temp file lives as long as the fixture, so the pool stays valid for
/// the whole test.
pub struct TestDb {
    _file: NamedTempFile,
    pub pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let file = NamedTempFile::new().expect("failed to create temp db file");
        let pool = create_pool(file.path().to_str().expect("temp path is not utf-8")).expect("failed to create pool");
        Self { _file: file, pool }
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}
