//! Query engine: the facade callers use to run SQL text.
//!
//! ```no_run
//! use xaledb::QueryEngine;
//!
//! let mut engine = QueryEngine::open("xaledb.bin")?;
//! engine.run("CREATE TABLE t (id INT PRIMARY KEY, name TEXT)")?;
//! engine.run("INSERT INTO t VALUES 1, 'Alice'")?;
//! engine.run("SELECT * FROM t")?;
//! println!("{}", engine.get_results_to_string());
//! # Ok::<(), xaledb::DbError>(())
//! ```

pub mod format;

use crate::catalog::TableRegistry;
use crate::error::Result;
use crate::sql::{Executor, Parser, StatementKind};
use crate::storage::{BinaryFileManager, ByteStore, MemoryStore};
use crate::types::ResultSet;
use std::path::Path;
use tracing::info;

pub struct QueryEngine {
    parser: Parser,
    executor: Executor,
    last_kind: Option<StatementKind>,
    results: Option<ResultSet>,
}

impl QueryEngine {
    /// File-backed engine. The file is created if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!(path = %path.as_ref().display(), "opening database");
        Self::with_store(Box::new(BinaryFileManager::new(path)))
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    pub fn with_store(store: Box<dyn ByteStore>) -> Result<Self> {
        let registry = TableRegistry::new(store)?;
        Ok(Self {
            parser: Parser::new(),
            executor: Executor::new(registry),
            last_kind: None,
            results: None,
        })
    }

    /// Parse and execute one statement. The previous result is discarded
    /// first, so a failed run leaves no result behind.
    pub fn run(&mut self, sql: &str) -> Result<bool> {
        self.results = None;
        self.last_kind = None;

        let stmt = self.parser.parse(sql)?;
        let kind = stmt.kind();
        let results = self.executor.execute(stmt)?;

        self.last_kind = Some(kind);
        self.results = Some(results);
        Ok(true)
    }

    /// Run and render in one step.
    pub fn execute(&mut self, sql: &str) -> Result<String> {
        self.run(sql)?;
        Ok(self.get_results_to_string())
    }

    /// Take the last result. A second call returns `None`.
    pub fn get_results(&mut self) -> Option<ResultSet> {
        self.results.take()
    }

    pub fn get_results_to_string(&self) -> String {
        format::render(self.last_kind, self.results.as_ref())
    }

    pub fn last_statement(&self) -> Option<StatementKind> {
        self.last_kind
    }

    pub fn registry(&self) -> &TableRegistry {
        self.executor.registry()
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.registry().table_exists(name)
    }

    /// Flush and release the data file.
    pub fn close(&self) -> Result<()> {
        self.registry().close()
    }
}
