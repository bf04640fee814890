/// Table registry: owns every table and persists them as one image
use crate::error::{DbError, ExecutionError, Result};
use crate::storage::ByteStore;
use crate::types::codec::{len_u32, ByteReader, ByteWriter};
use crate::types::Table;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Table registry
///
/// On-disk image: `table_count:u32` followed by one
/// `name_len:u32, name, data_len:u32, data` entry per table, where `data`
/// is the table's own serialized form. The whole image is rewritten on
/// every save.
pub struct TableRegistry {
    store: Box<dyn ByteStore>,
    /// Sorted so listing and file output are deterministic
    tables: BTreeMap<String, Table>,
}

impl TableRegistry {
    /// Open the store if needed and load whatever it holds.
    pub fn new(store: Box<dyn ByteStore>) -> Result<Self> {
        if !store.is_open() {
            store.open()?;
        }
        let mut registry = Self {
            store,
            tables: BTreeMap::new(),
        };
        registry.load_all()?;
        Ok(registry)
    }

    /// Create an empty table. Returns `None` if the name is taken.
    pub fn create_table(&mut self, name: &str) -> Result<Option<&mut Table>> {
        if self.tables.contains_key(name) {
            return Ok(None);
        }
        self.tables.insert(name.to_string(), Table::new(name));
        self.save_all()?;
        Ok(self.tables.get_mut(name))
    }

    /// Register a fully built table and persist once.
    pub fn register_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return Err(ExecutionError::TableExists(table.name().to_string()).into());
        }
        self.tables.insert(table.name().to_string(), table);
        self.save_all()
    }

    pub fn drop_table(&mut self, name: &str) -> Result<bool> {
        if self.tables.remove(name).is_none() {
            return Ok(false);
        }
        self.save_all()?;
        Ok(true)
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Run `f` against a table and persist if it succeeds.
    pub fn modify_table<R, F>(&mut self, name: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Table) -> Result<R>,
    {
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| ExecutionError::TableNotFound(name.to_string()))?;
        let out = f(table)?;
        self.save_all()?;
        Ok(out)
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new();
        w.put_u32(len_u32(self.tables.len())?);
        for (name, table) in &self.tables {
            w.put_str(name)?;
            w.put_bytes(&table.serialize()?)?;
        }
        Ok(w.into_inner())
    }

    /// Rewrite the whole image at offset 0, drop any stale tail and sync.
    ///
    /// A failure here leaves memory ahead of disk; there is no retry.
    pub fn save_all(&self) -> Result<()> {
        let result = self.encode().and_then(|image| {
            self.store.write_at(0, &image)?;
            self.store.truncate(image.len() as u64)?;
            self.store.sync()?;
            Ok(image.len())
        });
        match result {
            Ok(bytes) => {
                info!(tables = self.tables.len(), bytes, "registry saved");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "registry save failed; in-memory tables are not on disk");
                Err(e)
            }
        }
    }

    /// Replace the in-memory tables with the store's contents.
    /// A store shorter than the table count header is treated as empty.
    pub fn load_all(&mut self) -> Result<()> {
        let size = self.store.size()?;
        if size < 4 {
            self.tables.clear();
            info!("registry empty; starting fresh");
            return Ok(());
        }

        let len = usize::try_from(size)
            .map_err(|_| DbError::StorageCorrupt(format!("data file too large: {} bytes", size)))?;
        let image = self.store.read_at(0, len)?;
        let mut r = ByteReader::new(&image);

        let count = r.get_u32()?;
        let mut tables = BTreeMap::new();
        for _ in 0..count {
            let name = r.get_str()?;
            let table = Table::deserialize(r.get_bytes()?)?;
            if table.name() != name {
                return Err(DbError::StorageCorrupt(format!(
                    "directory entry '{}' holds table '{}'",
                    name,
                    table.name()
                )));
            }
            if tables.insert(name.clone(), table).is_some() {
                return Err(DbError::StorageCorrupt(format!("table '{}' stored twice", name)));
            }
        }

        if r.remaining() != 0 {
            return Err(DbError::StorageCorrupt(format!(
                "{} trailing bytes after {} tables",
                r.remaining(),
                count
            )));
        }

        info!(tables = tables.len(), bytes = size, "registry loaded");
        self.tables = tables;
        Ok(())
    }

    /// Flush and release the store.
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}
