//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use grnbind::{
    Catalog, CatalogConfig, ColumnOptions, Error, MemoryEngine, Result, Runtime, RuntimeHooks,
    TableOptions, TableType,
};

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output through the test harness.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Catalog over a fresh in-memory engine, detached from the shared runtime.
pub fn catalog() -> Catalog<MemoryEngine> {
    init_logging();
    let config = CatalogConfig {
        manage_runtime: false,
        log_commands: true,
    };
    Catalog::with_config(MemoryEngine::new(), config).unwrap()
}

/// A small bookstore schema:
///
/// - `Authors`: `ShortText` keys, `born: Time`
/// - `Books`: `UInt64` keys (ISBN), `title: Text`, `author: Authors`,
///   `tags: []ShortText`
/// - `Shelves`: no key, `books: []Books`
pub fn bookstore() -> Catalog<MemoryEngine> {
    let mut catalog = catalog();
    catalog
        .create_table("Authors", &TableOptions::keyed(TableType::PatKey, "ShortText"))
        .unwrap();
    catalog
        .create_column("Authors", "born", "Time", &ColumnOptions::default())
        .unwrap();
    catalog
        .create_table("Books", &TableOptions::keyed(TableType::HashKey, "UInt64"))
        .unwrap();
    for (name, spec) in [("title", "Text"), ("author", "Authors"), ("tags", "[]ShortText")] {
        catalog
            .create_column("Books", name, spec, &ColumnOptions::default())
            .unwrap();
    }
    catalog.create_table("Shelves", &TableOptions::default()).unwrap();
    catalog
        .create_column("Shelves", "books", "[]Books", &ColumnOptions::default())
        .unwrap();
    catalog
}

// ============================================================================
// Runtime hooks
// ============================================================================

/// Hooks that count calls and can be told to fail.
#[derive(Debug, Default)]
pub struct CountingHooks {
    pub inits: AtomicUsize,
    pub fins: AtomicUsize,
    pub fail_init: bool,
}

impl CountingHooks {
    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn fins(&self) -> usize {
        self.fins.load(Ordering::SeqCst)
    }
}

impl RuntimeHooks for CountingHooks {
    fn init(&self) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(Error::Runtime {
                reason: "init refused".to_string(),
            });
        }
        Ok(())
    }

    fn fin(&self) -> Result<()> {
        self.fins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A private runtime driven by fresh counting hooks.
pub fn counting_runtime(fail_init: bool) -> (Arc<Runtime>, Arc<CountingHooks>) {
    let hooks = Arc::new(CountingHooks {
        fail_init,
        ..CountingHooks::default()
    });
    let runtime = Arc::new(Runtime::new(hooks.clone()));
    (runtime, hooks)
}
