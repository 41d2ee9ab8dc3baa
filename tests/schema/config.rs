//! Loading `grnbind.toml` and opening catalogs from it.

use crate::common::*;
use grnbind::{Catalog, CatalogConfig, Error, MemoryEngine, CONFIG_FILE_NAME};
use tempfile::TempDir;

#[test]
fn default_file_is_written_once_and_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    CatalogConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(
        CatalogConfig::from_file(&path).unwrap(),
        CatalogConfig::default()
    );

    std::fs::write(&path, "manage_runtime = false\n").unwrap();
    CatalogConfig::write_default_if_missing(&path).unwrap();
    assert!(!CatalogConfig::from_file(&path).unwrap().manage_runtime);
}

#[test]
fn unmanaged_config_leaves_runtime_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    CatalogConfig {
        manage_runtime: false,
        log_commands: true,
    }
    .write_to_file(&path)
    .unwrap();

    let (runtime, hooks) = counting_runtime(false);
    let config = CatalogConfig::from_file(&path).unwrap();
    let catalog = Catalog::open_with_runtime(MemoryEngine::new(), config, &runtime).unwrap();
    assert!(catalog.config().log_commands);
    assert_eq!(runtime.active_count(), 0);
    catalog.close().unwrap();
    assert_eq!(hooks.inits(), 0);
}

#[test]
fn malformed_files_are_config_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "manage_runtime = \"yes\"").unwrap();
    assert!(matches!(
        CatalogConfig::from_file(&path),
        Err(Error::Config { .. })
    ));
    assert!(matches!(
        CatalogConfig::from_file(&dir.path().join("missing.toml")),
        Err(Error::Config { .. })
    ));
}
