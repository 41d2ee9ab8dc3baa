//! Runtime init/fin ownership shared by several catalogs.

use crate::common::*;
use grnbind::{Catalog, CatalogConfig, Error, MemoryEngine};

#[test]
fn first_open_inits_and_last_close_fins() {
    let (runtime, hooks) = counting_runtime(false);
    let config = CatalogConfig::default();

    let a = Catalog::open_with_runtime(MemoryEngine::new(), config.clone(), &runtime).unwrap();
    let b = Catalog::open_with_runtime(MemoryEngine::new(), config, &runtime).unwrap();
    assert_eq!((hooks.inits(), runtime.active_count()), (1, 2));

    a.close().unwrap();
    assert_eq!(hooks.fins(), 0);
    b.close().unwrap();
    assert_eq!((hooks.inits(), hooks.fins()), (1, 1));
}

#[test]
fn dropped_catalog_releases_its_guard() {
    let (runtime, hooks) = counting_runtime(false);
    {
        let _catalog =
            Catalog::open_with_runtime(MemoryEngine::new(), CatalogConfig::default(), &runtime)
                .unwrap();
        assert_eq!(runtime.active_count(), 1);
    }
    assert_eq!(runtime.active_count(), 0);
    assert_eq!(hooks.fins(), 1);
}

#[test]
fn disabled_runtime_never_runs_hooks() {
    let (runtime, hooks) = counting_runtime(false);
    runtime.disable_init_fin();
    let catalog =
        Catalog::open_with_runtime(MemoryEngine::new(), CatalogConfig::default(), &runtime)
            .unwrap();
    catalog.close().unwrap();
    assert_eq!((hooks.inits(), hooks.fins()), (0, 0));
    assert!(runtime.is_disabled());
}

#[test]
fn failed_init_blocks_every_open_until_cleared() {
    let (runtime, hooks) = counting_runtime(true);
    for _ in 0..2 {
        let err =
            Catalog::open_with_runtime(MemoryEngine::new(), CatalogConfig::default(), &runtime)
                .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }
    assert_eq!(hooks.inits(), 1);
    assert!(runtime.failure().is_some());

    runtime.clear_failure();
    assert!(runtime.failure().is_none());
}
