//! Process-wide engine runtime lifecycle
//!
//! The engine library keeps global state that must be initialized once
//! before the first connection and torn down after the last one. A
//! [`Runtime`] reference-counts connections:
//!
//! - the first [`Runtime::acquire`] (count 0→1) runs [`RuntimeHooks::init`]
//! - the last release (count 1→0) runs [`RuntimeHooks::fin`]
//!
//! Callers that manage the engine runtime themselves call
//! [`Runtime::disable_init_fin`] once; hooks are never run afterwards.
//!
//! A failed initialization is sticky: every later `acquire` fails until
//! [`Runtime::clear_failure`] is called.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use grnbind_core::{Error, Result};

/// One-time engine initialization and teardown.
pub trait RuntimeHooks: Send + Sync {
    /// Initialize the engine library.
    fn init(&self) -> Result<()>;

    /// Finalize the engine library.
    fn fin(&self) -> Result<()>;
}

/// Hooks for engines without global state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl RuntimeHooks for NoopHooks {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn fin(&self) -> Result<()> {
        Ok(())
    }
}

struct RuntimeState {
    count: usize,
    disabled: bool,
    failure: Option<String>,
    hooks: Arc<dyn RuntimeHooks>,
}

/// Reference-counted runtime lifecycle.
pub struct Runtime {
    state: Mutex<RuntimeState>,
}

// Uses parking_lot::Mutex so a panicking hook cannot poison the counter.
static GLOBAL_RUNTIME: Lazy<Arc<Runtime>> =
    Lazy::new(|| Arc::new(Runtime::new(Arc::new(NoopHooks))));

impl Runtime {
    /// Create a runtime driving `hooks`.
    pub fn new(hooks: Arc<dyn RuntimeHooks>) -> Self {
        Self {
            state: Mutex::new(RuntimeState {
                count: 0,
                disabled: false,
                failure: None,
                hooks,
            }),
        }
    }

    /// The process-wide runtime used by catalogs by default.
    pub fn global() -> Arc<Runtime> {
        Arc::clone(&GLOBAL_RUNTIME)
    }

    /// Replace the hooks.
    ///
    /// # Errors
    ///
    /// Returns `Error::Runtime` while any guard is outstanding.
    pub fn set_hooks(&self, hooks: Arc<dyn RuntimeHooks>) -> Result<()> {
        let mut state = self.state.lock();
        if state.count != 0 {
            return Err(Error::Runtime {
                reason: format!("cannot replace hooks with {} active users", state.count),
            });
        }
        state.hooks = hooks;
        Ok(())
    }

    /// Never run init/fin hooks again. Counting continues so guards balance.
    pub fn disable_init_fin(&self) {
        self.state.lock().disabled = true;
    }

    /// Check if init/fin hooks are disabled
    pub fn is_disabled(&self) -> bool {
        self.state.lock().disabled
    }

    /// Number of outstanding guards
    pub fn active_count(&self) -> usize {
        self.state.lock().count
    }

    /// The recorded initialization failure, if any
    pub fn failure(&self) -> Option<String> {
        self.state.lock().failure.clone()
    }

    /// Forget a recorded initialization failure so `acquire` may retry.
    pub fn clear_failure(&self) {
        self.state.lock().failure = None;
    }

    /// Register a user, initializing the engine on the 0→1 transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::Runtime` if initialization fails now or failed before.
    pub fn acquire(self: &Arc<Self>) -> Result<RuntimeGuard> {
        self.init()?;
        Ok(RuntimeGuard {
            runtime: Some(Arc::clone(self)),
        })
    }

    fn init(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.failure {
            return Err(Error::Runtime {
                reason: format!("runtime initialization failed earlier: {}", reason),
            });
        }
        if state.count == 0 && !state.disabled {
            if let Err(e) = state.hooks.init() {
                state.failure = Some(e.to_string());
                return Err(Error::Runtime {
                    reason: format!("runtime initialization failed: {}", e),
                });
            }
            info!("engine runtime initialized");
        }
        state.count += 1;
        Ok(())
    }

    // Teardown failure is reported, but the count still drops: the guard
    // that called this is gone and cannot retry.
    fn fin(&self) -> Result<()> {
        let mut state = self.state.lock();
        match state.count {
            0 => {
                return Err(Error::Runtime {
                    reason: "runtime is not initialized".to_string(),
                })
            }
            1 => {
                state.count = 0;
                if !state.disabled {
                    state.hooks.fin().map_err(|e| Error::Runtime {
                        reason: format!("runtime finalization failed: {}", e),
                    })?;
                    info!("engine runtime finalized");
                }
            }
            _ => state.count -= 1,
        }
        Ok(())
    }
}

/// One registered runtime user. Released explicitly or on drop.
#[must_use = "dropping the guard releases the runtime immediately"]
pub struct RuntimeGuard {
    runtime: Option<Arc<Runtime>>,
}

impl RuntimeGuard {
    /// Release now, reporting teardown failure.
    pub fn release(mut self) -> Result<()> {
        match self.runtime.take() {
            Some(runtime) => runtime.fin(),
            None => Ok(()),
        }
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            if let Err(e) = runtime.fin() {
                warn!(error = %e, "runtime release failed during drop");
            }
        }
    }
}

impl std::fmt::Debug for RuntimeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeGuard")
            .field("active", &self.runtime.is_some())
            .finish()
    }
}
