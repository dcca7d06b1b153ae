// SPDX-License-Identifier: MIT

//! Client-side stores
//!
//! This module provides:
//! - `SessionStore` - authentication identity, mirrored to durable storage
//! - `WorkflowStore` - local cache of workflows and executions
//! - `Storage` / `Navigator` - capabilities injected into the stores

pub mod model;
pub mod navigation;
mod session;
pub mod storage;
mod workflows;

pub use model::{
    AuthPayload, ExecutionStatus, LoginInput, RegisterInput, User, UserPatch, Workflow,
    WorkflowConnection, WorkflowExecution, WorkflowInput, WorkflowNode, WorkflowStatus,
};
pub use navigation::{LoggingNavigator, Navigator, LOGIN_ROUTE};
pub use session::{SessionStore, AUTH_TOKEN_KEY, AUTH_USER_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use workflows::WorkflowStore;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Advisory in-flight flag for UI disabling; not a mutual-exclusion guard
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Raise the flag until the returned guard is dropped
    pub(crate) fn enter(&self) -> BusyGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(&self.0)
    }

    pub(crate) fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the busy flag on every exit path, including early `?` returns
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// Locks are never held across an await, so a poisoned lock only means a
// panic happened mid-assignment of a plain value; the value is still usable.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_clears_on_drop() {
        let flag = BusyFlag::default();
        assert!(!flag.get());
        {
            let _busy = flag.enter();
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_busy_guard_clears_on_early_return() {
        fn failing(flag: &BusyFlag) -> Result<(), String> {
            let _busy = flag.enter();
            Err::<(), String>("boom".to_string())?;
            Ok(())
        }

        let flag = BusyFlag::default();
        assert!(failing(&flag).is_err());
        assert!(!flag.get());
    }
}
