#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;

// ***************************************************************************
//                               UserRegistry
// ***************************************************************************
/** The in-memory mapping of user id to user name.  The registry lives exactly
 * as long as the process; nothing is ever written to disk.
 *
 * Cloning a registry clones the handle, not the map, so every endpoint that
 * holds a clone sees the same users.  All access is serialized through a
 * single mutex, which is only held for the duration of one map operation.
 */
#[derive(Clone, Debug, Default)]
pub struct UserRegistry {
    users: Arc<Mutex<HashMap<i32, String>>>,
}

impl UserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        UserRegistry::default()
    }

    // ---------------------------------------------------------------------------
    // add:
    // ---------------------------------------------------------------------------
    /** Insert or overwrite the name for id.  The previous name, if any, is
     * returned so callers can tell an insert from an overwrite.
     */
    pub fn add(&self, id: i32, name: String) -> Option<String> {
        self.users.lock().insert(id, name)
    }

    /// Return a copy of the name stored for id.
    pub fn get(&self, id: i32) -> Option<String> {
        self.users.lock().get(&id).cloned()
    }

    /// Remove id, returning the name that was stored for it.
    pub fn delete(&self, id: i32) -> Option<String> {
        self.users.lock().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.lock().is_empty()
    }
}
