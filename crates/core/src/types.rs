//! Identifier types
//!
//! - RowId: engine row identifier
//! - ObjectId: engine object handle (table, column or accessor)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine row identifier.
pub type RowId = u32;

/// Reserved row identifier meaning "no row".
pub const NIL_ID: RowId = 0;

/// Opaque handle of an engine object.
///
/// Two resolutions of the same name yield the same handle until the object
/// is removed or replaced, which is how schema drift is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Wrap a raw engine handle
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw engine handle
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::new(7).to_string(), "obj#7");
    }

    #[test]
    fn test_nil_id_is_zero() {
        assert_eq!(NIL_ID, 0);
    }
}
