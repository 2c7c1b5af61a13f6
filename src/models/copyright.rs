//! Copyright model

use serde::{Deserialize, Serialize};

/// Copyright statement of a book
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Copyright {
    pub rights_holder: String,
    pub rights: String,
    pub date_copyrighted: String,
}

impl Copyright {
    /// Build a copyright from optional parts, missing parts becoming empty.
    ///
    /// Returns `None` when every part is missing or empty.
    pub fn from_parts(
        rights_holder: Option<String>,
        rights: Option<String>,
        date_copyrighted: Option<String>,
    ) -> Option<Self> {
        if rights_holder.is_none() && rights.is_none() && date_copyrighted.is_none() {
            return None;
        }
        let copyright = Self {
            rights_holder: rights_holder.unwrap_or_default(),
            rights: rights.unwrap_or_default(),
            date_copyrighted: date_copyrighted.unwrap_or_default(),
        };
        if copyright.is_empty() {
            None
        } else {
            Some(copyright)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rights_holder.is_empty() && self.rights.is_empty() && self.date_copyrighted.is_empty()
    }
}
