//! Common types

use serde::{Deserialize, Serialize};

/// `{value, label}` pair the web client renders in unit pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}
