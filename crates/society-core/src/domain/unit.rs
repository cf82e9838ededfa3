//! Enumerated unit slots

use serde::{Deserialize, Serialize};
use society_shared::SelectOption;

/// One addressable villa or flat, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSlot {
    pub unit_id: String,
    pub display_label: String,
    pub structure_name: String,
    pub floor: Option<u32>,
    pub room: Option<u32>,
}

impl UnitSlot {
    pub fn to_option(&self) -> SelectOption {
        SelectOption {
            value: self.unit_id.clone(),
            label: self.display_label.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    /// Targeted by an invite nobody has registered against yet.
    Reserved,
    Occupied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedUnit {
    #[serde(flatten)]
    pub slot: UnitSlot,
    pub status: UnitStatus,
}
