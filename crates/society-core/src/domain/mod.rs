//! # Society Core - Domain Module
//! 
//! Domain entities for the society onboarding service.

pub mod account;
pub mod otp;
pub mod property;
pub mod unit;

// Re-export all entities and enums
pub use account::{Account, Role};
pub use otp::{AttemptOutcome, OtpEntry, OtpPurpose};
pub use property::{ContactInfo, HousingType, InviteRecord, InviteRole, Property, StructuralUnit};
pub use unit::{ClassifiedUnit, UnitSlot, UnitStatus};
