//! Data models for the report pipeline.

mod fields;
mod truck;

pub use fields::{ExtractedFields, MergedRecord};
pub(crate) use fields::non_empty;
pub use truck::{TruckType, UnknownTruckType};
