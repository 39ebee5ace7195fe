//! sea-orm entities, one module per table.

pub mod certification;
pub mod certification_definition;
pub mod dive_log;
pub mod dive_plan;
pub mod gear_item;
pub mod gear_kit;
pub mod gear_kit_item;
pub mod unit_preferences;
pub mod user;
