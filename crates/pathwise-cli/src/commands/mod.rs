pub mod report;
pub mod resolve;
pub mod side_effects;
pub mod version;
