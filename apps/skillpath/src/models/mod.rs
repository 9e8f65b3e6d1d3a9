pub mod analysis;
pub mod learning;
pub mod profile;
