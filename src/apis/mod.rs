pub mod base;
pub mod factory;
pub mod fields;

pub mod aws;
pub mod nvidia;
pub mod uipath;
