pub mod catalog;
pub mod lead;
