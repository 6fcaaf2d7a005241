pub mod errors;
pub mod parameters;
