pub mod extractors;
pub mod ipn;
