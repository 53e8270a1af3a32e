//! Control-values infrastructure

mod repository;

pub use repository::StorageControlValuesRepository;
