//! Model System
//!
//! - `core_trait`: typed `Model` trait with table metadata
//! - `record`: dynamically shaped row with relation and pivot slots

pub mod core_trait;
pub mod record;

pub use core_trait::Model;
pub use record::Record;
