//! Relationships Module - many-to-many resolution through pivot tables

pub mod belongs_to_many;
pub mod eager;
pub mod naming;

// Re-export main types
pub use belongs_to_many::*;
pub use eager::*;
pub use naming::*;
