pub mod object;
mod repo;

pub use object::ObjectStore;
pub use repo::*;
