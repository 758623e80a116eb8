pub mod builder;
pub mod checkout;
pub mod entry;

pub use builder::TreeBuilder;
pub use checkout::checkout_commit;
pub use entry::{display, display_names, from_bytes};
