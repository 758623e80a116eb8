#[allow(clippy::module_inception)]
mod object;
mod object_type;

pub mod commit;
pub mod tree;

pub use object::Object;
pub use object_type::ObjectKind;

pub const SPACE_BYTE: u8 = b' ';
pub const NULL_BYTE: u8 = b'\0';
