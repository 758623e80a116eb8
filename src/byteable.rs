use std::rc::Rc;

use crate::Result;

/// Conversion between a value and the exact bytes it is hashed and stored as.
pub trait Byteable {
    fn as_bytes(&self) -> Result<Rc<[u8]>>;
    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}
