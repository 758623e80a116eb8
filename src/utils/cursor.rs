use std::io::{BufRead, Cursor};

use crate::{Error, Result};

pub trait EasyRead {
    fn read_until_checked(&mut self, byte: u8) -> Result<Vec<u8>>;
    fn is_exhausted(&self) -> bool;
}

impl<T: AsRef<[u8]>> EasyRead for Cursor<T> {
    /// Reads until `byte`, returning what was read without the delimiter.
    ///
    /// It already handles the errors (not reading until expected byte or not reading at all)
    /// and returns them as a formatting error, so it can just be handled with the `?` operator.
    fn read_until_checked(&mut self, byte: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        BufRead::read_until(self, byte, &mut buf)?;
        if buf.pop() != Some(byte) {
            return Err(Error::Formatting(format!(
                "expected byte {:#04x} at position {}",
                byte,
                self.position()
            )));
        }
        Ok(buf)
    }

    fn is_exhausted(&self) -> bool {
        self.position() as usize >= self.get_ref().as_ref().len()
    }
}
