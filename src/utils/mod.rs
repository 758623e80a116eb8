pub mod cursor;
pub mod path;
pub mod zlib;
