pub mod decoder;
pub mod delta;
pub mod resolver;

pub use decoder::parse;
pub use resolver::resolve;

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers to assemble packs by hand.

    use std::io::Write;

    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    use crate::hashing::Hash;
    use crate::object::ObjectKind;

    pub fn encode_type_and_size(code: u8, size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut byte = (code << 4) | (size & 0x0f) as u8;
        let mut rest = size >> 4;
        while rest > 0 {
            out.push(byte | 0x80);
            byte = (rest & 0x7f) as u8;
            rest >>= 7;
        }
        out.push(byte);
        out
    }

    pub fn encode_base_distance(distance: usize) -> Vec<u8> {
        let mut out = vec![(distance & 0x7f) as u8];
        let mut rest = distance >> 7;
        while rest > 0 {
            rest -= 1;
            out.push(0x80 | (rest & 0x7f) as u8);
            rest >>= 7;
        }
        out.reverse();
        out
    }

    pub fn encode_size(mut size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let byte = (size & 0x7f) as u8;
            size >>= 7;
            if size == 0 {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    /// The two sizes every delta starts with.
    pub fn delta_header(base_size: usize, target_size: usize) -> Vec<u8> {
        let mut header = encode_size(base_size);
        header.extend(encode_size(target_size));
        header
    }

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn code(kind: ObjectKind) -> u8 {
        match kind {
            ObjectKind::Commit => 1,
            ObjectKind::Tree => 2,
            ObjectKind::Blob => 3,
            ObjectKind::Tag => 4,
        }
    }

    pub struct PackBuilder {
        body: Vec<u8>,
        count: u32,
    }

    impl PackBuilder {
        pub fn new() -> Self {
            Self {
                body: Vec::new(),
                count: 0,
            }
        }

        fn offset(&self) -> usize {
            12 + self.body.len()
        }

        fn push(&mut self, header: Vec<u8>, data: &[u8]) -> usize {
            let offset = self.offset();
            self.body.extend(header);
            self.body.extend(compress(data));
            self.count += 1;
            offset
        }

        /// Appends an entry with an arbitrary type code.
        pub fn raw_entry(&mut self, code: u8, data: &[u8]) -> usize {
            self.push(encode_type_and_size(code, data.len()), data)
        }

        /// Appends a full object, returning its offset.
        pub fn object(&mut self, kind: ObjectKind, data: &[u8]) -> usize {
            self.raw_entry(code(kind), data)
        }

        pub fn ofs_delta(&mut self, base_offset: usize, delta: &[u8]) -> usize {
            let distance = self.offset() - base_offset;
            self.ofs_delta_raw(distance, delta)
        }

        pub fn ofs_delta_raw(&mut self, distance: usize, delta: &[u8]) -> usize {
            let mut header = encode_type_and_size(6, delta.len());
            header.extend(encode_base_distance(distance));
            self.push(header, delta)
        }

        pub fn ref_delta(&mut self, base: &Hash, delta: &[u8]) -> usize {
            let mut header = encode_type_and_size(7, delta.len());
            header.extend(base.as_ref());
            self.push(header, delta)
        }

        pub fn finish_without_trailer(self) -> Vec<u8> {
            let mut pack = b"PACK".to_vec();
            pack.extend(2u32.to_be_bytes());
            pack.extend(self.count.to_be_bytes());
            pack.extend(self.body);
            pack
        }

        /// Header, entries and the trailing checksum.
        pub fn finish(self) -> Vec<u8> {
            let mut pack = self.finish_without_trailer();
            let checksum = Hash::compute(&pack);
            pack.extend(checksum.as_ref());
            pack
        }
    }
}
