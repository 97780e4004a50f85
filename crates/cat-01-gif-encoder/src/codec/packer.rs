//! LSB-first code packing and data sub-blocks.

/// Maximum payload of one data sub-block.
pub const SUB_BLOCK_LEN: usize = 255;

/// Packs fixed-width codes into bytes, least significant bit first.
#[derive(Debug)]
pub struct CodePacker {
    bytes: Vec<u8>,
    acc: u32,
    bits: u32,
    width: u32,
}

impl CodePacker {
    /// `width` must be between 1 and 12 bits.
    pub fn new(width: u8) -> Self {
        debug_assert!((1..=12).contains(&width));
        Self {
            bytes: Vec::new(),
            acc: 0,
            bits: 0,
            width: u32::from(width),
        }
    }

    pub fn with_capacity(width: u8, codes: usize) -> Self {
        let mut packer = Self::new(width);
        packer.bytes = Vec::with_capacity(codes * width as usize / 8 + 1);
        packer
    }

    pub fn push(&mut self, code: u16) {
        let mask = (1u32 << self.width) - 1;
        self.acc |= (u32::from(code) & mask) << self.bits;
        self.bits += self.width;
        while self.bits >= 8 {
            self.bytes.push((self.acc & 0xFF) as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    /// Flush the partial byte, if any, and return the packed stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.bytes.push((self.acc & 0xFF) as u8);
        }
        self.bytes
    }
}

/// Append `data` as length-prefixed sub-blocks followed by the zero-length
/// block terminator.
pub fn write_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(SUB_BLOCK_LEN) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0x00);
}
