use std::io::{self, Read, Write};

use crate::{code_tree::CodePath, error::BitstreamError};

pub struct BinaryWriter {
    pub os: Box<[u8]>,
    pub written_bits: usize,
}

impl BinaryWriter {
    /// Hands the packed bytes to `out` and flushes it.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.os)?;
        out.flush()
    }
}

/// Packs bits most-significant-first into bytes. The last byte is zero
/// padded by [`build`](BinaryWriterBuilder::build).
pub struct BinaryWriterBuilder {
    os: Vec<u8>,
    pub written_bits: usize,
    current: u64,
    free: usize,
}

impl Default for BinaryWriterBuilder {
    fn default() -> Self {
        BinaryWriterBuilder {
            os: Vec::default(),
            written_bits: 0,
            current: 0,
            free: 8,
        }
    }
}

impl BinaryWriterBuilder {
    pub fn build(mut self) -> BinaryWriter {
        if self.free != 8 {
            self.write(self.current);
        }

        BinaryWriter {
            os: self.os.into_boxed_slice(),
            written_bits: self.written_bits,
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn write(&mut self, b: u64) {
        self.os.push(b as u8);
    }

    #[inline(always)]
    fn write_in_current(&mut self, b: u64, len: u64) -> u64 {
        self.free -= len as usize;
        self.current |= (b & ((1 << len) - 1)) << self.free;

        if self.free == 0 {
            self.write(self.current);
            self.free = 8;
            self.current = 0;
        }

        self.written_bits += len as usize;
        len
    }

    /// Writes the `len` low bits of `x`, highest first.
    #[inline(always)]
    pub fn push_bits(&mut self, x: u64, len: u64) -> u64 {
        assert!(len <= 64, "Cannot write {} bits from an integer", len);

        let mut left = len;
        while left != 0 {
            let chunk = left.min(self.free as u64);
            self.write_in_current(x >> (left - chunk), chunk);
            left -= chunk;
        }

        len
    }

    #[inline(always)]
    pub fn push_bit(&mut self, bit: bool) -> u64 {
        self.write_in_current(bit as u64, 1)
    }

    pub fn push_path(&mut self, path: &CodePath) -> u64 {
        for &bit in path.bits() {
            self.push_bit(bit);
        }
        path.len() as u64
    }
}

/// Reads bits most-significant-first out of an in-memory byte buffer.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BinaryReader {
    is: Box<[u8]>,
    pub position: usize,
    pub read_bits: usize,
    current: u64,
    fill: usize,
}

impl BinaryReader {
    pub fn new(input_stream: Box<[u8]>) -> Self {
        BinaryReader {
            is: input_stream,
            position: 0,
            read_bits: 0,
            current: 0,
            fill: 0,
        }
    }

    /// Drains `input` into a new reader. The source handle is released as
    /// soon as this returns.
    pub fn from_reader<R: Read>(mut input: R) -> io::Result<Self> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        Ok(Self::new(buf.into_boxed_slice()))
    }

    #[inline(always)]
    pub fn available_bits(&self) -> usize {
        ((self.is.len() - self.position) << 3) + self.fill
    }

    #[inline(always)]
    fn read(&mut self) -> Result<u64, BitstreamError> {
        if self.position >= self.is.len() {
            return Err(BitstreamError::UnexpectedEof { requested: 8, available: self.fill });
        }

        self.position += 1;
        Ok(self.is[self.position - 1] as u64)
    }

    #[inline(always)]
    fn read_from_current(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0;
        }

        debug_assert!(len as usize <= self.fill);

        self.read_bits += len as usize;

        self.fill -= len as usize;
        self.current >> self.fill & ((1 << len) - 1)
    }

    /// Reads a `len`-bit unsigned field. Fails without consuming anything if
    /// fewer than `len` bits are left.
    #[inline(always)]
    pub fn read_int(&mut self, len: u64) -> Result<u64, BitstreamError> {
        if len > 64 {
            return Err(BitstreamError::FieldTooWide(len));
        }

        let available = self.available_bits();
        if len as usize > available {
            return Err(BitstreamError::UnexpectedEof { requested: len as usize, available });
        }

        let mut x: u64 = 0;
        let mut left = len;
        while left != 0 {
            if self.fill == 0 {
                self.current = self.read()?;
                self.fill = 8;
            }

            let chunk = left.min(self.fill as u64);
            x = (x << chunk) | self.read_from_current(chunk);
            left -= chunk;
        }

        Ok(x)
    }

    #[inline(always)]
    pub fn read_bit(&mut self) -> Result<bool, BitstreamError> {
        self.read_int(1).map(|b| b == 1)
    }
}
