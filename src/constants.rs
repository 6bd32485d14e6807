//! Fixed parameters of the alphabet and of the wire format.

/// Width of one input/output word.
pub const BITS_PER_WORD: usize = 8;
/// Number of ordinary symbols, one per possible word.
pub const ALPH_SIZE: usize = 1 << BITS_PER_WORD;
/// Width of every integer field in the header (magic, selector, counts, tree size).
pub const BITS_PER_INT: usize = 32;
/// Reserved end-of-payload symbol, one past the largest word.
pub const PSEUDO_EOF: usize = ALPH_SIZE;
/// Width of a leaf value in the serialized tree; one extra bit so `PSEUDO_EOF` fits.
pub const BITS_PER_LEAF_VALUE: usize = BITS_PER_WORD + 1;

pub const MAGIC_NUMBER: u32 = 0xface_8200;
pub const STORE_COUNTS: u32 = 0x7374_6300;
pub const STORE_TREE: u32 = 0x7374_7400;
