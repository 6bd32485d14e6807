//! Static Huffman compression of byte streams.
//!
//! Compression is two passes over the input: [`preprocess_compress`] counts
//! the words, builds the code tree and predicts the output size, then
//! [`compress`] writes the magic number, a header in the chosen
//! [`HeaderFormat`] and the code of every word followed by the end-of-stream
//! code. [`uncompress`] reads the header back and walks the tree bit by bit.

pub mod bitstreams;
pub mod code_tree;
pub mod codec;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod header;
pub mod properties;
pub mod ranked_queue;

pub use codec::{compress, preprocess_compress, uncompress, CompressOutcome, CompressSession, HuffProcessor};
pub use error::{HuffError, Result};
pub use header::HeaderFormat;
