use std::{fmt, str::FromStr};

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::{
    bitstreams::{BinaryReader, BinaryWriterBuilder},
    code_tree::CodeTree,
    constants::{ALPH_SIZE, BITS_PER_INT, STORE_COUNTS, STORE_TREE},
    error::{HuffError, Result},
    frequency::FrequencyTable,
};

/// How the decoder learns the code: from the raw frequency table or from
/// the serialized tree shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFormat {
    Counts,
    Tree,
}

impl Default for HeaderFormat {
    fn default() -> Self {
        HeaderFormat::Tree
    }
}

impl HeaderFormat {
    /// Value of the selector field that announces this format.
    pub fn selector(self) -> u32 {
        match self {
            HeaderFormat::Counts => STORE_COUNTS,
            HeaderFormat::Tree => STORE_TREE,
        }
    }

    pub fn from_selector(value: u32) -> Result<Self> {
        match value {
            STORE_COUNTS => Ok(HeaderFormat::Counts),
            STORE_TREE => Ok(HeaderFormat::Tree),
            _ => Err(HuffError::CorruptFormat(format!("unknown header format {:#010x}", value))),
        }
    }

    pub fn codec(self) -> &'static dyn HeaderCodec {
        match self {
            HeaderFormat::Counts => &CountsHeader,
            HeaderFormat::Tree => &TreeHeader,
        }
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderFormat::Counts => f.write_str("counts"),
            HeaderFormat::Tree => f.write_str("tree"),
        }
    }
}

impl FromStr for HeaderFormat {
    type Err = HuffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counts" | "store_counts" => Ok(HeaderFormat::Counts),
            "tree" | "store_tree" => Ok(HeaderFormat::Tree),
            other => Err(HuffError::Config(format!("unknown header format '{}', expected 'counts' or 'tree'", other))),
        }
    }
}

/// The part of the header that follows the format selector.
pub trait HeaderCodec {
    fn format(&self) -> HeaderFormat;

    /// Exact number of bits [`write_payload`](HeaderCodec::write_payload) emits for `tree`.
    fn payload_bits(&self, tree: &CodeTree) -> u64;

    fn write_payload(&self, freqs: &FrequencyTable, tree: &CodeTree, writer: &mut BinaryWriterBuilder) -> Result<u64>;

    fn read_payload(&self, reader: &mut BinaryReader) -> Result<CodeTree>;
}

/// Every symbol count as a `BITS_PER_INT` field, in symbol order. The
/// decoder rebuilds the tree from the counts exactly as the encoder did.
pub struct CountsHeader;

impl HeaderCodec for CountsHeader {
    fn format(&self) -> HeaderFormat {
        HeaderFormat::Counts
    }

    fn payload_bits(&self, _tree: &CodeTree) -> u64 {
        (ALPH_SIZE * BITS_PER_INT) as u64
    }

    fn write_payload(&self, freqs: &FrequencyTable, _tree: &CodeTree, writer: &mut BinaryWriterBuilder) -> Result<u64> {
        let mut written = 0;
        for (symbol, &count) in freqs.counts().iter().enumerate() {
            if count > u32::MAX as u64 {
                return Err(HuffError::InvalidArgument(format!(
                    "symbol {} occurs {} times, more than a {}-bit count can hold", symbol, count, BITS_PER_INT
                )));
            }
            written += writer.push_bits(count, BITS_PER_INT as u64);
        }
        Ok(written)
    }

    fn read_payload(&self, reader: &mut BinaryReader) -> Result<CodeTree> {
        let mut counts = Vec::with_capacity(ALPH_SIZE);
        for _ in 0..ALPH_SIZE {
            let count = reader
                .read_int(BITS_PER_INT as u64)
                .map_err(|_| HuffError::TruncatedStream("frequency table"))?;
            counts.push(count);
        }

        CodeTree::from_frequencies(&FrequencyTable::from_counts(&counts)?)
    }
}

/// The tree's bit length as a `BITS_PER_INT` field, then the pre-order tree.
pub struct TreeHeader;

impl HeaderCodec for TreeHeader {
    fn format(&self) -> HeaderFormat {
        HeaderFormat::Tree
    }

    fn payload_bits(&self, tree: &CodeTree) -> u64 {
        BITS_PER_INT as u64 + tree.serialized_bits()
    }

    fn write_payload(&self, _freqs: &FrequencyTable, tree: &CodeTree, writer: &mut BinaryWriterBuilder) -> Result<u64> {
        Ok(writer.push_bits(tree.serialized_bits(), BITS_PER_INT as u64) + tree.write_tree(writer))
    }

    fn read_payload(&self, reader: &mut BinaryReader) -> Result<CodeTree> {
        let declared = reader
            .read_int(BITS_PER_INT as u64)
            .map_err(|_| HuffError::TruncatedStream("tree size"))?;

        let tree = CodeTree::read_tree(reader)?;

        // The tree is self-delimiting, the size field is only advisory
        if declared != tree.serialized_bits() {
            warn!(declared, parsed = tree.serialized_bits(), "tree size field disagrees with the parsed tree");
        }

        Ok(tree)
    }
}
