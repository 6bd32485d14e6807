use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    bitstreams::{BinaryReader, BinaryWriterBuilder},
    code_tree::{CodeTree, TreeNode},
    constants::{BITS_PER_INT, BITS_PER_WORD, MAGIC_NUMBER, PSEUDO_EOF},
    error::{HuffError, Result},
    frequency::FrequencyTable,
    header::HeaderFormat,
};

/// Everything the pre-pass learned about one input, needed to emit it.
#[derive(Clone, Debug)]
pub struct CompressSession {
    freqs: FrequencyTable,
    tree: CodeTree,
    format: HeaderFormat,
    original_bits: u64,
    compressed_bits: u64,
}

impl CompressSession {
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.freqs
    }

    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    pub fn format(&self) -> HeaderFormat {
        self.format
    }

    pub fn original_bits(&self) -> u64 {
        self.original_bits
    }

    /// Exact size of the output [`compress`] produces for this session.
    pub fn compressed_bits(&self) -> u64 {
        self.compressed_bits
    }

    /// Bits saved by compressing; negative when the output would grow.
    pub fn savings(&self) -> i64 {
        self.original_bits as i64 - self.compressed_bits as i64
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Debug)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CompressOutcome {
    Written { bits: u64 },
    /// Nothing was written because the output would not be smaller than the input.
    Declined { original_bits: u64, compressed_bits: u64 },
}

#[derive(Debug)]
enum HeaderState {
    ExpectMagic,
    ExpectHeaderSelector,
    ExpectHeaderPayload(HeaderFormat),
}

#[derive(Clone, Copy, Debug)]
enum WalkState<'t> {
    Walking(&'t TreeNode),
    Done,
}

/// Reads words until the input runs out or a `PSEUDO_EOF` value shows up.
fn words(reader: &mut BinaryReader) -> impl Iterator<Item = usize> + '_ {
    std::iter::from_fn(move || reader.read_int(BITS_PER_WORD as u64).ok().map(|w| w as usize))
        .take_while(|&w| w != PSEUDO_EOF)
}

fn code_len(tree: &CodeTree, symbol: usize) -> Result<u64> {
    tree.path(symbol)
        .map(|p| p.len() as u64)
        .ok_or_else(|| HuffError::PreconditionViolation(format!("symbol {} has no code in the tree", symbol)))
}

fn projected_bits(freqs: &FrequencyTable, tree: &CodeTree, format: HeaderFormat) -> Result<u64> {
    let mut bits = 2 * BITS_PER_INT as u64 + format.codec().payload_bits(tree);

    for (symbol, &count) in freqs.counts().iter().enumerate() {
        if count != 0 {
            bits += count * code_len(tree, symbol)?;
        }
    }

    Ok(bits + code_len(tree, PSEUDO_EOF)?)
}

/// Counts the symbols of `input`, builds their code and works out the exact
/// size of the compressed output.
pub fn preprocess_compress<R: Read>(input: R, format: HeaderFormat) -> Result<CompressSession> {
    let mut reader = BinaryReader::from_reader(input)?;

    let mut freqs = FrequencyTable::new();
    let mut original_bits = 0;
    for word in words(&mut reader) {
        freqs.increment(word);
        original_bits += BITS_PER_WORD as u64;
    }

    let tree = CodeTree::from_frequencies(&freqs)?;
    let compressed_bits = projected_bits(&freqs, &tree, format)?;

    info!(
        %format,
        original_bits,
        compressed_bits,
        distinct = freqs.distinct_symbols(),
        leaves = tree.num_leaf(),
        "pre-pass complete"
    );

    Ok(CompressSession { freqs, tree, format, original_bits, compressed_bits })
}

/// Writes the compressed form of `input`, which must hold the same words the
/// session was built from.
///
/// Unless `force` is set, nothing is written when the output would not be
/// smaller than the input.
pub fn compress<R: Read, W: Write>(session: &CompressSession, input: R, mut output: W, force: bool) -> Result<CompressOutcome> {
    if !force && session.compressed_bits >= session.original_bits {
        info!(
            original_bits = session.original_bits,
            compressed_bits = session.compressed_bits,
            "compression declined, output would not be smaller"
        );
        return Ok(CompressOutcome::Declined {
            original_bits: session.original_bits,
            compressed_bits: session.compressed_bits,
        });
    }

    let mut reader = BinaryReader::from_reader(input)?;
    let mut writer = BinaryWriterBuilder::new();

    writer.push_bits(MAGIC_NUMBER as u64, BITS_PER_INT as u64);
    writer.push_bits(session.format.selector() as u64, BITS_PER_INT as u64);
    session.format.codec().write_payload(&session.freqs, &session.tree, &mut writer)?;

    for word in words(&mut reader) {
        let path = session.tree.path(word).ok_or_else(|| {
            HuffError::PreconditionViolation(format!("symbol {} was not seen by the pre-pass", word))
        })?;
        writer.push_path(path);
    }

    let eof = session.tree.path(PSEUDO_EOF).ok_or_else(|| {
        HuffError::PreconditionViolation("the code tree has no end-of-stream leaf".to_string())
    })?;
    writer.push_path(eof);

    let written = writer.build();
    let bits = written.written_bits as u64;

    if bits != session.compressed_bits {
        return Err(HuffError::PreconditionViolation(format!(
            "input differs from the pre-pass: wrote {} bits, projected {}", bits, session.compressed_bits
        )));
    }

    written.write_to(&mut output)?;

    info!(bits, "compressed");
    Ok(CompressOutcome::Written { bits })
}

/// Magic, selector and header payload, leaving `reader` on the first data bit.
fn read_header(reader: &mut BinaryReader) -> Result<CodeTree> {
    let mut state = HeaderState::ExpectMagic;

    loop {
        debug!(?state, position = reader.read_bits, "decoder state");

        state = match state {
            HeaderState::ExpectMagic => {
                let found = reader.read_int(BITS_PER_INT as u64).map_err(|_| {
                    HuffError::NotAHuffmanFile("input is too short to hold the magic number".to_string())
                })?;

                if found != MAGIC_NUMBER as u64 {
                    return Err(HuffError::NotAHuffmanFile(format!(
                        "expected magic {:#010x}, found {:#010x}", MAGIC_NUMBER, found
                    )));
                }

                HeaderState::ExpectHeaderSelector
            }
            HeaderState::ExpectHeaderSelector => {
                let selector = reader
                    .read_int(BITS_PER_INT as u64)
                    .map_err(|_| HuffError::TruncatedStream("header format"))?;

                HeaderState::ExpectHeaderPayload(HeaderFormat::from_selector(selector as u32)?)
            }
            HeaderState::ExpectHeaderPayload(format) => {
                return format.codec().read_payload(reader);
            }
        };
    }
}

/// Follows the tree one bit at a time, emitting a word at every leaf until
/// the `PSEUDO_EOF` leaf is reached. Returns the number of words emitted.
fn walk_tree(tree: &CodeTree, reader: &mut BinaryReader, writer: &mut BinaryWriterBuilder) -> Result<u64> {
    let mut emitted = 0;
    let mut state = WalkState::Walking(tree.root());

    while let WalkState::Walking(node) = state {
        state = match node {
            TreeNode::Leaf { symbol, .. } if *symbol == PSEUDO_EOF => WalkState::Done,
            TreeNode::Leaf { symbol, .. } => {
                writer.push_bits(*symbol as u64, BITS_PER_WORD as u64);
                emitted += 1;
                WalkState::Walking(tree.root())
            }
            TreeNode::Internal { left, right, .. } => {
                let bit = reader.read_bit().map_err(|_| HuffError::TruncatedStream("compressed data"))?;
                WalkState::Walking(if bit { &**right } else { &**left })
            }
        };
    }

    debug!(state = ?state, emitted, "decoder state");
    Ok(emitted)
}

/// Restores the original words of a compressed stream. Returns the number of
/// bits written to `output`.
pub fn uncompress<R: Read, W: Write>(input: R, mut output: W) -> Result<u64> {
    let mut reader = BinaryReader::from_reader(input)?;
    let tree = read_header(&mut reader)?;

    let mut writer = BinaryWriterBuilder::new();
    let words = walk_tree(&tree, &mut reader, &mut writer)?;

    writer.build().write_to(&mut output)?;

    let bits = words * BITS_PER_WORD as u64;
    info!(bits, leaves = tree.num_leaf(), "uncompressed");
    Ok(bits)
}

/// Stateful front end keeping the last pre-pass between calls, for drivers
/// that run the two compression phases separately.
#[derive(Default, Debug)]
pub struct HuffProcessor {
    session: Option<CompressSession>,
}

impl HuffProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the pre-pass, replacing any earlier session. Returns the bits saved.
    pub fn preprocess_compress<R: Read>(&mut self, input: R, format: HeaderFormat) -> Result<i64> {
        self.session = None;
        let session = preprocess_compress(input, format)?;
        let savings = session.savings();
        self.session = Some(session);
        Ok(savings)
    }

    pub fn compress<R: Read, W: Write>(&self, input: R, output: W, force: bool) -> Result<CompressOutcome> {
        let session = self.session.as_ref().ok_or_else(|| {
            HuffError::PreconditionViolation("compress called before a successful pre-pass".to_string())
        })?;
        compress(session, input, output, force)
    }

    pub fn uncompress<R: Read, W: Write>(&self, input: R, output: W) -> Result<u64> {
        uncompress(input, output)
    }

    pub fn session(&self) -> Option<&CompressSession> {
        self.session.as_ref()
    }
}

#[cfg(test)]
mod tests;
