use rand::Rng;

use super::{compress, preprocess_compress, uncompress, CompressOutcome, HuffProcessor};
use crate::{
    constants::{BITS_PER_INT, MAGIC_NUMBER, STORE_TREE},
    error::HuffError,
    header::HeaderFormat,
};

const FORMATS: [HeaderFormat; 2] = [HeaderFormat::Counts, HeaderFormat::Tree];

fn compress_forced(data: &[u8], format: HeaderFormat) -> (Vec<u8>, u64, u64) {
    let session = preprocess_compress(data, format).unwrap();
    let mut out = Vec::new();

    let bits = match compress(&session, data, &mut out, true).unwrap() {
        CompressOutcome::Written { bits } => bits,
        declined => panic!("forced compression was declined: {:?}", declined),
    };

    (out, bits, session.compressed_bits())
}

fn round_trip(data: &[u8], format: HeaderFormat) {
    let (compressed, bits, projected) = compress_forced(data, format);

    assert_eq!(bits, projected);
    assert_eq!(compressed.len() as u64, (bits + 7) / 8);

    let mut restored = Vec::new();
    let written = uncompress(&compressed[..], &mut restored).unwrap();

    assert_eq!(restored, data);
    assert_eq!(written, data.len() as u64 * 8);
}

#[test]
fn test_round_trip_text() {
    let text = b"It was the best of times, it was the worst of times, it was the age of wisdom, \
                 it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity";
    for format in FORMATS {
        round_trip(text, format);
    }
}

#[test]
fn test_round_trip_random() {
    let mut rng = rand::thread_rng();
    for len in [1, 2, 17, 1000, 50_000] {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        for format in FORMATS {
            round_trip(&data, format);
        }
    }
}

#[test]
fn test_round_trip_skewed() {
    let mut rng = rand::thread_rng();
    let data: Vec<u8> = (0..20_000)
        .map(|_| if rng.gen_bool(0.9) { b'e' } else { rng.gen_range(b'a'..=b'z') })
        .collect();
    for format in FORMATS {
        round_trip(&data, format);
    }
}

#[test]
fn test_round_trip_every_byte() {
    let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    for format in FORMATS {
        round_trip(&data, format);
    }
}

#[test]
fn test_single_distinct_symbol() {
    let data = vec![b'q'; 1000];
    for format in FORMATS {
        let session = preprocess_compress(&data[..], format).unwrap();
        assert_eq!(session.tree().num_leaf(), 2);
        round_trip(&data, format);
    }
}

#[test]
fn test_empty_input() {
    for format in FORMATS {
        round_trip(&[], format);
    }

    // Header only: magic, selector, tree size, a lone end-of-stream leaf, empty code
    let (_, bits, _) = compress_forced(&[], HeaderFormat::Tree);
    assert_eq!(bits, 3 * BITS_PER_INT as u64 + 10);
}

#[test]
fn test_concrete_sizes() {
    let data = b"AAABBC";

    let counts = preprocess_compress(&data[..], HeaderFormat::Counts).unwrap();
    assert_eq!(counts.original_bits(), 48);
    assert_eq!(counts.compressed_bits(), 64 + 256 * 32 + 10 + 3);
    assert_eq!(counts.savings(), 48 - 8269);

    let tree = preprocess_compress(&data[..], HeaderFormat::Tree).unwrap();
    assert_eq!(tree.compressed_bits(), 64 + 32 + 43 + 10 + 3);
    assert_eq!(tree.frequencies().count(b'A' as usize), 3);
    assert_eq!(tree.tree().path(b'A' as usize).unwrap().to_string(), "0");
}

#[test]
fn test_savings_on_redundant_input() {
    let data = vec![b'x'; 10_000];
    let session = preprocess_compress(&data[..], HeaderFormat::Tree).unwrap();

    assert!(session.savings() > 0);

    let mut out = Vec::new();
    let outcome = compress(&session, &data[..], &mut out, false).unwrap();

    assert_eq!(outcome, CompressOutcome::Written { bits: session.compressed_bits() });
    assert_eq!(session.original_bits() - session.compressed_bits(), session.savings() as u64);
}

#[test]
fn test_declined_without_force() {
    let data = b"abc";
    let session = preprocess_compress(&data[..], HeaderFormat::Counts).unwrap();
    let mut out = Vec::new();

    let outcome = compress(&session, &data[..], &mut out, false).unwrap();

    assert_eq!(
        outcome,
        CompressOutcome::Declined {
            original_bits: session.original_bits(),
            compressed_bits: session.compressed_bits(),
        }
    );
    assert!(out.is_empty());
}

#[test]
fn test_input_changed_between_passes() {
    let session = preprocess_compress(&b"aaaabbbb"[..], HeaderFormat::Tree).unwrap();
    let mut out = Vec::new();

    let unseen = compress(&session, &b"aaaazzzz"[..], &mut out, true).unwrap_err();
    assert!(matches!(unseen, HuffError::PreconditionViolation(_)));

    let shorter = compress(&session, &b"aaaa"[..], &mut out, true).unwrap_err();
    assert!(matches!(shorter, HuffError::PreconditionViolation(_)));

    assert!(out.is_empty());
}

#[test]
fn test_processor_requires_pre_pass() {
    let processor = HuffProcessor::new();
    let mut out = Vec::new();

    let err = processor.compress(&b"data"[..], &mut out, true).unwrap_err();

    assert!(matches!(err, HuffError::PreconditionViolation(_)));
    assert!(processor.session().is_none());
}

#[test]
fn test_processor_two_phases() {
    let data = b"abracadabra abracadabra abracadabra";
    let mut processor = HuffProcessor::new();

    let savings = processor.preprocess_compress(&data[..], HeaderFormat::Tree).unwrap();
    assert_eq!(savings, processor.session().unwrap().savings());

    let mut compressed = Vec::new();
    let outcome = processor.compress(&data[..], &mut compressed, true).unwrap();
    assert_eq!(outcome, CompressOutcome::Written { bits: processor.session().unwrap().compressed_bits() });

    let mut restored = Vec::new();
    processor.uncompress(&compressed[..], &mut restored).unwrap();
    assert_eq!(&restored[..], &data[..]);
}

#[test]
fn test_processor_failed_pre_pass_clears_session() {
    struct Failing;

    impl std::io::Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
        }
    }

    let mut processor = HuffProcessor::new();
    processor.preprocess_compress(&b"hello"[..], HeaderFormat::Counts).unwrap();

    let err = processor.preprocess_compress(Failing, HeaderFormat::Counts).unwrap_err();

    assert!(matches!(err, HuffError::Io(_)));
    assert!(processor.session().is_none());
}

#[test]
fn test_not_a_huffman_file() {
    let mut out = Vec::new();

    let err = uncompress(&b"PK\x03\x04 definitely a zip"[..], &mut out).unwrap_err();
    assert!(matches!(err, HuffError::NotAHuffmanFile(_)));

    let err = uncompress(&b"\xfa\xce"[..], &mut out).unwrap_err();
    assert!(matches!(err, HuffError::NotAHuffmanFile(_)));

    assert!(out.is_empty());
}

#[test]
fn test_unknown_selector() {
    let mut input = MAGIC_NUMBER.to_be_bytes().to_vec();
    input.extend_from_slice(&0xdead_beefu32.to_be_bytes());

    let err = uncompress(&input[..], &mut Vec::new()).unwrap_err();

    assert!(matches!(err, HuffError::CorruptFormat(_)));
}

#[test]
fn test_missing_selector() {
    let input = MAGIC_NUMBER.to_be_bytes();

    let err = uncompress(&input[..], &mut Vec::new()).unwrap_err();

    assert!(matches!(err, HuffError::TruncatedStream(_)));
}

#[test]
fn test_truncated_tree_leaf() {
    let mut input = MAGIC_NUMBER.to_be_bytes().to_vec();
    input.extend_from_slice(&STORE_TREE.to_be_bytes());
    input.extend_from_slice(&20u32.to_be_bytes());
    // 0 (internal), 1 (leaf) and only 6 of its 9 value bits
    input.push(0b0100_0001);

    let err = uncompress(&input[..], &mut Vec::new()).unwrap_err();

    assert!(matches!(err, HuffError::CorruptFormat(_)));
}

#[test]
fn test_truncated_data() {
    // A=0 B=10 C=110 EOF=111: zero padding never reaches the end-of-stream leaf
    let (compressed, _, _) = compress_forced(b"AAABBC", HeaderFormat::Counts);
    let header_bytes = (2 * BITS_PER_INT + 256 * BITS_PER_INT) / 8;

    for cut in [header_bytes, compressed.len() - 1] {
        let err = uncompress(&compressed[..cut], &mut Vec::new()).unwrap_err();
        assert!(matches!(err, HuffError::TruncatedStream(_)), "cut at {}: {:?}", cut, err);
    }
}

#[test]
fn test_headers_are_deterministic() {
    let data = b"abcdabcdaabbccdd";
    for format in FORMATS {
        let (first, _, _) = compress_forced(data, format);
        let (second, _, _) = compress_forced(data, format);
        assert_eq!(first, second);
    }
}
