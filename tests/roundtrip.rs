use proptest::prelude::*;
use simple_huff::{compress, preprocess_compress, uncompress, CompressOutcome, HeaderFormat};

fn any_format() -> impl Strategy<Value = HeaderFormat> {
    prop_oneof![Just(HeaderFormat::Counts), Just(HeaderFormat::Tree)]
}

fn compress_forced(data: &[u8], format: HeaderFormat) -> (Vec<u8>, u64, u64) {
    let session = preprocess_compress(data, format).unwrap();
    let mut out = Vec::new();
    let bits = match compress(&session, data, &mut out, true).unwrap() {
        CompressOutcome::Written { bits } => bits,
        declined => panic!("forced compression was declined: {:?}", declined),
    };
    (out, bits, session.compressed_bits())
}

proptest! {
    #[test]
    fn roundtrip_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..4096), format in any_format()) {
        let (compressed, _, _) = compress_forced(&data, format);

        let mut restored = Vec::new();
        uncompress(&compressed[..], &mut restored).unwrap();

        prop_assert_eq!(restored, data);
    }

    #[test]
    fn roundtrip_small_alphabet(data in prop::collection::vec(0u8..4, 0..8192), format in any_format()) {
        let (compressed, _, _) = compress_forced(&data, format);

        let mut restored = Vec::new();
        let written = uncompress(&compressed[..], &mut restored).unwrap();

        prop_assert_eq!(written, data.len() as u64 * 8);
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn written_bits_match_projection(data in prop::collection::vec(any::<u8>(), 0..2048), format in any_format()) {
        let (compressed, bits, projected) = compress_forced(&data, format);

        prop_assert_eq!(bits, projected);
        prop_assert_eq!(compressed.len() as u64, (bits + 7) / 8);
    }

    #[test]
    fn output_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..1024), format in any_format()) {
        let (first, _, _) = compress_forced(&data, format);
        let (second, _, _) = compress_forced(&data, format);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn declined_output_stays_empty(data in prop::collection::vec(any::<u8>(), 0..64)) {
        // The counts header alone is 8256 bits, more than 64 bytes of input
        let session = preprocess_compress(&data[..], HeaderFormat::Counts).unwrap();
        let mut out = Vec::new();

        let outcome = compress(&session, &data[..], &mut out, false).unwrap();

        prop_assert!(matches!(outcome, CompressOutcome::Declined { .. }), "unexpected {:?}", outcome);
        prop_assert!(out.is_empty());
    }
}
