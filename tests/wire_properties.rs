//! Property suites for the MB1 wire codec

mod common;

use common::arb_record;
use mb1wire::wire::{BEAMS_OFFSET, sounding_bytes};
use mb1wire::{ByteOrder, CodecConfig, Mb1Codec, Mb1Error, checksum};
use proptest::prelude::*;

proptest! {
    #[test]
    fn encode_then_decode_is_identity(record in arb_record(32)) {
        let codec = Mb1Codec::default();
        let wire = codec.encode_to_vec(&record).unwrap();
        let decoded = codec.decode(&wire).unwrap();

        prop_assert_eq!(&decoded.record, &record);
        prop_assert_eq!(decoded.bytes_consumed, wire.len());
        prop_assert!(decoded.payload_size_matches());
    }

    #[test]
    fn encoded_length_follows_beam_count(record in arb_record(64)) {
        let codec = Mb1Codec::default();
        let expected = sounding_bytes(record.beam_count());
        prop_assert_eq!(codec.required_size(&record).unwrap(), expected);

        let mut buf = vec![0xEEu8; expected + 16];
        prop_assert_eq!(codec.encode(&record, &mut buf).unwrap(), expected);
        prop_assert!(buf[expected..].iter().all(|&b| b == 0));
    }

    #[test]
    fn trailing_checksum_covers_everything_before_it(record in arb_record(16)) {
        let wire = Mb1Codec::default().encode_to_vec(&record).unwrap();
        let (body, tail) = wire.split_at(wire.len() - 4);
        let stored = ByteOrder::Native.u32_from_bytes(tail.try_into().unwrap());
        prop_assert_eq!(stored, checksum(body));
    }

    #[test]
    fn short_capacity_is_reported_and_harmless(
        record in arb_record(16),
        shortfall in 1usize..60,
    ) {
        let codec = Mb1Codec::default();
        let required = sounding_bytes(record.beam_count());
        let capacity = required.saturating_sub(shortfall);
        let mut buf = vec![0x5Au8; capacity];

        let err = codec.encode(&record, &mut buf).unwrap_err();
        let is_too_small = matches!(
            err,
            Mb1Error::BufferTooSmall { required: r, capacity: c } if r == required && c == capacity
        );
        prop_assert!(is_too_small);
        prop_assert!(buf.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn truncated_packets_never_decode(record in arb_record(16), cut in any::<prop::sample::Index>()) {
        let wire = Mb1Codec::default().encode_to_vec(&record).unwrap();
        let len = cut.index(wire.len());
        let err = Mb1Codec::default().decode(&wire[..len]).unwrap_err();

        if len < BEAMS_OFFSET {
            let is_short = matches!(err, Mb1Error::PacketTooShort { .. });
            prop_assert!(is_short);
        } else {
            let is_incomplete = matches!(err, Mb1Error::PacketIncomplete { .. });
            prop_assert!(is_incomplete);
        }
    }

    #[test]
    fn any_single_byte_corruption_is_detected(
        record in arb_record(8),
        at in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut wire = Mb1Codec::default().encode_to_vec(&record).unwrap();
        let i = at.index(wire.len());
        wire[i] ^= flip;
        let err = Mb1Codec::default().decode(&wire).unwrap_err();
        match i {
            0..=2 => prop_assert!(matches!(err, Mb1Error::WrongRecordKind { .. }), "{:?}", err),
            // a changed beam count may fail on capacity or length first
            48..=51 => {}
            _ => prop_assert!(matches!(err, Mb1Error::ChecksumMismatch { .. }), "{:?}", err),
        }
    }

    #[test]
    fn explicit_byte_orders_round_trip(record in arb_record(8), big in any::<bool>()) {
        let order = if big { ByteOrder::Big } else { ByteOrder::Little };
        let codec = Mb1Codec::new(CodecConfig { byte_order: order, ..CodecConfig::default() })
            .unwrap();
        let wire = codec.encode_to_vec(&record).unwrap();
        prop_assert_eq!(codec.decode(&wire).unwrap().record, record);
    }
}
