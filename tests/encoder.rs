use tson::prelude::*;
use tson_strategy::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 1_000, ..ProptestConfig::default() })]

    #[test]
    fn encode_decode(k in arb_tson()) {
        let registry = Registry::new();
        let enc = encode_full(&k, &registry).unwrap();

        let dec = decode_full(&enc, &registry).unwrap();

        prop_assert_eq!(dec, Some(k));
    }

    #[test]
    fn decoding_garbage_never_panics(bs in prop::collection::vec(any::<u8>(), 0..64)) {
        let registry = Registry::new();
        let _ = decode_full(&bs, &registry);
    }

    #[test]
    fn typed_round_trip(v in prop::collection::vec(any::<i64>(), 0..32), s in ".*") {
        let registry = Registry::new();

        let enc = encode(&v, &registry).unwrap();
        prop_assert_eq!(decode::<Vec<i64>>(&enc, &registry).unwrap(), Some(v));

        let enc = encode(&s, &registry).unwrap();
        prop_assert_eq!(decode::<String>(&enc, &registry).unwrap(), Some(s));
    }
}
