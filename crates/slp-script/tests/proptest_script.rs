use proptest::prelude::*;

use slp_script::chunk::{decode_script, encode_push_datas};
use slp_script::interpreter::ScriptNumber;
use slp_script::{Address, Network, Script};

fn network() -> impl Strategy<Value = Network> {
    prop_oneof![
        Just(Network::Mainnet),
        Just(Network::Testnet),
        Just(Network::Regtest)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn script_number_encode_decode(val in -0x7FFF_FFFFi64..=0x7FFF_FFFFi64) {
        let sn = ScriptNumber::new(val);
        let decoded = ScriptNumber::from_bytes(&sn.to_bytes(), 4, true).unwrap();
        prop_assert_eq!(decoded.to_i64(), val);
    }

    #[test]
    fn script_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let script = Script::from_bytes(&data);
        let script2 = Script::from_hex(&script.to_hex()).unwrap();
        prop_assert_eq!(script, script2);
    }

    #[test]
    fn pushes_decode_to_the_same_data(
        parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..6)
    ) {
        let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
        let bytes = encode_push_datas(&refs).unwrap();
        let chunks = decode_script(&bytes).unwrap();
        prop_assert_eq!(chunks.len(), parts.len());
        for (chunk, part) in chunks.iter().zip(&parts) {
            prop_assert_eq!(chunk.push_data().unwrap(), part.as_slice());
        }
    }

    #[test]
    fn cash_and_slp_strings_parse_to_the_same_address(
        hash in prop::array::uniform20(any::<u8>()),
        net in network(),
        p2sh in any::<bool>()
    ) {
        let addr = if p2sh {
            Address::from_script_hash(&hash, net)
        } else {
            Address::from_public_key_hash(&hash, net)
        };
        prop_assert_eq!(Address::from_string(&addr.to_cash_string()).unwrap(), addr);
        prop_assert_eq!(Address::from_string(&addr.to_slp_string()).unwrap(), addr);
    }
}
