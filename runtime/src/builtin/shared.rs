// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub const HAMT_BIT_WIDTH: u32 = 5;

/// Method name of a plain value transfer. No actor code runs.
pub const METHOD_SEND: &str = "";
/// Method invoked on a freshly created actor.
pub const METHOD_CONSTRUCTOR: &str = "constructor";

/// Encodes an order book index as a minimal big-endian integer.
/// Zero encodes as the empty byte string.
pub fn encode_index(index: u64) -> Vec<u8> {
    let bytes = index.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Decodes an index produced by [`encode_index`]. Returns `None` for inputs
/// wider than eight bytes.
pub fn decode_index(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case(0, &[]; "zero is empty")]
    #[test_case(1, &[1])]
    #[test_case(255, &[255])]
    #[test_case(256, &[1, 0])]
    #[test_case(u64::MAX, &[255; 8])]
    fn index_encoding(index: u64, expected: &[u8]) {
        assert_eq!(expected, encode_index(index).as_slice());
        assert_eq!(Some(index), decode_index(expected));
    }

    #[test]
    fn rejects_wide_index() {
        assert_eq!(None, decode_index(&[1; 9]));
    }
}
