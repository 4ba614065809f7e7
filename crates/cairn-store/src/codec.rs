use std::any::type_name;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

/// Bijective mapping between a typed value and its byte representation.
///
/// Implementations must satisfy `decode(encode(x)) == x` for every value
/// they accept. Encoding writes into a fresh buffer per call; codecs hold
/// no mutable state and are freely shareable.
pub trait Codec<T> {
    fn encode(&self, value: &T) -> StoreResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> StoreResult<T>;
}

/// Codec through a type's `Display`/`FromStr` pair, as UTF-8 text.
///
/// Bijective whenever `T`'s `Display` and `FromStr` round-trip, which
/// holds for the integer and float primitives and for types that derive
/// their parser from their printer.
pub struct TextCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TextCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TextCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TextCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Display + FromStr> Codec<T> for TextCodec<T> {
    fn encode(&self, value: &T) -> StoreResult<Vec<u8>> {
        Ok(value.to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<T> {
        let text = std::str::from_utf8(bytes).map_err(|_| StoreError::Decode {
            target: type_name::<T>(),
            input: String::from_utf8_lossy(bytes).into_owned(),
        })?;
        text.parse().map_err(|_| StoreError::Decode {
            target: type_name::<T>(),
            input: text.to_string(),
        })
    }
}

/// Identity codec for raw byte vectors.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn encode(&self, value: &Vec<u8>) -> StoreResult<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Key and value codecs bundled for a typed map or set.
#[derive(Clone, Default)]
pub struct PairCodec<KC, VC> {
    pub key: KC,
    pub value: VC,
}

impl<KC, VC> PairCodec<KC, VC> {
    pub fn new(key: KC, value: VC) -> Self {
        Self { key, value }
    }

    pub fn encode_pair<K, V>(&self, key: &K, value: &V) -> StoreResult<(Vec<u8>, Vec<u8>)>
    where
        KC: Codec<K>,
        VC: Codec<V>,
    {
        Ok((self.key.encode(key)?, self.value.encode(value)?))
    }

    pub fn decode_pair<K, V>(&self, key: &[u8], value: &[u8]) -> StoreResult<(K, V)>
    where
        KC: Codec<K>,
        VC: Codec<V>,
    {
        Ok((self.key.decode(key)?, self.value.decode(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_codec_rejects_garbage() {
        let codec = TextCodec::<i32>::new();
        assert!(matches!(
            codec.decode(b"not a number"),
            Err(StoreError::Decode { target, .. }) if target.contains("i32")
        ));
        assert!(matches!(
            codec.decode(&[0xff, 0xfe]),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn decode_error_carries_the_input() {
        let codec = TextCodec::<u64>::new();
        match codec.decode(b"-5") {
            Err(StoreError::Decode { input, .. }) => assert_eq!(input, "-5"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn repeated_encodes_do_not_interfere() {
        // Each call gets a fresh buffer; earlier output is never clobbered.
        let codec = TextCodec::<i32>::new();
        let first = codec.encode(&123456).unwrap();
        let second = codec.encode(&7).unwrap();
        assert_eq!(first, b"123456");
        assert_eq!(second, b"7");
    }

    proptest! {
        #[test]
        fn i32_round_trips(x: i32) {
            let codec = TextCodec::<i32>::new();
            prop_assert_eq!(codec.decode(&codec.encode(&x).unwrap()).unwrap(), x);
        }

        #[test]
        fn f64_round_trips(x in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            let codec = TextCodec::<f64>::new();
            prop_assert_eq!(codec.decode(&codec.encode(&x).unwrap()).unwrap(), x);
        }

        #[test]
        fn bytes_round_trip(data: Vec<u8>) {
            let codec = BytesCodec;
            prop_assert_eq!(codec.decode(&codec.encode(&data).unwrap()).unwrap(), data);
        }
    }
}
