use crate::constants::{GENESIS_HASH, GENESIS_NONCE};
use crate::encoding::HashInput;
use crate::payload::Transaction;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    #[serde(with = "nonce_serde")]
    pub nonce: BigInt,
    pub timestamp: u64,
    pub data: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
}

impl Block {
    /// The unmined anchor block. Its hash is the fixed constant, never computed.
    pub fn genesis(timestamp: u64) -> Self {
        Self {
            number: 0,
            nonce: BigInt::from(GENESIS_NONCE),
            timestamp,
            data: vec![],
            previous_hash: GENESIS_HASH.to_string(),
            hash: GENESIS_HASH.to_string(),
        }
    }

    /// View over the fields the block hash commits to. `hash` and `timestamp`
    /// are never part of it.
    pub fn hash_input(&self) -> HashInput<'_> {
        HashInput {
            previous_hash: &self.previous_hash,
            nonce: &self.nonce,
            number: self.number,
            data: &self.data,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.number == 0
    }
}

impl AsRef<Block> for Block {
    fn as_ref(&self) -> &Block {
        self
    }
}

/// Nonces go out as JSON numbers while they fit a 64-bit integer and as
/// decimal strings beyond that. Both forms are accepted back.
pub mod nonce_serde {
    use num_bigint::BigInt;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(nonce: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        if let Ok(small) = i64::try_from(nonce) {
            serializer.serialize_i64(small)
        } else if let Ok(small) = u64::try_from(nonce) {
            serializer.serialize_u64(small)
        } else {
            serializer.serialize_str(&nonce.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(NonceVisitor)
    }

    struct NonceVisitor;

    impl<'de> de::Visitor<'de> for NonceVisitor {
        type Value = BigInt;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a decimal string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigInt, E> {
            Ok(BigInt::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
            v.parse().map_err(E::custom)
        }
    }
}
