use crate::{Error, PUBLIC_KEY_BYTES_LEN, SIGNATURE_BYTES_LEN};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! fixed_bytes_type {
    ($name: ident, $len: expr, $doc: expr) => {
        #[doc = $doc]
        ///
        /// The bytes are not checked to be a valid curve point until they are verified.
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Returns an all-zero value, which is never a valid point.
            pub fn empty() -> Self {
                Self([0; $len])
            }

            pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| Error::InvalidByteLength {
                    got: bytes.len(),
                    expected: $len,
                })?;
                Ok(Self(array))
            }

            pub fn serialize(&self) -> [u8; $len] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn as_hex_string(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_hex_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_hex_string())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let stripped = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(stripped).map_err(|e| Error::InvalidHex(e.to_string()))?;
                Self::deserialize(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.as_hex_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes_type!(
    PublicKeyBytes,
    PUBLIC_KEY_BYTES_LEN,
    "A compressed BLS public key."
);
fixed_bytes_type!(
    SignatureBytes,
    SIGNATURE_BYTES_LEN,
    "A compressed BLS signature."
);
