//! Record identity codec.
//!
//! Every stored user and group is keyed by a 12-byte [`RecordKey`]. Outside
//! the store the key travels as its canonical encoding: exactly 24 lowercase
//! hexadecimal characters. [`RecordKey::decode`] accepts nothing else, so two
//! distinct strings can never name the same record. That matters for group
//! membership, which stores encoded keys as plain strings.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a record key in bytes.
pub const RECORD_KEY_LEN: usize = 12;

/// Length of the canonical external encoding of a record key.
pub const ENCODED_KEY_LEN: usize = RECORD_KEY_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Reasons an external identifier fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier has the wrong number of characters.
    #[error("identifier must be {ENCODED_KEY_LEN} characters, got {actual}")]
    Length { actual: usize },
    /// The identifier contains something other than `0-9` or `a-f`.
    #[error("identifier must contain only lowercase hexadecimal characters")]
    NotLowercaseHex,
    /// Raw key bytes had the wrong length.
    #[error("record key must be {RECORD_KEY_LEN} bytes, got {actual}")]
    ByteLength { actual: usize },
}

/// Internal primary key shared by users and groups.
///
/// # Examples
/// ```
/// use user_management::domain::RecordKey;
///
/// let key = RecordKey::decode("65f1a2b3c4d5e6f708192a3b").expect("valid key");
/// assert_eq!(key.encode(), "65f1a2b3c4d5e6f708192a3b");
/// assert!(RecordKey::decode("invalid-id").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey([u8; RECORD_KEY_LEN]);

impl RecordKey {
    /// Wrap raw key bytes.
    pub const fn from_bytes(bytes: [u8; RECORD_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from a byte slice read back from the store.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentityError> {
        let array: [u8; RECORD_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| IdentityError::ByteLength {
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    /// Decode the canonical external representation.
    ///
    /// Rejects anything that is not exactly 24 lowercase hex characters,
    /// including uppercase digits and surrounding whitespace.
    pub fn decode(raw: &str) -> Result<Self, IdentityError> {
        if raw.is_empty() {
            return Err(IdentityError::Empty);
        }
        if raw.len() != ENCODED_KEY_LEN {
            return Err(IdentityError::Length {
                actual: raw.chars().count(),
            });
        }
        if !raw
            .bytes()
            .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
        {
            return Err(IdentityError::NotLowercaseHex);
        }

        let mut bytes = [0_u8; RECORD_KEY_LEN];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| IdentityError::NotLowercaseHex)?;
        Ok(Self(bytes))
    }

    /// Encode the key as 24 lowercase hex characters.
    pub fn encode(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; RECORD_KEY_LEN] {
        &self.0
    }

    /// Raw key bytes as a slice, as bound into store queries.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for RecordKey {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl From<RecordKey> for String {
    fn from(value: RecordKey) -> Self {
        value.encode()
    }
}

impl TryFrom<String> for RecordKey {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::decode(&value)
    }
}

/// Issues fresh record keys.
///
/// Layout: a 4-byte big-endian creation time in seconds, 5 bytes of entropy
/// fixed per generator, then a 3-byte big-endian counter that wraps. Keys
/// from one generator are unique and sort roughly by creation time.
pub struct RecordKeyGenerator {
    clock: Arc<dyn Clock>,
    entropy: [u8; 5],
    counter: AtomicU32,
}

impl RecordKeyGenerator {
    /// Create a generator reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entropy: rand::random(),
            counter: AtomicU32::new(rand::random::<u32>() & COUNTER_MASK),
        }
    }

    /// Produce the next key.
    pub fn next_key(&self) -> RecordKey {
        let seconds = u32::try_from(self.clock.utc().timestamp().max(0)).unwrap_or(u32::MAX);
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
        let [_, count_high, count_mid, count_low] = count.to_be_bytes();
        let [t0, t1, t2, t3] = seconds.to_be_bytes();
        let [e0, e1, e2, e3, e4] = self.entropy;

        RecordKey([
            t0, t1, t2, t3, e0, e1, e2, e3, e4, count_high, count_mid, count_low,
        ])
    }
}

impl Default for RecordKeyGenerator {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl fmt::Debug for RecordKeyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordKeyGenerator")
            .field("entropy", &hex::encode(self.entropy))
            .finish_non_exhaustive()
    }
}
