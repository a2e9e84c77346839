//! Twelve-byte document identifiers rendered as 24 hex characters.
//!
//! Layout: 4-byte big-endian unix seconds, 5 bytes unique to the process,
//! 3-byte big-endian counter.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::DbError;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static COUNTER: AtomicU32 = AtomicU32::new(0);
static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();

fn process_unique() -> [u8; 5] {
    *PROCESS_UNIQUE.get_or_init(|| {
        let random = uuid::Uuid::new_v4();
        let mut bytes = [0u8; 5];
        bytes.copy_from_slice(&random.as_bytes()[..5]);
        bytes
    })
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh id stamped with the current time.
    pub fn generate() -> Self {
        let seconds = OffsetDateTime::now_utc().unix_timestamp() as u32;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&process_unique());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since the unix epoch encoded in the id.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(24);
        // Writing into a String cannot fail.
        let _ = self.write_hex(&mut hex);
        hex
    }

    fn write_hex<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(out, "{byte:02x}"))
    }

    /// Parse exactly 24 hex digits; anything else is [`DbError::InvalidId`].
    pub fn parse_str(input: &str) -> Result<Self, DbError> {
        if input.len() != 24 || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DbError::InvalidId(input.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (index, byte) in bytes.iter_mut().enumerate() {
            let pair = &input[index * 2..index * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| DbError::InvalidId(input.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl FromStr for ObjectId {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_hex(f)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ObjectId(")?;
        self.write_hex(f)?;
        f.write_str(")")
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}
