use bitflags::bitflags;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const RECEIVER: &str = "receiver";
pub const SENDER: &str = "sender";

bitflags! {
    /// Which shipment contacts receive notification emails.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecipientSet: u8 {
        const RECEIVER = 1 << 0;
        const SENDER = 1 << 1;

        const ALL = Self::RECEIVER.bits() | Self::SENDER.bits();
    }
}

impl Default for RecipientSet {
    fn default() -> Self {
        Self::RECEIVER
    }
}

impl RecipientSet {
    /// Parses a single role name; unknown names yield an empty set.
    #[must_use]
    pub fn from_role(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            RECEIVER => Self::RECEIVER,
            SENDER => Self::SENDER,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }

    #[must_use]
    pub fn roles(self) -> Vec<&'static str> {
        let mut roles = Vec::with_capacity(2);
        if self.contains(Self::RECEIVER) {
            roles.push(RECEIVER);
        }
        if self.contains(Self::SENDER) {
            roles.push(SENDER);
        }
        roles
    }
}

impl Serialize for RecipientSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let roles = self.roles();
        let mut seq = serializer.serialize_seq(Some(roles.len()))?;
        for role in roles {
            seq.serialize_element(role)?;
        }
        seq.end()
    }
}

/// Accepts `["receiver", "sender"]`, a single `"all"`-style string or a raw bit value.
impl<'de> Deserialize<'de> for RecipientSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RolesVisitor;

        impl<'de> Visitor<'de> for RolesVisitor {
            type Value = RecipientSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of recipient roles")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                value.split(',').try_fold(RecipientSet::empty(), |acc, role| {
                    let parsed = RecipientSet::from_role(role);
                    if parsed.is_empty() {
                        Err(E::invalid_value(de::Unexpected::Str(role), &"receiver, sender or all"))
                    } else {
                        Ok(acc | parsed)
                    }
                })
            }

            fn visit_u64<E: de::Error>(self, bits: u64) -> Result<Self::Value, E> {
                u8::try_from(bits)
                    .map(RecipientSet::from_bits_truncate)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(bits), &self))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = RecipientSet::empty();
                while let Some(role) = seq.next_element::<String>()? {
                    set |= RolesVisitor.visit_str::<A::Error>(&role)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_any(RolesVisitor)
    }
}
