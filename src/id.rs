use std::{convert::Infallible, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct ChatId {
    /// numeric id or @channel username
    value: CompactString,
}

impl ChatId {
    pub fn new<S: Into<CompactString>>(id: S) -> Self {
        Self { value: id.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl FromStr for ChatId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChatId::new(s.trim()))
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D>(deserializer: D) -> Result<ChatId, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct ChatIdVisitor;

        impl<'de> Visitor<'de> for ChatIdVisitor {
            type Value = ChatId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a chat ID")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChatId::new(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChatId::new(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChatId::new(value.to_string()))
            }
        }

        deserializer.deserialize_any(ChatIdVisitor)
    }
}

impl Serialize for ChatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numbers_and_strings() {
        let negative: ChatId = serde_json::from_str("-1001234567").unwrap();
        assert_eq!(negative, ChatId::new("-1001234567"));

        let positive: ChatId = serde_json::from_str("42").unwrap();
        assert_eq!(positive.to_string(), "42");

        let channel: ChatId = serde_json::from_str("\"@reviews\"").unwrap();
        assert_eq!(channel, ChatId::new("@reviews"));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&ChatId::new("-100")).unwrap();
        assert_eq!(json, "\"-100\"");
    }

    #[test]
    fn parsing_trims_whitespace() {
        let id: ChatId = " 12345 \n".parse().unwrap();
        assert_eq!(id, ChatId::new("12345"));
        assert!(ChatId::new("   ").is_empty());
    }
}
