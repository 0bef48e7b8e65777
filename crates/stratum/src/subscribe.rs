use super::*;

#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub user_agent: String,
}

impl Serialize for Subscribe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.user_agent)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Subscribe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (user_agent,) = <(String,)>::deserialize(deserializer)?;
        Ok(Subscribe { user_agent })
    }
}

/// Largest extranonce2 a pool may ask for. Real pools use 4 to 8 bytes.
pub const MAX_EXTRANONCE2_SIZE: usize = 16;

/// `[details, extranonce1, extranonce2_size]`. The details are pool specific
/// and kept verbatim.
#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeResult {
    pub details: Value,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl Serialize for SubscribeResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.details)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (details, extranonce1, extranonce2_size) =
            <(Value, Extranonce, usize)>::deserialize(deserializer)?;

        if extranonce2_size > MAX_EXTRANONCE2_SIZE {
            return Err(de::Error::custom(format!(
                "extranonce2 size {extranonce2_size} exceeds {MAX_EXTRANONCE2_SIZE} bytes"
            )));
        }

        Ok(SubscribeResult {
            details,
            extranonce1,
            extranonce2_size,
        })
    }
}
