use super::*;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    /// Fresh random bytes. Not cryptographic, only used to spread the search space.
    pub fn generate(size: usize) -> Self {
        let mut v = vec![0u8; size];
        rand::rng().fill_bytes(&mut v);
        Self(v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(Vec::from_hex(s)?))
    }
}

impl From<Vec<u8>> for Extranonce {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Extranonce {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Extranonce {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl fmt::Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_length_hex() {
        assert!(
            "abc"
                .parse::<Extranonce>()
                .unwrap_err()
                .to_string()
                .contains("Odd number of digits")
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(
            "zz".parse::<Extranonce>()
                .unwrap_err()
                .to_string()
                .contains("Invalid character")
        );
    }

    #[test]
    fn serializes_as_hex_string() {
        let extranonce: Extranonce = serde_json::from_str(r#""abcd""#).unwrap();
        assert_eq!(extranonce.len(), 2);
        assert_eq!(extranonce.as_bytes(), &[0xab, 0xcd]);
        assert_eq!(serde_json::to_string(&extranonce).unwrap(), r#""abcd""#);
    }

    #[test]
    fn generate_has_requested_length() {
        assert_eq!(Extranonce::generate(8).len(), 8);
        assert!(Extranonce::generate(0).is_empty());
    }

    #[test]
    fn generate_draws_fresh_bytes() {
        let a = Extranonce::generate(16);
        let b = Extranonce::generate(16);
        assert_ne!(a, b);
    }
}
