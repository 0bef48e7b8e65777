use super::*;

#[derive(Debug, PartialEq)]
pub struct Authorize {
    pub username: String,
    pub password: String,
}

impl Serialize for Authorize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.username)?;
        seq.serialize_element(&self.password)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Authorize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (username, password) = <(String, String)>::deserialize(deserializer)?;
        Ok(Authorize { username, password })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn authorize_params() {
        let authorize = Authorize {
            username: "bc1qexample.worker".into(),
            password: "x".into(),
        };

        assert_eq!(
            serde_json::to_value(&authorize).unwrap(),
            json!(["bc1qexample.worker", "x"])
        );

        assert_eq!(
            serde_json::from_value::<Authorize>(json!(["bc1qexample.worker", "x"])).unwrap(),
            authorize
        );
    }
}
