use super::*;

/// Pool-assigned job identifier. Opaque to the miner and echoed back on submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_opaque() {
        let id: JobId = serde_json::from_str(r#""6a3f-0001""#).unwrap();
        assert_eq!(id.as_str(), "6a3f-0001");
        assert_eq!(id.to_string(), "6a3f-0001");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""6a3f-0001""#);
    }
}
