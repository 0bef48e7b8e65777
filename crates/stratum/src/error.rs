use super::*;

pub type Result<T = (), E = InternalError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InternalError {
    #[snafu(display("invalid hex: {source}"))]
    Hex { source: hex::FromHexError },

    #[snafu(display("{message}"))]
    Parse { message: String },
}

impl From<hex::FromHexError> for InternalError {
    fn from(source: hex::FromHexError) -> Self {
        Self::Hex { source }
    }
}

/// Stratum errors travel as `[code, message, traceback]`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct JsonRpcError {
    pub error_code: i32,
    pub message: String,
    pub traceback: Option<Value>,
}

impl Serialize for JsonRpcError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.error_code, &self.message, &self.traceback).serialize(serializer)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.traceback {
            Some(traceback) => write!(
                f,
                "Stratum error {}: {} (traceback: {})",
                self.error_code,
                self.message,
                serde_json::to_string(traceback).unwrap_or_else(|_| "<invalid traceback>".into())
            ),
            None => write!(f, "Stratum error {}: {}", self.error_code, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn error_from_array() {
        let error: JsonRpcError = serde_json::from_value(json!([21, "Job not found", null])).unwrap();
        assert_eq!(
            error,
            JsonRpcError {
                error_code: 21,
                message: "Job not found".into(),
                traceback: None,
            }
        );
        assert_eq!(error.to_string(), "Stratum error 21: Job not found");
    }

    #[test]
    fn error_serializes_as_array() {
        let error = JsonRpcError {
            error_code: 23,
            message: "Low difficulty share".into(),
            traceback: Some(json!("trace")),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!([23, "Low difficulty share", "trace"])
        );
    }
}
