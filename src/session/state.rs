use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[display("disconnected")]
    Disconnected,
    #[display("connecting")]
    Connecting,
    #[display("subscribing")]
    Subscribing,
    #[display("authorizing")]
    Authorizing,
    #[display("ready")]
    Ready,
}

impl SessionState {
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serialization() {
        for state in [
            SessionState::Disconnected,
            SessionState::Connecting,
            SessionState::Subscribing,
            SessionState::Authorizing,
            SessionState::Ready,
        ] {
            assert_eq!(
                serde_json::to_value(state).unwrap(),
                Value::String(state.to_string())
            );
        }
    }

    #[test]
    fn only_ready_is_ready() {
        assert!(SessionState::Ready.is_ready());
        assert!(!SessionState::Authorizing.is_ready());
    }
}
