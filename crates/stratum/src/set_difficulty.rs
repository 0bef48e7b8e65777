use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SetDifficulty(pub Vec<f64>);

impl SetDifficulty {
    pub fn difficulty(&self) -> Option<f64> {
        self.0.first().copied()
    }
}
