use super::*;

/// `mining.notify` params. Hex fields are kept exactly as the pool sent them;
/// validating and decoding them is the header builder's job.
#[derive(Debug, PartialEq, Clone)]
pub struct Notify {
    pub job_id: JobId,
    pub prevhash: String,
    pub coinb1: String,
    pub coinb2: String,
    pub merkle_branches: Vec<String>,
    pub version: String,
    pub nbits: String,
    pub ntime: String,
    pub clean_jobs: bool,
}

impl Serialize for Notify {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(9))?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.prevhash)?;
        seq.serialize_element(&self.coinb1)?;
        seq.serialize_element(&self.coinb2)?;
        seq.serialize_element(&self.merkle_branches)?;
        seq.serialize_element(&self.version)?;
        seq.serialize_element(&self.nbits)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.clean_jobs)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Notify {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (job_id, prevhash, coinb1, coinb2, merkle_branches, version, nbits, ntime, clean_jobs) =
            <(
                JobId,
                String,
                String,
                String,
                Vec<String>,
                String,
                String,
                String,
                bool,
            )>::deserialize(deserializer)?;

        Ok(Notify {
            job_id,
            prevhash,
            coinb1,
            coinb2,
            merkle_branches,
            version,
            nbits,
            ntime,
            clean_jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, serde_json::json};

    fn sample_notify(clean_jobs: bool) -> Notify {
        Notify {
            job_id: "bf".into(),
            prevhash: "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000".into(),
            coinb1: "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008".into(),
            coinb2: "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000".into(),
            merkle_branches: vec![
                "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a".into(),
            ],
            version: "00000002".into(),
            nbits: "1c2ac4af".into(),
            ntime: "504e86b9".into(),
            clean_jobs,
        }
    }

    fn sample_json(clean_jobs: bool) -> Value {
        json!([
            "bf",
            "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
            "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008",
            "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000",
            ["3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a"],
            "00000002",
            "1c2ac4af",
            "504e86b9",
            clean_jobs
        ])
    }

    #[test]
    fn notify_from_params() {
        assert_eq!(
            serde_json::from_value::<Notify>(sample_json(false)).unwrap(),
            sample_notify(false)
        );
        assert_eq!(
            serde_json::from_value::<Notify>(sample_json(true)).unwrap(),
            sample_notify(true)
        );
    }

    #[test]
    fn notify_serialize_shape() {
        assert_eq!(
            serde_json::to_value(sample_notify(true)).unwrap(),
            sample_json(true)
        );
    }

    #[test]
    fn merkle_branch_order_is_preserved() {
        let mut params = sample_json(false);
        params[4] = json!(["aa", "bb", "cc"]);
        let notify: Notify = serde_json::from_value(params).unwrap();
        assert_eq!(notify.merkle_branches, vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn notify_rejects_wrong_arity() {
        let mut params = sample_json(false);
        params.as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<Notify>(params).is_err());
    }

    #[test]
    fn notify_rejects_non_bool_clean_jobs() {
        let mut params = sample_json(false);
        params[8] = json!("yes");
        assert!(serde_json::from_value::<Notify>(params).is_err());
    }
}
