use super::*;

/// A unit of work from `mining.notify`. Never mutated after arrival; a newer
/// notification replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub prev_hash: String,
    pub coinbase1: String,
    pub coinbase2: String,
    pub merkle_branches: Vec<String>,
    pub version: String,
    pub nbits: String,
    pub ntime: String,
    pub clean_jobs: bool,
    pub received: Instant,
}

impl From<Notify> for Job {
    fn from(notify: Notify) -> Self {
        Self {
            id: notify.job_id,
            prev_hash: notify.prevhash,
            coinbase1: notify.coinb1,
            coinbase2: notify.coinb2,
            merkle_branches: notify.merkle_branches,
            version: notify.version,
            nbits: notify.nbits,
            ntime: notify.ntime,
            clean_jobs: notify.clean_jobs,
            received: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn from_notify_keeps_every_field() {
        let notify: Notify = serde_json::from_str(
            r#"["bf", "00ff", "01", "02", ["aa", "bb"], "20000000", "1d00ffff", "5f5e1000", true]"#,
        )
        .unwrap();

        let job = Job::from(notify);

        assert_eq!(job.id, JobId::from("bf"));
        assert_eq!(job.prev_hash, "00ff");
        assert_eq!(job.coinbase1, "01");
        assert_eq!(job.coinbase2, "02");
        assert_eq!(job.merkle_branches, vec!["aa".to_string(), "bb".to_string()]);
        assert_eq!(job.version, "20000000");
        assert_eq!(job.nbits, "1d00ffff");
        assert_eq!(job.ntime, "5f5e1000");
        assert!(job.clean_jobs);
    }
}
