use super::*;

/// Point-in-time view of the miner, safe to hand to any task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub ready: bool,
    pub job_id: Option<JobId>,
    pub hashes: u64,
    pub hash_rate: HashRate,
    pub batches: u64,
    pub nonce_cursor: u32,
    pub session_shares: u64,
    pub lifetime_shares: u64,
    pub job_shares: u64,
    pub best_difficulty: u32,
    pub pool_difficulty: Option<f64>,
    pub accepted: u64,
    pub rejected: u64,
    pub disconnects: u64,
    pub reconnects: u64,
    pub uptime_secs: u64,
    pub block_elapsed_secs: Option<u64>,
    pub price: Option<f64>,
}

impl StatusLine for Snapshot {
    fn status_line(&self) -> String {
        let mut line = format!(
            "hashrate={}  shares={}/{}  best={}  uptime={}s",
            self.hash_rate,
            self.session_shares,
            self.lifetime_shares,
            self.best_difficulty,
            self.uptime_secs,
        );

        if let Some(job_id) = &self.job_id {
            line.push_str(&format!("  job={job_id}"));
        }

        if let Some(elapsed) = self.block_elapsed_secs {
            line.push_str(&format!("  block={elapsed}s"));
        }

        if let Some(price) = self.price {
            line.push_str(&format!("  price=${price:.2}"));
        }

        if !self.ready {
            line.push_str("  [offline]");
        }

        line
    }
}
