use super::*;

pub use cpu::CpuEngine;

mod cpu;

/// Upper bound on candidates reported from a single batch.
pub const MAX_CANDIDATES: usize = 100;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Hash engine unavailable: {message}"))]
    Unavailable { message: String },
    #[snafu(display("Hashing worker panicked"))]
    WorkerPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub nonce: u32,
    pub leading_zero_bits: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub hashes: u64,
    pub candidates: Vec<Candidate>,
}

/// A blocking nonce searcher. `search_batch` scans `batch_size` nonces from
/// `nonce_start`, wrapping past `u32::MAX`, and reports every nonce whose hash
/// has at least `target` leading zero bits.
pub trait HashEngine: Send + Sync {
    fn search_batch(
        &self,
        header: &Header,
        nonce_start: u32,
        batch_size: u32,
        target: u32,
    ) -> Result<BatchResult, Error>;
}

/// Leading zero bits of a digest read in display order, most significant
/// byte last in hash order.
pub fn leading_zero_bits(digest: &[u8; 32]) -> u32 {
    let mut bits = 0;

    for byte in digest.iter().rev() {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }

    bits
}
