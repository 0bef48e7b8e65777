use {super::*, crate::header::HEADER_SIZE};

/// Reference engine that splits each batch across scoped OS threads.
#[derive(Debug, Clone)]
pub struct CpuEngine {
    threads: usize,
}

impl CpuEngine {
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    pub fn available() -> Self {
        Self::new(thread::available_parallelism().map_or(1, |n| n.get()))
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the number of nonces actually hashed, which falls short of
    /// `count` once `MAX_CANDIDATES` hits are collected.
    fn scan(header: &Header, start: u32, count: u32, target: u32) -> (u64, Vec<Candidate>) {
        let mut buffer = header.with_nonce(0);
        let mut candidates = Vec::new();
        let mut hashes = 0;

        for offset in 0..count {
            let nonce = start.wrapping_add(offset);
            buffer[HEADER_SIZE..].copy_from_slice(&nonce.to_le_bytes());

            let digest = sha256d::Hash::hash(&buffer).to_byte_array();
            let leading_zero_bits = leading_zero_bits(&digest);
            hashes += 1;

            if leading_zero_bits >= target {
                candidates.push(Candidate {
                    nonce,
                    leading_zero_bits,
                });

                if candidates.len() >= MAX_CANDIDATES {
                    break;
                }
            }
        }

        (hashes, candidates)
    }
}

impl HashEngine for CpuEngine {
    fn search_batch(
        &self,
        header: &Header,
        nonce_start: u32,
        batch_size: u32,
        target: u32,
    ) -> Result<BatchResult, Error> {
        if batch_size == 0 {
            return Ok(BatchResult::default());
        }

        let workers = u32::try_from(self.threads)
            .unwrap_or(u32::MAX)
            .min(batch_size);
        let base = batch_size / workers;
        let remainder = batch_size % workers;

        let per_worker = thread::scope(|scope| {
            let handles = (0..workers)
                .map(|worker| {
                    let offset = worker * base + worker.min(remainder);
                    let count = base + u32::from(worker < remainder);
                    let start = nonce_start.wrapping_add(offset);
                    scope.spawn(move || Self::scan(header, start, count, target))
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| Error::WorkerPanicked))
                .collect::<Result<Vec<_>, Error>>()
        })?;

        let hashes = per_worker.iter().map(|(hashes, _)| hashes).sum();

        let mut candidates = per_worker
            .into_iter()
            .flat_map(|(_, candidates)| candidates)
            .collect::<Vec<_>>();
        candidates.sort_by_key(|candidate| candidate.nonce.wrapping_sub(nonce_start));
        candidates.truncate(MAX_CANDIDATES);

        Ok(BatchResult {
            hashes,
            candidates,
        })
    }
}
