//! Block header construction from pool work.
//!
//! The header built here is the 76-byte prefix that the hash engine extends
//! with a little-endian nonce. Hash fields are stored byte-reversed relative to
//! the hex the pool sends.

use super::*;

pub const HEADER_SIZE: usize = 76;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum MalformedJob {
    #[snafu(display("`{field}` is not valid hex"))]
    Hex { field: &'static str },
    #[snafu(display("`{field}` is {actual} bytes, expected {expected}"))]
    Length {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Header([u8; HEADER_SIZE]);

impl Header {
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.0
    }

    /// The full 80-byte header with `nonce` appended little-endian.
    pub fn with_nonce(&self, nonce: u32) -> [u8; HEADER_SIZE + 4] {
        let mut full = [0u8; HEADER_SIZE + 4];
        full[..HEADER_SIZE].copy_from_slice(&self.0);
        full[HEADER_SIZE..].copy_from_slice(&nonce.to_le_bytes());
        full
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Header({self})")
    }
}

pub fn reversed<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    bytes.reverse();
    bytes
}

fn decode(field: &'static str, hex: &str) -> Result<Vec<u8>, MalformedJob> {
    Vec::from_hex(hex).map_err(|_| MalformedJob::Hex { field })
}

fn decode_array<const N: usize>(field: &'static str, hex: &str) -> Result<[u8; N], MalformedJob> {
    let bytes = decode(field, hex)?;
    let actual = bytes.len();

    <[u8; N]>::try_from(bytes).map_err(|_| MalformedJob::Length {
        field,
        expected: N,
        actual,
    })
}

/// Folds the coinbase hash up through `branches`, in order. Returns the root in
/// hash byte order, before the reversal applied in the header.
pub fn merkle_root(coinbase: &[u8], branches: &[String]) -> Result<[u8; 32], MalformedJob> {
    let mut root = sha256d::Hash::hash(coinbase).to_byte_array();

    for branch in branches {
        let branch = decode_array::<32>("merkle_branch", branch)?;

        let mut concat = [0u8; 64];
        concat[..32].copy_from_slice(&root);
        concat[32..].copy_from_slice(&branch);

        root = sha256d::Hash::hash(&concat).to_byte_array();
    }

    Ok(root)
}

pub fn coinbase(
    job: &Job,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
) -> Result<Vec<u8>, MalformedJob> {
    let mut coinbase = decode("coinbase1", &job.coinbase1)?;
    coinbase.extend_from_slice(extranonce1.as_bytes());
    coinbase.extend_from_slice(extranonce2.as_bytes());
    coinbase.extend(decode("coinbase2", &job.coinbase2)?);
    Ok(coinbase)
}

/// Builds the 76-byte header for `job`. Deterministic for identical inputs and
/// free of side effects.
pub fn build(
    job: &Job,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
) -> Result<Header, MalformedJob> {
    let root = merkle_root(&coinbase(job, extranonce1, extranonce2)?, &job.merkle_branches)?;

    let version = u32::from_be_bytes(decode_array("version", &job.version)?);
    let prev_hash = decode_array::<32>("prev_hash", &job.prev_hash)?;
    let ntime = u32::from_be_bytes(decode_array("ntime", &job.ntime)?);
    let nbits = decode_array::<4>("nbits", &job.nbits)?;

    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&version.to_le_bytes());
    header[4..36].copy_from_slice(&reversed(prev_hash));
    header[36..68].copy_from_slice(&reversed(root));
    header[68..72].copy_from_slice(&ntime.to_le_bytes());
    header[72..76].copy_from_slice(&reversed(nbits));

    Ok(Header(header))
}
