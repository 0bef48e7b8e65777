use super::*;

/// Start of the next nonce range. Wraps modulo 2^32 and survives job changes.
/// Only the mining loop advances it.
#[derive(Debug, Default)]
pub struct NonceCursor(AtomicU32);

impl NonceCursor {
    pub fn new(start: u32) -> Self {
        Self(AtomicU32::new(start))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Moves the cursor forward by `by`, returning the previous position.
    pub fn advance(&self, by: u32) -> u32 {
        self.0.fetch_add(by, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_where_told() {
        assert_eq!(NonceCursor::default().get(), 0);
        assert_eq!(NonceCursor::new(42).get(), 42);
    }

    #[test]
    fn advance_returns_previous_position() {
        let cursor = NonceCursor::new(10);
        assert_eq!(cursor.advance(5), 10);
        assert_eq!(cursor.get(), 15);
    }

    #[test]
    fn wraps_past_max() {
        let cursor = NonceCursor::new(u32::MAX - 1);
        cursor.advance(3);
        assert_eq!(cursor.get(), 1);
    }

    #[test]
    fn n_advances_equal_product_mod_2_32() {
        for batch in [1u32, 1000, 1 << 24, 0x9e37_79b9, u32::MAX] {
            let cursor = NonceCursor::default();

            for n in 1..=600u64 {
                cursor.advance(batch);
                assert_eq!(
                    u64::from(cursor.get()),
                    (n * u64::from(batch)) % (1 << 32),
                    "batch {batch} after {n} advances"
                );
            }
        }
    }
}
