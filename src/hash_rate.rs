use super::*;

const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, SerializeDisplay)]
pub struct HashRate(pub f64);

impl HashRate {
    pub const ZERO: Self = Self(0.0);
}

impl Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 || !self.0.is_finite() {
            return write!(f, "0 H/s");
        }

        let (prefix, divisor) = SI_PREFIXES
            .iter()
            .rev()
            .find(|(_, divisor)| self.0.abs() >= *divisor)
            .unwrap_or(&SI_PREFIXES[0]);

        let scaled = format!("{:.3}", self.0 / divisor);
        let trimmed = scaled.trim_end_matches('0').trim_end_matches('.');

        write!(f, "{trimmed} {prefix}H/s")
    }
}

/// Smooths a running hash counter into hashes per second.
///
/// Each sample is the counter delta since the previous sample. The estimate
/// moves toward the instantaneous rate with weight `1 - e^(-dt / window)`,
/// so sparse samples still converge.
#[derive(Debug)]
pub(crate) struct HashRateMeter {
    window: Duration,
    last_total: u64,
    last_sample: Instant,
    warm: bool,
    rate: f64,
}

impl HashRateMeter {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            last_total: 0,
            last_sample: now,
            warm: false,
            rate: 0.0,
        }
    }

    pub(crate) fn sample(&mut self, total: u64, now: Instant) -> HashRate {
        let elapsed = now.saturating_duration_since(self.last_sample).as_secs_f64();

        if elapsed <= 0.0 {
            return HashRate(self.rate);
        }

        let instantaneous = total.saturating_sub(self.last_total) as f64 / elapsed;

        if self.warm {
            let weight = -(-(elapsed / self.window.as_secs_f64()).min(36.0)).exp_m1();
            self.rate += weight * (instantaneous - self.rate);
        } else {
            self.rate = instantaneous;
            self.warm = total > 0;
        }

        self.last_total = total;
        self.last_sample = now;

        HashRate(self.rate)
    }
}
