use rust_decimal::Decimal;

/// Running totals for one label.
///
/// Only `(count, sum)` is kept; the mean is derived on read, so
/// `record` stays a constant-time update regardless of history length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub count: u64,
    pub sum: Decimal,
}

impl Aggregate {
    /// Aggregate for a label seen for the first time.
    pub fn first(duration: Decimal) -> Self {
        Self {
            count: 1,
            sum: duration,
        }
    }

    /// Fold one more duration in. Returns `false` (and leaves `self`
    /// untouched) if the sum would leave the decimal range.
    pub fn incorporate(&mut self, duration: Decimal) -> bool {
        match self.sum.checked_add(duration) {
            Some(sum) => {
                self.sum = sum;
                self.count += 1;
                true
            }
            None => false,
        }
    }

    /// Exact mean, normalized so `300 / 2` reads back as `150`.
    pub fn mean(&self) -> Decimal {
        // count >= 1 for every aggregate that exists
        (self.sum / Decimal::from(self.count)).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_starts_at_one() {
        let agg = Aggregate::first(Decimal::from(100));
        assert_eq!(agg.count, 1);
        assert_eq!(agg.sum, Decimal::from(100));
        assert_eq!(agg.mean(), Decimal::from(100));
    }

    #[test]
    fn mean_is_exact_for_simple_ratio() {
        let mut agg = Aggregate::first(Decimal::from(100));
        assert!(agg.incorporate(Decimal::from(200)));
        assert_eq!(agg.count, 2);
        assert_eq!(agg.mean(), Decimal::from(150));
        assert_eq!(agg.mean().to_string(), "150");
    }

    #[test]
    fn mean_keeps_fractional_digits() {
        let mut agg = Aggregate::first(Decimal::new(1005, 1)); // 100.5
        agg.incorporate(Decimal::new(2, 1)); // 0.2
        assert_eq!(agg.mean(), Decimal::new(5035, 2)); // 50.35
    }

    #[test]
    fn overflow_leaves_aggregate_untouched() {
        let mut agg = Aggregate::first(Decimal::MAX);
        assert!(!agg.incorporate(Decimal::MAX));
        assert_eq!(agg.count, 1);
        assert_eq!(agg.sum, Decimal::MAX);
    }
}
