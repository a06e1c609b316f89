//! Time-bank balance for a single punch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Worked-minus-contractual hours, split into accumulators.
///
/// At most one of `positive` and `negative` is non-zero, and
/// `positive - negative == balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeBankBalance {
    /// Hours credited to the bank.
    pub positive: Decimal,
    /// Hours owed to the bank.
    pub negative: Decimal,
    /// Signed balance.
    pub balance: Decimal,
}

/// Computes the time-bank movement for one day.
///
/// ```
/// use timebank_engine::calculation::compute_time_bank;
/// use rust_decimal::Decimal;
///
/// let bank = compute_time_bank(Decimal::new(65, 1), Decimal::new(8, 0));
/// assert_eq!(bank.positive, Decimal::ZERO);
/// assert_eq!(bank.negative, Decimal::new(15, 1));
/// assert_eq!(bank.balance, Decimal::new(-15, 1));
/// ```
pub fn compute_time_bank(worked_hours: Decimal, contractual_hours: Decimal) -> TimeBankBalance {
    let diff = worked_hours - contractual_hours;
    TimeBankBalance {
        positive: diff.max(Decimal::ZERO),
        negative: (-diff).max(Decimal::ZERO),
        balance: diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_credit() {
        let bank = compute_time_bank(dec("10"), dec("8"));
        assert_eq!(bank.positive, dec("2"));
        assert_eq!(bank.negative, Decimal::ZERO);
        assert_eq!(bank.balance, dec("2"));
    }

    #[test]
    fn test_even_day() {
        assert_eq!(compute_time_bank(dec("8"), dec("8")), TimeBankBalance::default());
    }

    #[test]
    fn test_debit() {
        let bank = compute_time_bank(dec("7.25"), dec("8"));
        assert_eq!(bank.negative, dec("0.75"));
        assert_eq!(bank.positive - bank.negative, bank.balance);
    }

    #[test]
    fn test_serialization_uses_strings() {
        let json = serde_json::to_string(&compute_time_bank(dec("9.5"), dec("8"))).unwrap();
        assert!(json.contains("\"positive\":\"1.5\""));
    }
}
