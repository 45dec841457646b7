use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Σ(value × weight) / Σ(weight). None when the weights sum to zero or less.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 || !total_weight.is_finite() {
        return None;
    }
    let weighted: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    Some(weighted / total_weight)
}

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample standard deviation (n - 1 denominator). Undefined below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied())?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Most frequent value. Ties go to the value seen first.
pub fn mode_first_seen<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Round a computed amount to cents, ties to even. None for NaN/infinite input.
pub fn to_cents(amount: f64) -> Option<Decimal> {
    Decimal::from_f64(amount).map(|d| {
        let mut cents = d.round_dp(2);
        cents.rescale(2);
        cents
    })
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn weighted_mean_basic() {
        let mean = weighted_mean(&[2.0, 4.0], &[1.0, 3.0]).unwrap();
        assert!((mean - 3.5).abs() < 1e-12);
    }

    #[test]
    fn weighted_mean_rejects_zero_total_weight() {
        assert_eq!(weighted_mean(&[1.0, 2.0], &[0.5, -0.5]), None);
        assert_eq!(weighted_mean(&[], &[]), None);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([100.0, 300.0]), Some(200.0));
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: population sd 2, sample sd sqrt(32/7)
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sample_std_dev_undefined_for_single_value() {
        assert_eq!(sample_std_dev(&[3.0]), None);
        assert_eq!(sample_std_dev(&[]), None);
    }

    #[test]
    fn mode_picks_most_frequent() {
        assert_eq!(mode_first_seen(["B", "A", "A", "B", "A"]), Some("A"));
    }

    #[test]
    fn mode_tie_goes_to_first_seen() {
        assert_eq!(mode_first_seen(["C", "B", "B", "C"]), Some("C"));
        assert_eq!(mode_first_seen(["B", "C", "C", "B"]), Some("B"));
        assert_eq!(mode_first_seen(std::iter::empty()), None);
    }

    #[test]
    fn to_cents_rounds_half_even() {
        assert_eq!(to_cents(1234.5678), Some(dec!(1234.57)));
        assert_eq!(to_cents(10.0).unwrap().to_string(), "10.00");
        assert_eq!(to_cents(f64::NAN), None);
    }
}
