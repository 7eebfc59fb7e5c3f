//! Anthropometric calculations for physical evaluations
//!
//! Values are carried as `Decimal` so that what the evaluation form shows
//! is exactly what gets stored and compared between evaluations.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ============================================================================
// BMI
// ============================================================================

/// WHO body-mass-index classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    SeverelyUnderweight,
    Underweight,
    Normal,
    Overweight,
    ObeseClass1,
    ObeseClass2,
    ObeseClass3,
}

impl BmiCategory {
    /// Lower (inclusive) and upper (exclusive) BMI bounds
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::SeverelyUnderweight => (0.0, 16.0),
            BmiCategory::Underweight => (16.0, 18.5),
            BmiCategory::Normal => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::ObeseClass1 => (30.0, 35.0),
            BmiCategory::ObeseClass2 => (35.0, 40.0),
            BmiCategory::ObeseClass3 => (40.0, f64::INFINITY),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::SeverelyUnderweight => "Severely Underweight",
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal/Healthy",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObeseClass1 => "Obese (Class I)",
            BmiCategory::ObeseClass2 => "Obese (Class II)",
            BmiCategory::ObeseClass3 => "Obese (Class III)",
        }
    }
}

/// BMI = weight(kg) / height(m)², one decimal place, half away from zero
///
/// Returns `None` when height is not positive.
pub fn calculate_bmi(weight_kg: Decimal, height_m: Decimal) -> Option<Decimal> {
    if height_m <= Decimal::ZERO {
        return None;
    }
    let squared = height_m.checked_mul(height_m)?;
    weight_kg
        .checked_div(squared)
        .map(|bmi| bmi.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

pub fn classify_bmi(bmi: Decimal) -> BmiCategory {
    let bmi = bmi.to_f64().unwrap_or(0.0);
    if bmi < 16.0 {
        BmiCategory::SeverelyUnderweight
    } else if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::ObeseClass1
    } else if bmi < 40.0 {
        BmiCategory::ObeseClass2
    } else {
        BmiCategory::ObeseClass3
    }
}

// ============================================================================
// Progress Between Evaluations
// ============================================================================

/// Change in one measurement between the first and the latest evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDelta {
    pub initial: Decimal,
    pub current: Decimal,
    /// `current - initial`
    pub change: Decimal,
    /// Reduction relative to the initial value, in percent (positive = lower now)
    pub improvement_percent: Decimal,
}

impl MeasurementDelta {
    /// `None` unless both evaluations recorded the measurement
    pub fn between(initial: Option<Decimal>, current: Option<Decimal>) -> Option<Self> {
        let (initial, current) = (initial?, current?);
        let change = current - initial;
        let improvement_percent = if initial.is_zero() {
            Decimal::ZERO
        } else {
            ((initial - current) / initial * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        };
        Some(Self {
            initial,
            current,
            change,
            improvement_percent,
        })
    }
}

/// Progress score on a 0-100 scale from the first and last session ratings
///
/// A flat trend scores 50; every rating point gained adds 20.
pub fn progress_score(first_rating: i32, last_rating: i32) -> f64 {
    let delta = (last_rating - first_rating) as f64;
    (delta / 5.0 * 100.0 + 50.0).clamp(0.0, 100.0)
}

/// Mean of the given values rounded to two decimals; `None` when empty
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i32 = ratings.iter().sum();
    Some((sum as f64 / ratings.len() as f64 * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_bmi_rounds_half_away_from_zero() {
        // 70 / 1.75² = 22.857...
        assert_eq!(calculate_bmi(dec("70"), dec("1.75")), Some(dec("22.9")));
        // 58 / 1.70² = 20.069...
        assert_eq!(calculate_bmi(dec("58"), dec("1.70")), Some(dec("20.1")));
        // 25 / 1² is exact
        assert_eq!(calculate_bmi(dec("25"), dec("1")), Some(dec("25.0")));
        // 22.45 exactly rounds up
        assert_eq!(calculate_bmi(dec("22.45"), dec("1")), Some(dec("22.5")));
    }

    #[test]
    fn test_bmi_requires_positive_height() {
        assert_eq!(calculate_bmi(dec("70"), Decimal::ZERO), None);
        assert_eq!(calculate_bmi(dec("70"), dec("-1.7")), None);
    }

    #[test]
    fn test_classify_bmi_boundaries() {
        assert_eq!(classify_bmi(dec("15.9")), BmiCategory::SeverelyUnderweight);
        assert_eq!(classify_bmi(dec("18.4")), BmiCategory::Underweight);
        assert_eq!(classify_bmi(dec("18.5")), BmiCategory::Normal);
        assert_eq!(classify_bmi(dec("24.9")), BmiCategory::Normal);
        assert_eq!(classify_bmi(dec("25.0")), BmiCategory::Overweight);
        assert_eq!(classify_bmi(dec("30.0")), BmiCategory::ObeseClass1);
        assert_eq!(classify_bmi(dec("40.0")), BmiCategory::ObeseClass3);
    }

    #[test]
    fn test_measurement_delta() {
        let delta = MeasurementDelta::between(Some(dec("80")), Some(dec("76"))).unwrap();
        assert_eq!(delta.change, dec("-4"));
        assert_eq!(delta.improvement_percent, dec("5.0"));
        assert!(MeasurementDelta::between(None, Some(dec("76"))).is_none());
    }

    #[test]
    fn test_progress_score() {
        assert_eq!(progress_score(3, 3), 50.0);
        assert_eq!(progress_score(2, 4), 90.0);
        assert_eq!(progress_score(1, 5), 100.0);
        assert_eq!(progress_score(5, 1), 0.0);
        assert_eq!(progress_score(4, 3), 30.0);
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[4, 5, 5]), Some(4.67));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Heavier at the same height never lowers BMI
        #[test]
        fn prop_bmi_monotonic_in_weight(w in 300u32..3000, extra in 0u32..500, h in 120u32..220) {
            let height = Decimal::new(h as i64, 2);
            let lighter = calculate_bmi(Decimal::new(w as i64, 1), height).unwrap();
            let heavier = calculate_bmi(Decimal::new((w + extra) as i64, 1), height).unwrap();
            prop_assert!(heavier >= lighter);
        }

        #[test]
        fn prop_progress_score_in_bounds(first in 1i32..=5, last in 1i32..=5) {
            let score = progress_score(first, last);
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }
}
