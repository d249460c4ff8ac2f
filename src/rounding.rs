//! Solution Rounder
//!
//! Turns a primal vector into a 0/1 selection that never exceeds capacity. Items are
//! decided greedily: the ones whose value is closest to an integer first, and among
//! equally uncertain items the densest first. An item rounded up is only kept while
//! it still fits.

use num_traits::ToPrimitive;
use tracing::trace;

use crate::problem::Problem;

/// Resolution integrality gaps are compared at, so that floating noise below it
/// cannot reorder items.
pub const GAP_SCALE: f64 = 1e6;

/// Raw values at or above this round up to 1.
pub const ROUNDING_THRESHOLD: f64 = 0.5;

/// Distance from `value` to its nearest integer in units of `1 / GAP_SCALE`.
///
/// Non-finite values are maximally uncertain.
pub fn integrality_gap(value: f64) -> i64 {
    ((value.round() - value).abs() * GAP_SCALE)
        .round()
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Order in which items are decided: ascending integrality gap, then descending
/// profit density. Equal keys keep index order.
pub fn decision_order(values: &[f64], problem: &Problem) -> Vec<usize> {
    let mut order: Vec<(usize, i64, f64)> = values
        .iter()
        .zip(problem.items())
        .enumerate()
        .map(|(idx, (&value, item))| (idx, integrality_gap(value), item.density()))
        .collect();

    order.sort_by(|(_, gap_a, density_a), (_, gap_b, density_b)| {
        gap_a
            .cmp(gap_b)
            .then_with(|| density_b.total_cmp(density_a))
    });

    order.into_iter().map(|(idx, _, _)| idx).collect()
}

/// Round `values` to a selection whose total weight stays within the problem capacity.
///
/// Items without a value are left unselected.
pub fn round(values: &[f64], problem: &Problem) -> Vec<bool> {
    let mut selection = vec![false; problem.len()];
    let mut current_weight = 0.0;

    for idx in decision_order(values, problem) {
        let (Some(&value), Some(item), Some(selected)) = (
            values.get(idx),
            problem.item(idx),
            selection.get_mut(idx),
        ) else {
            continue;
        };

        if value < ROUNDING_THRESHOLD || value.is_nan() {
            continue;
        }

        let proposed_weight = current_weight + item.weight();

        if proposed_weight <= problem.capacity() {
            *selected = true;
            current_weight = proposed_weight;
        }

        trace!(
            item = idx,
            value,
            selected = *selected,
            current_weight,
            "rounded item"
        );
    }

    selection
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::problem::ProblemError;

    use super::*;

    fn unconstrained(profit: &[f64], weight: &[f64], capacity: f64) -> Result<Problem, ProblemError> {
        Problem::new(profit, weight, &[], capacity)
    }

    #[test]
    fn gap_is_distance_to_nearest_integer() {
        assert_eq!(integrality_gap(0.0), 0);
        assert_eq!(integrality_gap(1.0), 0);
        assert_eq!(integrality_gap(0.25), 250_000);
        assert_eq!(integrality_gap(0.75), 250_000);
        assert_eq!(integrality_gap(0.5), 500_000);
        assert_eq!(integrality_gap(f64::NAN), i64::MAX);
    }

    #[test]
    fn gap_ignores_noise_below_resolution() {
        assert_eq!(integrality_gap(0.3), integrality_gap(0.300_000_000_1));
        assert_eq!(integrality_gap(1.0 - 1e-9), 0);
    }

    #[test]
    fn order_prefers_certain_items_then_dense_items() -> TestResult {
        let problem = unconstrained(&[1.0, 9.0, 2.0, 3.0], &[1.0, 1.0, 1.0, 1.0], 10.0)?;

        let order = decision_order(&[1.0, 0.5, 0.0, 0.0], &problem);

        // Gap 0: items 0, 2, 3 by density 3 > 2 > 1; then item 1 with gap 0.5.
        assert_eq!(order, vec![3, 2, 0, 1]);

        Ok(())
    }

    #[test]
    fn rounds_to_nearest_when_everything_fits() -> TestResult {
        let problem = unconstrained(&[1.0, 1.0, 1.0, 1.0], &[1.0, 1.0, 1.0, 1.0], 10.0)?;

        let selection = round(&[0.5, 0.49, 0.999_999, 0.000_001], &problem);

        assert_eq!(selection, vec![true, false, true, false]);

        Ok(())
    }

    #[test]
    fn drops_items_that_no_longer_fit_in_decision_order() -> TestResult {
        // Both values are 0.5 away from an integer, so item 0 (density 10) is decided first
        // and takes the only unit of capacity.
        let problem = unconstrained(&[10.0, 5.0], &[1.0, 1.0], 1.0)?;

        let selection = round(&[0.5, 0.5], &problem);

        assert_eq!(selection, vec![true, false]);

        Ok(())
    }

    #[test]
    fn certain_items_win_over_denser_uncertain_ones() -> TestResult {
        let problem = unconstrained(&[10.0, 1.0], &[1.0, 1.0], 1.0)?;

        let selection = round(&[0.6, 1.0], &problem);

        assert_eq!(selection, vec![false, true]);

        Ok(())
    }

    #[test]
    fn items_rounded_down_consume_no_capacity() -> TestResult {
        let problem = unconstrained(&[1.0, 1.0], &[5.0, 1.0], 1.0)?;

        let selection = round(&[0.1, 1.0], &problem);

        assert_eq!(selection, vec![false, true]);

        Ok(())
    }

    #[test]
    fn zero_capacity_selects_only_weightless_items() -> TestResult {
        let problem = unconstrained(&[1.0, 1.0], &[1.0, 0.0], 0.0)?;

        let selection = round(&[1.0, 1.0], &problem);

        assert_eq!(selection, vec![false, true]);

        Ok(())
    }

    #[test]
    fn nan_values_are_never_selected() -> TestResult {
        let problem = unconstrained(&[1.0], &[0.0], 1.0)?;

        assert_eq!(round(&[f64::NAN], &problem), vec![false]);

        Ok(())
    }
}
