//! Lazily enumerated deposit distributions on a fixed increment grid

/// Slack for float division when converting amounts to whole steps
const STEP_EPSILON: f64 = 1e-9;

/// Whole increments that fit in `amount`
pub(crate) fn whole_steps(amount: f64, increment: f64) -> u64 {
    if amount.is_infinite() {
        return u64::MAX;
    }
    (amount / increment + STEP_EPSILON).floor().max(0.0) as u64
}

/// Every way of giving each bank a whole number of increments, bounded by
/// the bank's limit and by what is left of the total after the banks before it
///
/// Yields step counts per position, outermost position first, in the order
/// nested loops would visit them. Nothing is materialized up front.
#[derive(Debug, Clone)]
pub struct DistributionGrid {
    total_steps: u64,
    limits: Vec<u64>,
    current: Option<Vec<u64>>,
}

impl DistributionGrid {
    /// `limits[i]` caps position i in steps; position 0 starts at `min_first`
    pub fn new(total: f64, increment: f64, limits: Vec<u64>, min_first: u64) -> Self {
        let total_steps = whole_steps(total, increment);

        let current = match limits.first() {
            Some(&first) if min_first <= first.min(total_steps) => {
                let mut start = vec![0; limits.len()];
                start[0] = min_first;
                Some(start)
            }
            _ => None,
        };

        Self {
            total_steps,
            limits,
            current,
        }
    }

    /// Upper bound on the number of distributions, ignoring the shared total
    pub fn estimated_size(&self) -> u64 {
        self.limits
            .iter()
            .map(|&limit| limit.min(self.total_steps).saturating_add(1))
            .fold(1u64, |acc, points| acc.saturating_mul(points))
    }

    fn advance(&mut self) {
        let Some(steps) = self.current.as_mut() else {
            return;
        };

        for position in (0..steps.len()).rev() {
            let used: u64 = steps[..position].iter().sum();
            let ceiling = self.limits[position].min(self.total_steps - used);
            if steps[position] < ceiling {
                steps[position] += 1;
                for later in &mut steps[position + 1..] {
                    *later = 0;
                }
                return;
            }
        }
        self.current = None;
    }
}

impl Iterator for DistributionGrid {
    type Item = Vec<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current.clone()?;
        self.advance();
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order() {
        let grid = DistributionGrid::new(10_000.0, 5_000.0, vec![2, 2], 0);
        let visited: Vec<_> = grid.collect();
        assert_eq!(
            visited,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![2, 0],
            ]
        );
    }

    #[test]
    fn test_limits_bound_each_position() {
        let grid = DistributionGrid::new(20_000.0, 5_000.0, vec![1, 4], 0);
        let visited: Vec<_> = grid.collect();
        assert!(visited.iter().all(|steps| steps[0] <= 1));
        assert!(visited.iter().all(|steps| steps.iter().sum::<u64>() <= 4));
        assert_eq!(visited.len(), 5 + 4);
    }

    #[test]
    fn test_minimum_first_position() {
        let grid = DistributionGrid::new(10_000.0, 5_000.0, vec![2, 2], 1);
        let visited: Vec<_> = grid.collect();
        assert_eq!(visited.first(), Some(&vec![1, 0]));
        assert_eq!(visited.len(), 3);

        // Nothing fits when the total is below one increment
        let grid = DistributionGrid::new(3_000.0, 5_000.0, vec![2, 2], 1);
        assert_eq!(grid.count(), 0);
    }

    #[test]
    fn test_count_matches_combinations() {
        // Unbounded limits: C(n + k, k) distributions of n steps over k banks
        let grid = DistributionGrid::new(50_000.0, 5_000.0, vec![u64::MAX; 5], 0);
        assert_eq!(grid.estimated_size(), 11u64.pow(5));
        assert_eq!(grid.count(), 3003);
    }

    #[test]
    fn test_whole_steps() {
        assert_eq!(whole_steps(150_000.0, 5_000.0), 30);
        assert_eq!(whole_steps(14_999.0, 5_000.0), 2);
        assert_eq!(whole_steps(0.3, 0.1), 3);
        assert_eq!(whole_steps(f64::INFINITY, 5_000.0), u64::MAX);
    }
}
