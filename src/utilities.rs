/// Search helpers shared by the grid and the tabular distributions

/// Index `i` of the interval `[grid[i], grid[i + 1])` containing `value`.
///
/// Values below the grid map to the first interval and values at or above the
/// last point map to the last interval. `grid` must be ascending with at
/// least two points.
#[inline]
pub fn find_lower_bin_index(grid: &[f64], value: f64) -> usize {
    debug_assert!(grid.len() >= 2);
    let upper = grid.partition_point(|&g| g <= value);
    upper.saturating_sub(1).min(grid.len() - 2)
}

/// True when `values` is strictly increasing and free of NaN
pub fn is_strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// Bisect a monotone non-decreasing function for `f(x) == target` on `[lo, hi]`
pub fn bisect_monotone<F: Fn(f64) -> f64>(f: F, target: f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if f(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_lower_bin_index() {
        let grid = [0.0, 1.0, 2.0, 5.0];
        assert_eq!(find_lower_bin_index(&grid, -1.0), 0);
        assert_eq!(find_lower_bin_index(&grid, 0.0), 0);
        assert_eq!(find_lower_bin_index(&grid, 0.5), 0);
        assert_eq!(find_lower_bin_index(&grid, 1.0), 1);
        assert_eq!(find_lower_bin_index(&grid, 4.9), 2);
        assert_eq!(find_lower_bin_index(&grid, 5.0), 2);
        assert_eq!(find_lower_bin_index(&grid, 7.0), 2);
    }

    #[test]
    fn test_is_strictly_ascending() {
        assert!(is_strictly_ascending(&[0.0, 1.0, 2.0]));
        assert!(!is_strictly_ascending(&[0.0, 1.0, 1.0]));
        assert!(!is_strictly_ascending(&[0.0, f64::NAN]));
    }

    #[test]
    fn test_bisect_monotone() {
        let x = bisect_monotone(|x| x * x, 2.0, 0.0, 2.0);
        assert!((x - 2f64.sqrt()).abs() < 1e-14);
    }
}
