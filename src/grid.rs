// Primary grid of univariate distributions

use std::sync::Arc;

use crate::error::{GridError, Result};

/// A distribution placed at primary coordinate `x`.
#[derive(Debug)]
pub struct GridEntry<D> {
    pub x: f64,
    pub dist: Arc<D>,
}

impl<D> GridEntry<D> {
    pub fn new(x: f64, dist: D) -> Self {
        GridEntry { x, dist: Arc::new(dist) }
    }

    /// Build an entry around a distribution shared with other grids
    pub fn from_shared(x: f64, dist: Arc<D>) -> Self {
        GridEntry { x, dist }
    }

    #[inline]
    pub fn distribution(&self) -> &D {
        &self.dist
    }
}

impl<D> Clone for GridEntry<D> {
    fn clone(&self) -> Self {
        GridEntry { x: self.x, dist: Arc::clone(&self.dist) }
    }
}

/// The pair of adjacent entries bracketing a primary value.
#[derive(Debug)]
pub struct BinBoundaries<'a, D> {
    /// Grid index of `lower`
    pub index: usize,
    pub lower: &'a GridEntry<D>,
    pub upper: &'a GridEntry<D>,
}

impl<'a, D> Clone for BinBoundaries<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D> Copy for BinBoundaries<'a, D> {}

/// Entries sorted by strictly increasing primary coordinate.
#[derive(Debug)]
pub struct BivariateGrid<D> {
    entries: Vec<GridEntry<D>>,
}

impl<D> Clone for BivariateGrid<D> {
    fn clone(&self) -> Self {
        BivariateGrid { entries: self.entries.clone() }
    }
}

impl<D> BivariateGrid<D> {
    /// Validate and wrap a list of grid entries
    ///
    /// # Arguments
    ///
    /// * `entries` - At least two entries with finite, strictly increasing `x`
    ///
    /// # Returns
    ///
    /// The grid, or the first validation failure found
    pub fn new(entries: Vec<GridEntry<D>>) -> Result<Self> {
        if entries.len() < 2 {
            return Err(GridError::TooFewGridPoints { len: entries.len() });
        }

        for (index, entry) in entries.iter().enumerate() {
            if !entry.x.is_finite() {
                return Err(GridError::InvalidPrimaryValue { value: entry.x });
            }
            if index > 0 && entries[index - 1].x >= entry.x {
                return Err(GridError::UnsortedGrid {
                    index,
                    previous: entries[index - 1].x,
                    current: entry.x,
                });
            }
        }

        Ok(BivariateGrid { entries })
    }

    /// Build a grid from (x, distribution) pairs
    pub fn from_distributions<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, D)>,
    {
        Self::new(points.into_iter().map(|(x, dist)| GridEntry::new(x, dist)).collect())
    }

    pub fn entries(&self) -> &[GridEntry<D>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a valid grid holds at least two entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> &GridEntry<D> {
        &self.entries[0]
    }

    pub fn last(&self) -> &GridEntry<D> {
        &self.entries[self.entries.len() - 1]
    }

    pub fn primary_grid_min(&self) -> f64 {
        self.first().x
    }

    pub fn primary_grid_max(&self) -> f64 {
        self.last().x
    }

    pub fn is_primary_in_range(&self, x: f64) -> bool {
        x >= self.primary_grid_min() && x <= self.primary_grid_max()
    }

    /// Find the adjacent pair with `lower.x <= x <= upper.x`.
    ///
    /// An interior grid point is the lower boundary of its bin; the last grid
    /// point belongs to the last bin. Returns `None` outside the grid.
    pub fn find_bin_boundaries(&self, x: f64) -> Option<BinBoundaries<'_, D>> {
        if !self.is_primary_in_range(x) {
            return None;
        }
        let upper = self.entries.partition_point(|entry| entry.x <= x);
        let index = upper.saturating_sub(1).min(self.entries.len() - 2);
        Some(BinBoundaries {
            index,
            lower: &self.entries[index],
            upper: &self.entries[index + 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::UniformDistribution;

    fn grid() -> BivariateGrid<UniformDistribution> {
        BivariateGrid::from_distributions(vec![
            (0.0, UniformDistribution::new(0.0, 10.0, 1.0).unwrap()),
            (1.0, UniformDistribution::new(2.5, 7.5, 1.0).unwrap()),
            (2.0, UniformDistribution::new(0.0, 10.0, 0.1).unwrap()),
        ])
        .unwrap()
    }

    #[test]
    fn test_grid_limits() {
        let grid = grid();
        assert_eq!(grid.len(), 3);
        assert!(!grid.is_empty());
        assert_eq!(grid.primary_grid_min(), 0.0);
        assert_eq!(grid.primary_grid_max(), 2.0);
        assert!(grid.is_primary_in_range(2.0));
        assert!(!grid.is_primary_in_range(-0.1));
    }

    #[test]
    fn test_find_bin_boundaries() {
        let grid = grid();
        let bins = grid.find_bin_boundaries(0.5).unwrap();
        assert_eq!((bins.index, bins.lower.x, bins.upper.x), (0, 0.0, 1.0));

        // Interior grid points are the lower boundary of their bin
        let bins = grid.find_bin_boundaries(1.0).unwrap();
        assert_eq!((bins.index, bins.lower.x, bins.upper.x), (1, 1.0, 2.0));

        let bins = grid.find_bin_boundaries(2.0).unwrap();
        assert_eq!((bins.index, bins.lower.x, bins.upper.x), (1, 1.0, 2.0));

        let bins = grid.find_bin_boundaries(0.0).unwrap();
        assert_eq!(bins.index, 0);

        assert!(grid.find_bin_boundaries(2.5).is_none());
        assert!(grid.find_bin_boundaries(f64::NAN).is_none());
    }

    #[test]
    fn test_grid_validation() {
        let dist = || UniformDistribution::new(0.0, 1.0, 1.0).unwrap();
        assert!(matches!(
            BivariateGrid::from_distributions(vec![(0.0, dist())]),
            Err(GridError::TooFewGridPoints { len: 1 })
        ));
        assert!(matches!(
            BivariateGrid::from_distributions(vec![(1.0, dist()), (1.0, dist())]),
            Err(GridError::UnsortedGrid { index: 1, .. })
        ));
        assert!(matches!(
            BivariateGrid::from_distributions(vec![(0.0, dist()), (f64::INFINITY, dist())]),
            Err(GridError::InvalidPrimaryValue { .. })
        ));
    }

    #[test]
    fn test_entries_share_distributions() {
        let shared = Arc::new(UniformDistribution::new(0.0, 1.0, 1.0).unwrap());
        let grid = BivariateGrid::new(vec![
            GridEntry::from_shared(0.0, Arc::clone(&shared)),
            GridEntry::from_shared(1.0, Arc::clone(&shared)),
        ])
        .unwrap();
        let copy = grid.clone();
        assert_eq!(Arc::strong_count(&shared), 5);
        assert_eq!(copy.first().distribution(), grid.last().distribution());
    }
}
