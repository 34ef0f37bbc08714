//! Range-table classifier.

use crate::error::BuildError;
use crate::types::Category;

/// Inclusive `[low, high]` magnitude range mapped to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRange {
    pub low: i32,
    pub high: i32,
    pub category: Category,
}

impl CategoryRange {
    pub const fn new(low: i32, high: i32, category: Category) -> Self {
        Self {
            low,
            high,
            category,
        }
    }

    #[inline]
    pub fn contains(&self, magnitude: i32) -> bool {
        self.low <= magnitude && magnitude <= self.high
    }
}

/// Ordered ranges; the first containing range wins, otherwise `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    ranges: Vec<CategoryRange>,
}

impl Classifier {
    pub fn new(ranges: Vec<CategoryRange>) -> Result<Self, BuildError> {
        for r in &ranges {
            if r.low > r.high {
                return Err(BuildError::InvalidConfig("classifier range low must be <= high"));
            }
            if r.category == Category::Unknown {
                return Err(BuildError::InvalidConfig(
                    "classifier range cannot map to unknown",
                ));
            }
        }
        Ok(Self { ranges })
    }

    pub fn classify(&self, magnitude: i32) -> Category {
        self.ranges
            .iter()
            .find(|r| r.contains(magnitude))
            .map_or(Category::Unknown, |r| r.category)
    }

    pub fn ranges(&self) -> &[CategoryRange] {
        &self.ranges
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            ranges: crate::config::ClassifierCfg::default().ranges,
        }
    }
}
