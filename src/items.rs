//! Items

/// Guard added to the weight when computing profit density, so zero-weight items
/// get a large but finite density.
pub const DENSITY_EPSILON: f64 = 1e-10;

/// A knapsack item: its identity is its index in the problem.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Item {
    profit: f64,
    weight: f64,
}

impl Item {
    /// Creates a new item with the given profit and weight
    pub fn new(profit: f64, weight: f64) -> Self {
        Self { profit, weight }
    }

    /// Returns the profit gained by selecting the item
    pub fn profit(&self) -> f64 {
        self.profit
    }

    /// Returns the weight the item consumes from the capacity
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Profit per unit of weight, `profit / (weight + ε)`.
    pub fn density(&self) -> f64 {
        self.profit / (self.weight + DENSITY_EPSILON)
    }
}
