//! Tunables of the evaluation engine.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Expected atoms per cubic ångström, used to pre-size neighbor buffers.
    pub packing_density: f64,
    /// Radii below this select nothing.
    pub min_radius: f64,
    /// Spatial searches with at least this many query points run in parallel.
    pub parallel_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packing_density: 0.35,
            min_radius: 0.001,
            parallel_threshold: 32,
        }
    }
}

impl Config {
    pub fn packing_density(mut self, density: f64) -> Self {
        self.packing_density = density;
        self
    }

    pub fn min_radius(mut self, radius: f64) -> Self {
        self.min_radius = radius;
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Expected number of atoms in a sphere of `radius`, never below 1. Only a
    /// capacity hint: buffers grow past it.
    pub fn neighbor_capacity(&self, radius: f64) -> usize {
        let expected = self.packing_density * 4.0 / 3.0 * PI * radius.powi(3);
        if expected.is_finite() && expected >= 1.0 {
            expected.ceil() as usize
        } else {
            1
        }
    }
}
