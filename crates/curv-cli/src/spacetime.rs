//! Built-in spacetimes selectable from the command line.

use std::f64::consts::FRAC_PI_2;

use anyhow::{Result, ensure};
use clap::ValueEnum;
use curv_core::{Metric, flrw, minkowski, schwarzschild, two_sphere};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Spacetime {
    /// Flat spacetime in (t, x, y, z)
    Minkowski,
    /// Exterior black hole in (t, r, θ, φ); param = rs
    Schwarzschild,
    /// Round 2-sphere in (θ, φ); param = radius
    Sphere,
    /// FLRW with a(t) = exp(H t); param = H
    DeSitter,
    /// FLRW with a(t) = t^p; param = p
    PowerLaw,
}

impl Spacetime {
    pub fn default_param(self) -> f64 {
        match self {
            Spacetime::PowerLaw => 2.0 / 3.0,
            _ => 1.0,
        }
    }

    /// A regular point of the chart for the given parameter.
    pub fn default_point(self, param: f64) -> Vec<f64> {
        match self {
            Spacetime::Minkowski | Spacetime::DeSitter => vec![0.0; 4],
            Spacetime::Schwarzschild => vec![0.0, 3.0 * param, FRAC_PI_2, 0.0],
            Spacetime::Sphere => vec![FRAC_PI_2, 0.0],
            Spacetime::PowerLaw => vec![1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn build(self, param: f64) -> Result<Box<dyn Metric>> {
        ensure!(param.is_finite(), "parameter must be finite, got {param}");
        let metric: Box<dyn Metric> = match self {
            Spacetime::Minkowski => Box::new(minkowski(4)?),
            Spacetime::Schwarzschild => Box::new(schwarzschild(param)?),
            Spacetime::Sphere => Box::new(two_sphere(param)?),
            Spacetime::DeSitter => Box::new(flrw(move |t| (param * t).exp())?),
            Spacetime::PowerLaw => Box::new(flrw(move |t| t.powf(param))?),
        };
        Ok(metric)
    }
}
