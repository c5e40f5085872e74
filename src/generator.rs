//! Synthetic populations for exercising the index.
//!
//! A world is a list of cities. Each city places its people with normally
//! distributed coordinates around a centre and uniformly distributed ages.
use std::str::FromStr;

use log::info;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Normal;

use crate::error::{Error, Result};
use crate::person::Person;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalParams {
    pub mean: f32,
    pub stddev: f32,
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformParams {
    pub lower: u32,
    pub upper: u32,
}

/// One city of a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorParams {
    pub longitude: NormalParams,
    pub latitude: NormalParams,
    pub age: UniformParams,
    pub number: u32,
}

impl GeneratorParams {
    pub const fn new(longitude: (f32, f32), latitude: (f32, f32), age: (u32, u32), number: u32) -> Self {
        GeneratorParams {
            longitude: NormalParams { mean: longitude.0, stddev: longitude.1 },
            latitude: NormalParams { mean: latitude.0, stddev: latitude.1 },
            age: UniformParams { lower: age.0, upper: age.1 },
            number: number,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (what, p) in &[("longitude", self.longitude), ("latitude", self.latitude)] {
            if !(p.stddev.is_finite() && p.stddev >= 0.0 && p.mean.is_finite()) {
                return Err(Error::InvalidParameter(
                    format!("{} needs a finite mean and non-negative stddev, got {:?}", what, p)));
            }
        }
        if self.age.lower > self.age.upper {
            return Err(Error::InvalidParameter(
                format!("age range {}..={} is empty", self.age.lower, self.age.upper)));
        }
        Ok(())
    }
}

pub type World = Vec<GeneratorParams>;

/// Named worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldPreset {
    /// One million people.
    Small,
    /// A hundred million people.
    Normal,
    /// Three hundred million people.
    Gigantic,
    /// Forty thousand people, used as queries.
    Test,
}

const SMALL: [GeneratorParams; 4] = [
    GeneratorParams::new((-40.0, 20.0), (80.0, 10.0), (13, 100), 300_000),
    GeneratorParams::new((50.0, 30.0), (-30.0, 30.0), (7, 110), 250_000),
    GeneratorParams::new((1.0, 40.0), (50.0, 3.0), (0, 80), 350_000),
    GeneratorParams::new((-10.0, 30.0), (70.0, 20.0), (10, 70), 100_000),
];

const TEST: [GeneratorParams; 4] = [
    GeneratorParams::new((40.0, 30.0), (70.0, 10.0), (0, 100), 10_000),
    GeneratorParams::new((-50.0, 30.0), (20.0, 30.0), (0, 110), 10_000),
    GeneratorParams::new((10.0, 40.0), (20.0, 30.0), (0, 80), 10_000),
    GeneratorParams::new((-70.0, 30.0), (-70.0, 20.0), (0, 70), 10_000),
];

impl WorldPreset {
    pub fn world(self) -> World {
        let scale = match self {
            WorldPreset::Small => 1,
            WorldPreset::Normal => 100,
            WorldPreset::Gigantic => 300,
            WorldPreset::Test => return TEST.to_vec(),
        };
        SMALL.iter()
            .map(|p| GeneratorParams { number: p.number * scale, ..*p })
            .collect()
    }
}

impl FromStr for WorldPreset {
    type Err = Error;

    /// Accepts the full name or its first letter.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().chars().next() {
            Some('s') => Ok(WorldPreset::Small),
            Some('n') => Ok(WorldPreset::Normal),
            Some('g') => Ok(WorldPreset::Gigantic),
            Some('t') => Ok(WorldPreset::Test),
            _ => Err(Error::UnknownWorld(s.to_string())),
        }
    }
}

/// Generate everyone in `world`.
///
/// People are named `1..=total` in city order. Each city draws from its own
/// generator derived from `seed`, so output is reproducible. Cities of
/// different seeds never share a stream unless the seeds collide after
/// mixing.
pub fn generate(world: &[GeneratorParams], seed: u64) -> Result<Vec<Person>> {
    for params in world {
        params.validate()?;
    }

    let total: usize = world.iter().map(|p| p.number as usize).sum();
    let mut people = Vec::with_capacity(total);
    for (city, params) in world.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(city_seed(seed, city));
        let longitude = normal(params.longitude)?;
        let latitude = normal(params.latitude)?;
        let age = Uniform::new_inclusive(params.age.lower, params.age.upper);

        let first = people.len() as u32 + 1;
        people.extend((0..params.number).map(|i| Person {
            name: first + i,
            age: age.sample(&mut rng),
            latitude: latitude.sample(&mut rng),
            longitude: longitude.sample(&mut rng),
        }));
    }

    info!("generated {} people in {} cities", people.len(), world.len());
    Ok(people)
}

/// Seed for queries meant to be independent of a population generated
/// from `seed`.
pub fn query_seed(seed: u64) -> u64 {
    seed ^ (1 << 63)
}

fn city_seed(seed: u64, city: usize) -> u64 {
    // splitmix64 finalizer over the combined value
    let mut z = seed ^ (city as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn normal(p: NormalParams) -> Result<Normal<f32>> {
    Normal::new(p.mean, p.stddev).map_err(|e| Error::InvalidParameter(e.to_string()))
}
