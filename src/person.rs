//! A small record type to index: people located by age and position.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Person {
    pub name: u32,
    pub age: u32,
    pub latitude: f32,
    pub longitude: f32,
}

impl Person {
    pub fn new(name: u32, age: u32, latitude: f32, longitude: f32) -> Self {
        Person { name: name, age: age, latitude: latitude, longitude: longitude }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Person: {}, {} years old ({}, {})]",
               self.name, self.age, self.latitude, self.longitude)
    }
}

/// Euclidean distance over (latitude, longitude, age).
pub fn person_distance(a: &Person, b: &Person) -> f32 {
    let phi = a.latitude - b.latitude;
    let lambda = a.longitude - b.longitude;
    let age = a.age as f32 - b.age as f32;
    (phi * phi + lambda * lambda + age * age).sqrt()
}
