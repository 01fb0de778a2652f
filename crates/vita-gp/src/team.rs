//! Team: a fixed-size collection of individuals of one representation,
//! itself usable anywhere a single individual is (spec §9's Design Note --
//! "treat it as a generic wrapper, not a fourth representation").

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use vita_core::genome::Individual;
use vita_core::objectives::Fitness;
use vita_core::signature::{Signature, SignatureBuilder};
use vita_error::{VitaError, VitaResult};

/// A fixed-size group of `I`-individuals evaluated and varied as one unit.
/// `Team`'s own age/fitness cells are independent of its members' --
/// members keep their own ages (mutation/crossover touch them
/// individually), while the team as a whole ages and is scored like any
/// other [`Individual`].
#[derive(Clone)]
pub struct Team<I: Individual> {
    members: Arc<Vec<I>>,
    age: Arc<AtomicU32>,
    fitness: Arc<Mutex<Fitness>>,
}

impl<I: Individual> Team<I> {
    pub fn new(members: Vec<I>, num_objectives: usize) -> VitaResult<Self> {
        if members.is_empty() {
            return Err(VitaError::InvalidConfig {
                message: "team needs at least one member".into(),
            });
        }
        Ok(Team {
            members: Arc::new(members),
            age: Arc::new(AtomicU32::new(0)),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives.max(1)))),
        })
    }

    pub fn members(&self) -> &[I] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<I: Individual> Individual for Team<I> {
    /// The combined signature: each member's signature folded in, in
    /// member order, so two teams with the same members in the same slots
    /// hash identically.
    fn signature(&self) -> Signature {
        let mut builder = SignatureBuilder::new();
        for member in self.members.iter() {
            let sig = member.signature();
            builder.push_u64(sig.0);
            builder.push_u64(sig.1);
        }
        builder.finish()
    }

    fn age(&self) -> u32 {
        self.age.load(Ordering::Relaxed)
    }

    fn set_age(&self, age: u32) {
        self.age.store(age, Ordering::Relaxed);
    }

    fn size(&self) -> usize {
        self.members.iter().map(Individual::size).sum()
    }

    fn fitness(&self) -> Fitness {
        self.fitness.lock().unwrap().clone()
    }

    fn set_fitness(&self, fitness: Fitness) {
        *self.fitness.lock().unwrap() = fitness;
    }

    /// Mutates every member independently at `rate` (spec §9).
    fn mutate(&self, rate: f32) -> Self {
        let members = self.members.iter().map(|m| m.mutate(rate)).collect();
        Team {
            members: Arc::new(members),
            age: Arc::new(AtomicU32::new(self.age())),
            fitness: Arc::new(Mutex::new(Fitness::unset(self.fitness().len().max(1)))),
        }
    }

    /// Crosses each pair of same-slot members independently (spec §9).
    /// Teams of mismatched size fall back to returning plain clones, since
    /// there is no well-defined pairing to cross.
    fn crossover(&self, other: &Self, rate: f32) -> (Self, Self) {
        if self.members.len() != other.members.len() {
            return (self.clone(), other.clone());
        }

        let age = self.age().max(other.age());
        let mut left = Vec::with_capacity(self.members.len());
        let mut right = Vec::with_capacity(self.members.len());
        for (a, b) in self.members.iter().zip(other.members.iter()) {
            let (c0, c1) = a.crossover(b, rate);
            left.push(c0);
            right.push(c1);
        }

        let num_objectives = self.fitness().len().max(1);
        (
            Team {
                members: Arc::new(left),
                age: Arc::new(AtomicU32::new(age)),
                fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives))),
            },
            Team {
                members: Arc::new(right),
                age: Arc::new(AtomicU32::new(age)),
                fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives))),
            },
        )
    }
}
