//! Seeded random number generation.
//!
//! Every stochastic draw in the simulation goes through an rng owned by the [`Context`]. Each
//! consumer defines its own rng type with [`define_rng!`]; the generator for that type is seeded
//! lazily from the context's base seed plus a stable hash of the type's name. Two sweeps therefore
//! never share a stream, and adding draws to one of them leaves the other's sequence unchanged.

use std::any::{Any, TypeId};
use std::cell::{RefCell, RefMut};

use log::trace;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::distr::weighted::{Weight, WeightedIndex};
use rand::distr::Distribution;
use rand::{Rng, SeedableRng};

use crate::context::Context;
use crate::define_data_plugin;
use crate::hashing::{hash_str, HashMap};

/// Use this to define a unique type which will be used as a key to retrieve
/// an independent rng instance when sampling through `ContextRandomExt`.
#[macro_export]
macro_rules! define_rng {
    ($random_id:ident) => {
        #[derive(Copy, Clone)]
        struct $random_id;

        impl $crate::random::RngId for $random_id {
            type RngType = $crate::rand::rngs::SmallRng;

            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }
    };
}
pub use define_rng;

pub trait RngId: Copy + Clone + Any {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

// The rng map is stored in a RefCell so a sweep can draw random numbers from a shared
// `&Context` while it holds `&mut Population`.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: 0,
        rng_holders: RefCell::new(HashMap::default()),
    }
);

/// Gets a mutable reference to the random number generator associated with the given
/// [`RngId`]. If the rng has not been used before, one will be created with the base seed
/// set in `init_random`. Panics if `init_random` was not called yet.
fn get_rng<R: RngId>(context: &Context) -> RefMut<'_, R::RngType> {
    let data_container = context
        .get_data_container::<RngPlugin>()
        .expect("You must initialize the random number generator with a base seed");

    let rng_holders = data_container
        .rng_holders
        .try_borrow_mut()
        .expect("Random number generators cannot be borrowed reentrantly");
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                trace!(
                    "creating new RNG {} (base seed={})",
                    R::get_name(),
                    data_container.base_seed
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        data_container.base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            // Holders are keyed by the type id of `R`, so the type always matches
            .unwrap()
    })
}

// This is a trait extension on Context for
// random number generation functionality.
pub trait ContextRandomExt {
    /// Sets the base seed and drops every existing rng, so each is re-seeded on next use.
    fn init_random(&mut self, base_seed: u64);

    /// Applies `sampler` to the rng associated with `R`.
    fn sample<R: RngId, T>(&self, rng_id: R, sampler: impl FnOnce(&mut R::RngType) -> T) -> T;

    /// Draws a sample from `distribution` with the rng associated with `R`.
    fn sample_distr<R: RngId, T>(&self, rng_id: R, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng;

    /// Draws a value uniformly from `range`.
    fn sample_range<R: RngId, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform;

    /// Returns `true` with probability `p`.
    fn sample_bool<R: RngId>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng;

    /// Draws an index into `weights` with probability proportional to its weight.
    /// Panics if the weights are empty, negative or all zero.
    fn sample_weighted<R: RngId, T>(&self, rng_id: R, weights: &[T]) -> usize
    where
        R::RngType: Rng,
        T: Clone
            + Default
            + SampleUniform
            + for<'a> std::ops::AddAssign<&'a T>
            + PartialOrd
            + Weight;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module");
        let data_container = self.get_data_container_mut::<RngPlugin>();
        data_container.base_seed = base_seed;
        data_container.rng_holders.get_mut().clear();
    }

    fn sample<R: RngId, T>(&self, _rng_id: R, sampler: impl FnOnce(&mut R::RngType) -> T) -> T {
        let mut rng = get_rng::<R>(self);
        sampler(&mut rng)
    }

    fn sample_distr<R: RngId, T>(&self, _rng_id: R, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng,
    {
        let mut rng = get_rng::<R>(self);
        distribution.sample::<R::RngType>(&mut rng)
    }

    fn sample_range<R: RngId, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    fn sample_bool<R: RngId>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    fn sample_weighted<R: RngId, T>(&self, _rng_id: R, weights: &[T]) -> usize
    where
        R::RngType: Rng,
        T: Clone
            + Default
            + SampleUniform
            + for<'a> std::ops::AddAssign<&'a T>
            + PartialOrd
            + Weight,
    {
        let index = WeightedIndex::new(weights).expect("Invalid weights for weighted sampling");
        let mut rng = get_rng::<R>(self);
        index.sample(&mut *rng)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::RngCore;

    define_rng!(FooRng);
    define_rng!(BarRng);

    #[test]
    fn get_rng_basic() {
        let mut context = Context::new();
        context.init_random(42);

        assert_ne!(
            context.sample(FooRng, RngCore::next_u64),
            context.sample(FooRng, RngCore::next_u64)
        );
    }

    #[test]
    #[should_panic(expected = "You must initialize the random number generator with a base seed")]
    fn panic_if_not_initialized() {
        let context = Context::new();
        context.sample(FooRng, RngCore::next_u64);
    }

    #[test]
    fn multiple_rng_types() {
        let mut context = Context::new();
        context.init_random(42);

        assert_ne!(
            context.sample(FooRng, RngCore::next_u64),
            context.sample(BarRng, RngCore::next_u64)
        );
    }

    #[test]
    fn reset_seed() {
        let mut context = Context::new();
        context.init_random(42);

        let run_0 = context.sample(FooRng, RngCore::next_u64);
        let run_1 = context.sample(FooRng, RngCore::next_u64);

        // Reset with same seed, ensure we get the same values
        context.init_random(42);
        assert_eq!(run_0, context.sample(FooRng, RngCore::next_u64));
        assert_eq!(run_1, context.sample(FooRng, RngCore::next_u64));

        // Reset with different seed, ensure we get different values
        context.init_random(88);
        assert_ne!(run_0, context.sample(FooRng, RngCore::next_u64));
        assert_ne!(run_1, context.sample(FooRng, RngCore::next_u64));
    }

    #[test]
    fn draws_on_one_rng_do_not_shift_another() {
        let mut context = Context::new();
        context.init_random(7);
        let expected = context.sample(BarRng, RngCore::next_u64);

        context.init_random(7);
        for _ in 0..10 {
            context.sample(FooRng, RngCore::next_u64);
        }
        assert_eq!(expected, context.sample(BarRng, RngCore::next_u64));
    }

    #[test]
    fn sample_range() {
        let mut context = Context::new();
        context.init_random(42);
        let result = context.sample_range(FooRng, 0..10);
        assert!((0..10).contains(&result));
    }

    #[test]
    fn sample_bool_extremes() {
        let mut context = Context::new();
        context.init_random(42);
        assert!(context.sample_bool(FooRng, 1.0));
        assert!(!context.sample_bool(FooRng, 0.0));
    }

    #[test]
    fn sample_weighted() {
        let mut context = Context::new();
        context.init_random(42);
        let r: usize = context.sample_weighted(FooRng, &[0.1, 0.3, 0.4]);
        assert!(r < 3);
        // A zero weight is never chosen
        for _ in 0..100 {
            assert_ne!(context.sample_weighted(FooRng, &[1.0, 0.0, 1.0]), 1);
        }
    }

    #[test]
    fn sample_distribution() {
        let mut context = Context::new();
        context.init_random(42);
        let wi = WeightedIndex::new(vec![1.0, 2.0]).unwrap();

        let n_samples = 3000;
        let mut zero_counter = 0;
        for _ in 0..n_samples {
            if context.sample_distr(FooRng, &wi) == 0 {
                zero_counter += 1;
            }
        }
        assert!((zero_counter - 1000_i32).abs() < 100);
    }
}
