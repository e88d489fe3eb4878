//! Weighted random selection.
//!
//! The draw is a single uniform value in `[0, total)`. Candidates are scanned
//! in table order, subtracting each weight; the first candidate that brings
//! the remainder to zero or below wins. Floating point drift that leaves the
//! remainder positive after the scan falls back to the last candidate.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Anything that carries a non-negative selection weight.
pub trait Weighted {
    /// Relative weight of this candidate.
    fn weight(&self) -> f64;
}

impl Weighted for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

/// Sum of all candidate weights.
pub fn total_weight<T: Weighted>(candidates: &[T]) -> f64 {
    candidates.iter().map(Weighted::weight).sum()
}

/// Resolve a draw value against the candidates.
///
/// Returns `None` only for an empty candidate list.
///
/// # Examples
/// ```
/// use spinwheel::domain::pick_by_draw;
///
/// let weights = [25.0, 30.0, 45.0];
/// assert_eq!(pick_by_draw(&weights, 10.0), Some(0));
/// assert_eq!(pick_by_draw(&weights, 25.0), Some(0));
/// assert_eq!(pick_by_draw(&weights, 25.5), Some(1));
/// assert_eq!(pick_by_draw(&weights, 1_000.0), Some(2));
/// ```
pub fn pick_by_draw<T: Weighted>(candidates: &[T], draw: f64) -> Option<usize> {
    let last = candidates.len().checked_sub(1)?;
    let mut remainder = draw;
    for (index, candidate) in candidates.iter().enumerate() {
        remainder -= candidate.weight();
        if remainder <= 0.0 {
            return Some(index);
        }
    }
    Some(last)
}

/// Uniform draw in `[0, total)`, or zero when there is nothing to draw over.
pub fn uniform_draw<R: Rng + ?Sized>(rng: &mut R, total: f64) -> f64 {
    if total.is_finite() && total > 0.0 {
        rng.gen_range(0.0..total)
    } else {
        0.0
    }
}

/// Pick a candidate index using the supplied random source.
pub fn select_weighted<T: Weighted, R: Rng + ?Sized>(candidates: &[T], rng: &mut R) -> Option<usize> {
    let draw = uniform_draw(rng, total_weight(candidates));
    pick_by_draw(candidates, draw)
}

/// Source of draw values for services that cannot hold an `Rng` directly.
#[cfg_attr(test, mockall::automock)]
pub trait DrawSource: Send + Sync {
    /// Produce a value in `[0, total)`.
    fn draw(&self, total: f64) -> f64;
}

/// Draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl DrawSource for ThreadRngDraw {
    fn draw(&self, total: f64) -> f64 {
        uniform_draw(&mut rand::thread_rng(), total)
    }
}

/// Reproducible draws from a seeded generator.
#[derive(Debug)]
pub struct SeededDraw {
    rng: Mutex<SmallRng>,
}

impl SeededDraw {
    /// Build a draw source from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl DrawSource for SeededDraw {
    fn draw(&self, total: f64) -> f64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        uniform_draw(&mut *rng, total)
    }
}
