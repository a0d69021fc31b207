use rand::{Rng, seq::IteratorRandom};

use super::{chromosome::Chromosome, fitness::FitnessScore};

/// Tournament selection: draw `size` individuals uniformly at random and
/// keep the lowest-fitness one.
pub fn tournament<'a, R: Rng>(
    population: &'a [Chromosome],
    size: usize,
    rng: &mut R,
) -> &'a Chromosome {
    if population.len() <= 1 {
        return &population[0];
    }

    population
        .iter()
        .choose_multiple(rng, size.clamp(1, population.len()))
        .into_iter()
        .min_by_key(|chromosome| chromosome.fitness().unwrap_or(FitnessScore::MAX))
        .unwrap_or(&population[0])
}
