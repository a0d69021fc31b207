use fixedbitset::FixedBitSet;
use rand::Rng;

use crate::problem::stop::StopIdx;

use super::chromosome::Chromosome;

/// Order crossover over the giant-tour view. A window of parent A's tour is
/// copied verbatim; the remaining positions are filled in parent B's visit
/// order, skipping stops already placed. The child inherits parent A's
/// vehicle boundaries, so the exactly-once invariant holds by construction.
pub fn order_crossover<R: Rng>(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    rng: &mut R,
) -> Chromosome {
    let (tour_a, lengths) = parent_a.flatten();
    let (tour_b, _) = parent_b.flatten();

    let len = tour_a.len();
    if len < 2 {
        return Chromosome::from_giant_tour(&tour_a, &lengths);
    }

    let mut start = rng.random_range(0..len);
    let mut end = rng.random_range(0..len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let mut child: Vec<Option<StopIdx>> = vec![None; len];
    let mut placed = FixedBitSet::with_capacity(len);

    for position in start..=end {
        let stop = tour_a[position];
        child[position] = Some(stop);
        placed.put(stop.get());
    }

    let mut fill = tour_b.iter().filter(|stop| !placed.contains(stop.get()));
    for slot in child.iter_mut() {
        if slot.is_none() {
            *slot = fill.next().copied();
        }
    }

    let tour: Vec<StopIdx> = child
        .into_iter()
        .map(|slot| slot.expect("both parents cover the same stop set"))
        .collect();

    Chromosome::from_giant_tour(&tour, &lengths)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use crate::{
        solver::chromosome::Chromosome,
        test_utils::{ProblemFixture, minutes},
    };

    use super::*;

    #[test]
    fn test_offspring_cover_exactly_once() {
        let problem = ProblemFixture::line(10, minutes(10)).vehicles(3).build();
        let mut rng = SmallRng::seed_from_u64(11);

        let parent_a = Chromosome::random(&problem, &mut rng);
        let parent_b = Chromosome::random(&problem, &mut rng);

        for _ in 0..100 {
            let child = order_crossover(&parent_a, &parent_b, &mut rng);
            assert!(child.covers_exactly_once(problem.num_stops()));
        }
    }

    #[test]
    fn test_child_inherits_first_parent_boundaries() {
        let problem = ProblemFixture::line(8, minutes(10)).vehicles(2).build();
        let mut rng = SmallRng::seed_from_u64(3);

        let parent_a = Chromosome::random(&problem, &mut rng);
        let parent_b = Chromosome::random(&problem, &mut rng);
        let child = order_crossover(&parent_a, &parent_b, &mut rng);

        let lengths_a: Vec<usize> = parent_a.routes().iter().map(|route| route.len()).collect();
        let lengths_child: Vec<usize> = child.routes().iter().map(|route| route.len()).collect();
        assert_eq!(lengths_a, lengths_child);
    }

    #[test]
    fn test_single_stop_is_passed_through() {
        let problem = ProblemFixture::line(1, minutes(10)).build();
        let mut rng = SmallRng::seed_from_u64(5);

        let parent_a = Chromosome::random(&problem, &mut rng);
        let parent_b = Chromosome::random(&problem, &mut rng);
        let child = order_crossover(&parent_a, &parent_b, &mut rng);

        assert!(child.covers_exactly_once(1));
    }
}
