use fixedbitset::FixedBitSet;
use rand::{Rng, seq::SliceRandom};
use smallvec::SmallVec;

use crate::problem::{routing_problem::RoutingProblem, stop::StopIdx};

use super::fitness::FitnessScore;

pub type RouteSeq = SmallVec<[StopIdx; 8]>;

/// One candidate solution: the full stop set partitioned into one ordered
/// sub-sequence per vehicle. Invariant: every stop index appears exactly
/// once across all sub-sequences. Empty sub-sequences are allowed, an
/// unused vehicle is a valid outcome.
#[derive(Debug, Clone)]
pub struct Chromosome {
    routes: Vec<RouteSeq>,
    fitness: Option<FitnessScore>,
}

impl Chromosome {
    /// Random partition and ordering: shuffle all stops, deal each to a
    /// uniformly chosen vehicle. Satisfies the exactly-once invariant by
    /// construction.
    pub fn random<R: Rng>(problem: &RoutingProblem, rng: &mut R) -> Self {
        let mut stops: Vec<StopIdx> = (0..problem.num_stops()).map(StopIdx::new).collect();
        stops.shuffle(rng);

        let mut routes = vec![RouteSeq::new(); problem.num_vehicles()];
        for stop in stops {
            let vehicle = rng.random_range(0..routes.len());
            routes[vehicle].push(stop);
        }

        Chromosome {
            routes,
            fitness: None,
        }
    }

    pub fn from_routes(routes: Vec<Vec<StopIdx>>) -> Self {
        Chromosome {
            routes: routes.into_iter().map(SmallVec::from_vec).collect(),
            fitness: None,
        }
    }

    pub fn routes(&self) -> &[RouteSeq] {
        &self.routes
    }

    pub(crate) fn routes_mut(&mut self) -> &mut Vec<RouteSeq> {
        &mut self.routes
    }

    pub fn fitness(&self) -> Option<FitnessScore> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: FitnessScore) {
        self.fitness = Some(fitness);
    }

    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    pub fn num_assigned(&self) -> usize {
        self.routes.iter().map(SmallVec::len).sum()
    }

    /// Checks the structural invariant: each of `num_stops` stops appears
    /// exactly once across all sub-sequences.
    pub fn covers_exactly_once(&self, num_stops: usize) -> bool {
        if self.num_assigned() != num_stops {
            return false;
        }

        let mut seen = FixedBitSet::with_capacity(num_stops);
        for route in &self.routes {
            for stop in route {
                if stop.get() >= num_stops || seen.put(stop.get()) {
                    return false;
                }
            }
        }

        seen.count_ones(..) == num_stops
    }

    /// Restores the exactly-once invariant: duplicates beyond the first
    /// occurrence are dropped, missing stops are reinserted at their
    /// lowest-marginal-distance position.
    pub fn repair(&mut self, problem: &RoutingProblem) {
        let num_stops = problem.num_stops();
        let mut seen = FixedBitSet::with_capacity(num_stops);

        for route in &mut self.routes {
            route.retain(|stop| !seen.put(stop.get()));
        }

        for missing in 0..num_stops {
            if !seen.contains(missing) {
                self.insert_cheapest(problem, StopIdx::new(missing));
            }
        }

        self.fitness = None;
    }

    fn insert_cheapest(&mut self, problem: &RoutingProblem, stop: StopIdx) {
        let mut best: Option<(usize, usize, f64)> = None;

        for (route_index, route) in self.routes.iter().enumerate() {
            for position in 0..=route.len() {
                let before = position.checked_sub(1).map(|p| route[p]);
                let after = route.get(position).copied();

                let delta = match (before, after) {
                    (Some(prev), Some(next)) => {
                        problem.distance_meters(prev, stop) + problem.distance_meters(stop, next)
                            - problem.distance_meters(prev, next)
                    }
                    (Some(prev), None) => problem.distance_meters(prev, stop),
                    (None, Some(next)) => problem.distance_meters(stop, next),
                    (None, None) => 0.0,
                };

                if best.is_none_or(|(_, _, best_delta)| delta < best_delta) {
                    best = Some((route_index, position, delta));
                }
            }
        }

        if let Some((route_index, position, _)) = best {
            self.routes[route_index].insert(position, stop);
        }
    }

    /// Giant-tour view: the concatenated stop sequence plus the per-vehicle
    /// sub-sequence lengths. `from_giant_tour` is the inverse.
    pub fn flatten(&self) -> (Vec<StopIdx>, Vec<usize>) {
        let mut tour = Vec::with_capacity(self.num_assigned());
        let mut lengths = Vec::with_capacity(self.routes.len());

        for route in &self.routes {
            tour.extend_from_slice(route);
            lengths.push(route.len());
        }

        (tour, lengths)
    }

    pub fn from_giant_tour(tour: &[StopIdx], lengths: &[usize]) -> Self {
        debug_assert_eq!(tour.len(), lengths.iter().sum::<usize>());

        let mut routes = Vec::with_capacity(lengths.len());
        let mut offset = 0;

        for &length in lengths {
            routes.push(RouteSeq::from_slice(&tour[offset..offset + length]));
            offset += length;
        }

        Chromosome {
            routes,
            fitness: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use crate::test_utils::{ProblemFixture, minutes};

    use super::*;

    #[test]
    fn test_random_covers_exactly_once() {
        let problem = ProblemFixture::line(12, minutes(10)).vehicles(3).build();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..50 {
            let chromosome = Chromosome::random(&problem, &mut rng);
            assert_eq!(chromosome.routes().len(), 3);
            assert!(chromosome.covers_exactly_once(problem.num_stops()));
        }
    }

    #[test]
    fn test_flatten_round_trip() {
        let chromosome = Chromosome::from_routes(vec![
            vec![StopIdx::new(2), StopIdx::new(0)],
            vec![],
            vec![StopIdx::new(1)],
        ]);

        let (tour, lengths) = chromosome.flatten();
        assert_eq!(lengths, vec![2, 0, 1]);

        let rebuilt = Chromosome::from_giant_tour(&tour, &lengths);
        assert_eq!(rebuilt.routes()[0].as_slice(), chromosome.routes()[0].as_slice());
        assert!(rebuilt.routes()[1].is_empty());
        assert_eq!(rebuilt.routes()[2].as_slice(), chromosome.routes()[2].as_slice());
    }

    #[test]
    fn test_repair_removes_duplicates_and_reinserts_missing() {
        let problem = ProblemFixture::line(4, minutes(10)).vehicles(2).build();

        // Stop 1 duplicated, stop 3 missing.
        let mut broken = Chromosome::from_routes(vec![
            vec![StopIdx::new(0), StopIdx::new(1)],
            vec![StopIdx::new(1), StopIdx::new(2)],
        ]);
        assert!(!broken.covers_exactly_once(problem.num_stops()));

        broken.repair(&problem);
        assert!(broken.covers_exactly_once(problem.num_stops()));
    }

    #[test]
    fn test_repair_reinserts_at_cheapest_position() {
        // Stops sit on a line, so the cheapest place for stop 1 is between
        // stop 0 and stop 2.
        let problem = ProblemFixture::line(3, minutes(10)).build();

        let mut broken = Chromosome::from_routes(vec![vec![StopIdx::new(0), StopIdx::new(2)]]);
        broken.repair(&problem);

        assert_eq!(
            broken.routes()[0].as_slice(),
            &[StopIdx::new(0), StopIdx::new(1), StopIdx::new(2)]
        );
    }
}
