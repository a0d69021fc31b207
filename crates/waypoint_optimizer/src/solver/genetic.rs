use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::problem::routing_problem::RoutingProblem;

use super::{
    chromosome::Chromosome,
    crossover::order_crossover,
    fitness::{FitnessScore, ObjectiveScale, evaluate_chromosome},
    mutation::mutate,
    params::SolverParams,
    selection::tournament,
};

#[derive(Serialize, Deserialize, JsonSchema, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The full generation budget ran out.
    GenerationBudget,
    /// Best fitness stopped improving.
    Stalled,
    /// The wall-clock budget fired; best-so-far was returned.
    TimeBudget,
    /// The cooperative cancellation flag fired; best-so-far was returned.
    Cancelled,
}

pub struct SolverOutcome {
    pub best: Chromosome,
    pub generations: usize,
    pub stop_reason: StopReason,

    /// Best fitness so far after each completed generation, index 0 being
    /// the initial population. Non-increasing by elitism.
    pub history: Vec<FitnessScore>,
}

impl SolverOutcome {
    pub fn best_fitness(&self) -> FitnessScore {
        self.best.fitness().unwrap_or(FitnessScore::MAX)
    }
}

/// A value-scoped genetic search over stop-to-vehicle assignments. Owns its
/// population and random source for the duration of one run; the only
/// shared pieces are the read-only problem and the cancellation flag.
/// Identical problem plus identical seed gives a bit-identical outcome.
pub struct GeneticSolver {
    problem: Arc<RoutingProblem>,
    params: SolverParams,
    scale: ObjectiveScale,
    cancel: Arc<AtomicBool>,
    rng: SmallRng,
}

impl GeneticSolver {
    pub fn new(
        problem: Arc<RoutingProblem>,
        params: SolverParams,
        seed: u64,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let scale = ObjectiveScale::for_problem(&problem);

        GeneticSolver {
            problem,
            params,
            scale,
            cancel,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn run(mut self) -> SolverOutcome {
        let started = Instant::now();
        let population_size = self.params.population_size.max(2);

        let mut population: Vec<Chromosome> = (0..population_size)
            .map(|_| Chromosome::random(&self.problem, &mut self.rng))
            .collect();
        Self::evaluate_population(&self.problem, &self.scale, &mut population);

        let mut best = Self::population_best(&population).clone();
        let mut history = vec![best.fitness().unwrap_or(FitnessScore::MAX)];
        let mut stall = 0usize;
        let mut generations = 0usize;
        let mut stop_reason = StopReason::GenerationBudget;

        for generation in 1..=self.params.max_generations {
            if self.cancel.load(Ordering::Relaxed) {
                stop_reason = StopReason::Cancelled;
                break;
            }

            if let Some(limit) = self.params.max_duration
                && started.elapsed().as_secs_f64() >= limit.as_secs_f64()
            {
                stop_reason = StopReason::TimeBudget;
                break;
            }

            population = self.next_generation(&population);
            Self::evaluate_population(&self.problem, &self.scale, &mut population);
            generations = generation;

            let generation_best = Self::population_best(&population);
            if generation_best.fitness() < best.fitness() {
                best = generation_best.clone();
                stall = 0;
            } else {
                stall += 1;
            }

            history.push(best.fitness().unwrap_or(FitnessScore::MAX));

            if generation % 10 == 0 {
                let fitness = best.fitness().unwrap_or(FitnessScore::MAX);
                debug!(
                    generation,
                    hard = fitness.hard,
                    soft = fitness.soft,
                    "generation complete"
                );
            }

            if stall >= self.params.stall_generations {
                stop_reason = StopReason::Stalled;
                break;
            }
        }

        let fitness = best.fitness().unwrap_or(FitnessScore::MAX);
        info!(
            generations,
            ?stop_reason,
            hard = fitness.hard,
            soft = fitness.soft,
            "genetic search finished"
        );

        SolverOutcome {
            best,
            generations,
            stop_reason,
            history,
        }
    }

    /// Elites survive unmodified; the rest of the next generation comes
    /// from tournament parents recombined and occasionally mutated.
    fn next_generation(&mut self, population: &[Chromosome]) -> Vec<Chromosome> {
        let mut next = Vec::with_capacity(population.len());

        let mut ranked: Vec<&Chromosome> = population.iter().collect();
        ranked.sort_by_key(|chromosome| chromosome.fitness().unwrap_or(FitnessScore::MAX));
        for elite in ranked.iter().take(self.params.elite_count.min(ranked.len())) {
            next.push((*elite).clone());
        }

        while next.len() < population.len() {
            let parent_a = tournament(population, self.params.tournament_size, &mut self.rng);
            let parent_b = tournament(population, self.params.tournament_size, &mut self.rng);

            let mut child = order_crossover(parent_a, parent_b, &mut self.rng);
            if !child.covers_exactly_once(self.problem.num_stops()) {
                child.repair(&self.problem);
            }

            if self.rng.random_bool(self.params.mutation_rate) {
                mutate(&mut child, &mut self.rng);
            }

            next.push(child);
        }

        next
    }

    /// Fitness is pure in (problem, scale, chromosome), so the pass runs
    /// in parallel and collects in order, keeping runs reproducible.
    fn evaluate_population(
        problem: &RoutingProblem,
        scale: &ObjectiveScale,
        population: &mut [Chromosome],
    ) {
        let scores: Vec<FitnessScore> = population
            .par_iter()
            .map(|chromosome| match chromosome.fitness() {
                Some(fitness) => fitness,
                None => evaluate_chromosome(problem, scale, chromosome),
            })
            .collect();

        for (chromosome, fitness) in population.iter_mut().zip(scores) {
            chromosome.set_fitness(fitness);
        }
    }

    fn population_best(population: &[Chromosome]) -> &Chromosome {
        population
            .iter()
            .min_by_key(|chromosome| chromosome.fitness().unwrap_or(FitnessScore::MAX))
            .expect("population is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{ProblemFixture, minutes};

    fn solve(problem: Arc<RoutingProblem>, params: SolverParams, seed: u64) -> SolverOutcome {
        let cancel = Arc::new(AtomicBool::new(false));
        GeneticSolver::new(problem, params, seed, cancel).run()
    }

    fn small_params() -> SolverParams {
        SolverParams {
            population_size: 30,
            max_generations: 40,
            stall_generations: 40,
            ..SolverParams::default()
        }
    }

    #[test]
    fn test_best_fitness_never_regresses() {
        let problem = ProblemFixture::line(8, minutes(10)).vehicles(2).build_arc();
        let outcome = solve(problem, small_params(), 99);

        for window in outcome.history.windows(2) {
            assert!(window[1] <= window[0]);
        }
    }

    #[test]
    fn test_outcome_covers_every_stop() {
        let problem = ProblemFixture::line(10, minutes(10)).vehicles(3).build_arc();
        let outcome = solve(Arc::clone(&problem), small_params(), 4);

        assert!(outcome.best.covers_exactly_once(problem.num_stops()));
    }

    #[test]
    fn test_identical_seed_identical_outcome() {
        let problem = ProblemFixture::line(9, minutes(10)).vehicles(2).build_arc();

        let first = solve(Arc::clone(&problem), small_params(), 1234);
        let second = solve(Arc::clone(&problem), small_params(), 1234);

        assert_eq!(first.best_fitness(), second.best_fitness());
        assert_eq!(first.generations, second.generations);
        for (a, b) in first.best.routes().iter().zip(second.best.routes()) {
            assert_eq!(a.as_slice(), b.as_slice());
        }
    }

    #[test]
    fn test_pre_set_cancel_flag_stops_after_initial_population() {
        let problem = ProblemFixture::line(6, minutes(10)).build_arc();
        let cancel = Arc::new(AtomicBool::new(true));

        let outcome =
            GeneticSolver::new(problem, small_params(), 7, Arc::clone(&cancel)).run();

        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.generations, 0);
        assert!(outcome.best.covers_exactly_once(6));
    }
}
