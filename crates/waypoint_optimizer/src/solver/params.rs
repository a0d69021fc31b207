use jiff::SignedDuration;

#[derive(Clone, Debug)]
pub struct SolverParams {
    pub population_size: usize,
    pub max_generations: usize,
    pub tournament_size: usize,
    pub elite_count: usize,

    /// Per-offspring probability of applying one mutation move.
    pub mutation_rate: f64,

    /// Stop early after this many generations without improvement.
    pub stall_generations: usize,

    /// Wall-clock budget for one solve. Hitting it returns best-so-far.
    pub max_duration: Option<SignedDuration>,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            population_size: 120,
            max_generations: 100,
            tournament_size: 4,
            elite_count: 3,
            mutation_rate: 0.15,
            stall_generations: 15,
            max_duration: Some(SignedDuration::from_secs(30)),
        }
    }
}
