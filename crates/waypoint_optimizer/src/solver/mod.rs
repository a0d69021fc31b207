pub mod chromosome;
pub mod crossover;
pub mod fitness;
pub mod genetic;
pub mod mutation;
pub mod params;
pub mod selection;
