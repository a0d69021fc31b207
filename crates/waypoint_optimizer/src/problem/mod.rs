pub mod driver;
pub mod goal;
pub mod options;
pub mod routing_problem;
pub mod stop;
pub mod time_window;
pub mod vehicle;
