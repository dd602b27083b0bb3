pub mod assistant;
pub mod dashboard;
pub mod test_generation;
