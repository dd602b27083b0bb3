pub mod activity;
pub mod assistant;
pub mod error;
pub mod llm_config;
pub mod project;
pub mod test_case;
pub mod test_run;
