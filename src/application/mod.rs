pub mod use_cases;

pub use use_cases::assistant::AssistantUseCase;
pub use use_cases::dashboard::{DashboardUseCase, RunInput};
pub use use_cases::test_generation::{GenerationOutcome, TestGenerationUseCase};
