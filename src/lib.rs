pub mod commands;
pub mod config;
pub mod gateway;
pub mod onboarding;
pub mod profile;
pub mod providers;

// Re-export commonly used items
pub use gateway::AiGateway;
pub use profile::manager::ProfileManager;
pub use profile::types::UserProfile;
pub use providers::gemini::gemini::GeminiProvider;
