pub mod manager;
pub mod store;
pub mod types;

pub use manager::ProfileManager;
pub use store::{JsonFileStore, MemoryStore, ProfileStore};
pub use types::{
    AnalysisResult, HealthProfile, HistoryItem, HistoryKind, IntoleranceItem, IntoleranceLevel,
    MealPlan, UserProfile, WebSource,
};
