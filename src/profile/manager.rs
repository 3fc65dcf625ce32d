use chrono::Utc;
use log::error;
use uuid::Uuid;

use super::store::ProfileStore;
use super::types::{
    HealthProfile, HistoryItem, HistoryKind, IntoleranceItem, IntoleranceLevel, UserProfile,
};

/// Most recent analyses kept in the profile.
pub const HISTORY_LIMIT: usize = 20;

/// Holds the single process-wide profile. Every transition replaces the
/// profile wholesale and persists it best-effort through the injected store;
/// persistence failures are logged, never surfaced.
pub struct ProfileManager {
    store: Box<dyn ProfileStore>,
    profile: UserProfile,
}

impl ProfileManager {
    pub fn new(store: Box<dyn ProfileStore>) -> Self {
        let profile = store.load();
        Self { store, profile }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_onboarded(&self) -> bool {
        self.profile.is_onboarded
    }

    fn apply(&mut self, profile: UserProfile) {
        if let Err(e) = self.store.save(&profile) {
            error!("Failed to save profile: {}", e);
        }
        self.profile = profile;
    }

    pub fn complete_onboarding(
        &mut self,
        health: HealthProfile,
        intolerances: Vec<IntoleranceItem>,
    ) {
        let profile = UserProfile {
            health,
            intolerances,
            is_onboarded: true,
            ..self.profile.clone()
        };
        self.apply(profile);
    }

    /// Dashboard add: fresh opaque id, appended at the end.
    pub fn add_intolerance(&mut self, food: &str, level: IntoleranceLevel) -> IntoleranceItem {
        let item = IntoleranceItem {
            id: Uuid::new_v4().to_string(),
            food: food.to_string(),
            level,
        };
        let mut profile = self.profile.clone();
        profile.intolerances.push(item.clone());
        self.apply(profile);
        item
    }

    /// Removes the item with the matching id, leaving the order of the rest
    /// unchanged. Returns false when no item matched.
    pub fn remove_intolerance(&mut self, id: &str) -> bool {
        let mut profile = self.profile.clone();
        let before = profile.intolerances.len();
        profile.intolerances.retain(|i| i.id != id);
        if profile.intolerances.len() == before {
            return false;
        }
        self.apply(profile);
        true
    }

    /// Prepends one completed analysis, dropping the oldest past the cap.
    pub fn record_analysis(&mut self, kind: HistoryKind, query: &str, score: f64, summary: &str) {
        let item = HistoryItem {
            id: Uuid::new_v4().to_string(),
            kind,
            query: query.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            safety_score: score,
            summary: summary.to_string(),
        };
        let mut profile = self.profile.clone();
        profile.history.insert(0, item);
        profile.history.truncate(HISTORY_LIMIT);
        self.apply(profile);
    }

    /// Clears storage and returns to the pre-onboarded default state.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear stored profile: {}", e);
        }
        self.profile = UserProfile::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::store::MemoryStore;

    fn manager() -> ProfileManager {
        ProfileManager::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn onboarding_sets_health_and_marks_complete() {
        let mut m = manager();
        assert!(!m.is_onboarded());

        m.complete_onboarding(
            HealthProfile {
                condition: "ibs".to_string(),
                preference: "keto".to_string(),
            },
            vec![],
        );
        assert!(m.is_onboarded());
        assert_eq!(m.profile().health.condition, "ibs");
    }

    #[test]
    fn transitions_persist_through_the_store() {
        let store = MemoryStore::new();
        let mut m = ProfileManager::new(Box::new(store.clone()));
        m.add_intolerance("Soy", IntoleranceLevel::Borderline);

        // A second manager over the same slot sees the saved state.
        let reloaded = ProfileManager::new(Box::new(store));
        assert_eq!(reloaded.profile().intolerances.len(), 1);
        assert_eq!(reloaded.profile().intolerances[0].food, "Soy");
    }

    #[test]
    fn added_items_get_unique_ids() {
        let mut m = manager();
        let a = m.add_intolerance("Dairy", IntoleranceLevel::Elevated);
        let b = m.add_intolerance("Dairy", IntoleranceLevel::Elevated);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn remove_takes_exactly_one_item_and_keeps_order() {
        let mut m = manager();
        m.add_intolerance("Gluten", IntoleranceLevel::Elevated);
        let target = m.add_intolerance("Dairy", IntoleranceLevel::Borderline);
        m.add_intolerance("Eggs", IntoleranceLevel::Normal);

        assert!(m.remove_intolerance(&target.id));
        let foods: Vec<&str> = m
            .profile()
            .intolerances
            .iter()
            .map(|i| i.food.as_str())
            .collect();
        assert_eq!(foods, vec!["Gluten", "Eggs"]);

        assert!(!m.remove_intolerance("no-such-id"));
        assert_eq!(m.profile().intolerances.len(), 2);
    }

    #[test]
    fn history_is_capped_newest_first() {
        let mut m = manager();
        for n in 0..25 {
            m.record_analysis(HistoryKind::Search, &format!("query {n}"), 5.0, "ok");
        }
        let history = &m.profile().history;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].query, "query 24");
        assert_eq!(history[HISTORY_LIMIT - 1].query, "query 5");
    }

    #[test]
    fn reset_returns_to_default_state() {
        let store = MemoryStore::new();
        let mut m = ProfileManager::new(Box::new(store.clone()));
        m.complete_onboarding(HealthProfile::default(), vec![]);
        m.record_analysis(HistoryKind::Scan, "Label Scan", 3.0, "risky");

        m.reset();
        assert!(!m.is_onboarded());
        assert!(m.profile().history.is_empty());
        assert!(!store.load().is_onboarded);
    }
}
