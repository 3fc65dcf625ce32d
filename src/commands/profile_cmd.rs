use chrono::{Local, TimeZone};
use colored::Colorize;

use crate::profile::manager::ProfileManager;
use crate::profile::types::{HistoryKind, IntoleranceLevel};

fn level_tag(level: IntoleranceLevel) -> colored::ColoredString {
    match level {
        IntoleranceLevel::Normal => "normal".green(),
        IntoleranceLevel::Borderline => "borderline".yellow(),
        IntoleranceLevel::Elevated => "elevated".red(),
    }
}

pub fn show(profiles: &ProfileManager) -> Result<(), String> {
    let profile = profiles.profile();

    println!("\n🩺 Health Profile:");
    println!("  Condition:  {}", profile.health.condition.cyan());
    println!("  Preference: {}", profile.health.preference.cyan());

    if profile.intolerances.is_empty() {
        println!("\n🍽️  No intolerances recorded.");
    } else {
        println!("\n🍽️  Intolerances:");
        for item in &profile.intolerances {
            println!(
                "  • {} ({})  id: {}",
                item.food.bold(),
                level_tag(item.level),
                item.id.dimmed()
            );
        }
    }
    println!();
    Ok(())
}

/// `add <food> [normal|borderline|elevated]`. Quick adds default to
/// elevated, same as the onboarding quick-select.
pub fn add(input: &str, profiles: &mut ProfileManager) -> Result<(), String> {
    if input.is_empty() {
        return Err("Usage: add <food> [normal|borderline|elevated]".to_string());
    }

    let (food, level) = match input.rsplit_once(' ') {
        Some((food, last)) => match IntoleranceLevel::parse(last) {
            Some(level) => (food.trim(), level),
            None => (input, IntoleranceLevel::Elevated),
        },
        None => (input, IntoleranceLevel::Elevated),
    };

    if food.is_empty() {
        return Err("Usage: add <food> [normal|borderline|elevated]".to_string());
    }

    let item = profiles.add_intolerance(food, level);
    println!("➕ Added {} ({})", item.food.bold(), level_tag(item.level));
    Ok(())
}

pub fn remove(id: &str, profiles: &mut ProfileManager) -> Result<(), String> {
    if id.is_empty() {
        return Err("Usage: remove <id>".to_string());
    }
    if profiles.remove_intolerance(id) {
        println!("➖ Removed intolerance {}", id.dimmed());
        Ok(())
    } else {
        Err(format!("No intolerance with id {id}. Use 'profile' to list ids."))
    }
}

pub fn history(profiles: &ProfileManager) -> Result<(), String> {
    let history = &profiles.profile().history;
    if history.is_empty() {
        println!("\n🕘 No analyses yet.");
        return Ok(());
    }

    println!("\n🕘 Recent analyses (newest first):");
    for item in history {
        let icon = match item.kind {
            HistoryKind::Scan => "📷",
            HistoryKind::Search => "🔎",
        };
        let when = Local
            .timestamp_millis_opt(item.timestamp)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "  {} {}  score {}  {}",
            icon,
            item.query.bold(),
            item.safety_score,
            when.dimmed()
        );
    }
    println!();
    Ok(())
}

pub fn reset(profiles: &mut ProfileManager) -> Result<(), String> {
    profiles.reset();
    println!("🔄 Profile cleared. Restart to run onboarding again.");
    Ok(())
}
