use allergy_guard::commands::CommandHandler;
use allergy_guard::config::{GeminiConfig, StorageConfig};
use allergy_guard::gateway::AiGateway;
use allergy_guard::onboarding::{
    report_mime_type, OnboardingFlow, Step, COMMON_ALLERGENS, CONDITIONS, PREFERENCES,
};
use allergy_guard::profile::store::JsonFileStore;
use allergy_guard::profile::types::{HealthProfile, IntoleranceItem};
use allergy_guard::profile::ProfileManager;
use allergy_guard::providers::gemini::gemini::GeminiProvider;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::fs;
use std::path::Path;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gemini API key; falls back to GEMINI_API_KEY.
    #[arg(short, long)]
    api_key: Option<String>,

    /// Path of the stored profile JSON.
    #[arg(long)]
    profile: Option<String>,
}

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Initialize colored output
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let config = match &args.api_key {
        Some(key) => GeminiConfig::with_api_key(key.clone()),
        None => GeminiConfig::from_env()?,
    };

    let storage = match &args.profile {
        Some(path) => StorageConfig {
            profile_path: path.clone(),
        },
        None => StorageConfig::from_env(),
    };

    let gateway = AiGateway::new(Box::new(GeminiProvider::new(config)));
    let mut profiles = ProfileManager::new(Box::new(JsonFileStore::new(&storage.profile_path)));

    // Initialize rustyline editor
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    if !profiles.is_onboarded() {
        let (health, intolerances) = run_onboarding(&mut rl, &gateway).await?;
        profiles.complete_onboarding(health, intolerances);
        println!("\n{}", "✅ Profile ready. Welcome to AllergyGuard!".green().bold());
    }

    let mut command_handler = CommandHandler::new(profiles, gateway);

    // Show initial help menu
    command_handler.handle_command("help").await.ok();

    // Main input loop
    loop {
        match rl.readline("🛡️  ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

/// Drives the 3-step wizard over the readline editor until the user
/// confirms their profile.
async fn run_onboarding(
    rl: &mut Editor<(), DefaultHistory>,
    gateway: &AiGateway,
) -> AppResult<(HealthProfile, Vec<IntoleranceItem>)> {
    println!(
        "\n{}",
        "🛡️ Welcome to AllergyGuard — let's calibrate your profile.".bold()
    );

    let mut flow = OnboardingFlow::new();
    loop {
        match flow.step() {
            Step::Health => {
                let condition = pick_option(rl, "Medical condition", &CONDITIONS)?;
                flow.set_condition(&condition);
                let preference = pick_option(rl, "Dietary preference", &PREFERENCES)?;
                flow.set_preference(&preference);
                let _ = flow.advance();
            }
            Step::Triggers => run_triggers_step(rl, gateway, &mut flow).await?,
            Step::Review => {
                println!("\n📋 {}", "Review your profile".bold());
                println!(
                    "  Condition: {}  Preference: {}",
                    flow.health().condition.cyan(),
                    flow.health().preference.cyan()
                );
                println!("  Triggers:");
                for item in flow.parsed_foods() {
                    println!("    • {} ({})", item.food, item.level.as_str());
                }
                for label in flow.manual_selections() {
                    println!("    • {} (elevated)", label);
                }

                let line = prompt(rl, "Type 'finish' to save, or 'back' to adjust: ")?;
                match line.trim().to_lowercase().as_str() {
                    "finish" | "" => return Ok(flow.finish()),
                    "back" => flow.back(),
                    _ => println!("{}", "Type 'finish' or 'back'.".yellow()),
                }
            }
        }
    }
}

async fn run_triggers_step(
    rl: &mut Editor<(), DefaultHistory>,
    gateway: &AiGateway,
    flow: &mut OnboardingFlow,
) -> AppResult<()> {
    println!("\n🍽️  {}", "What do you avoid?".bold());
    println!("Select common triggers, or upload a medical report for AI extraction.\n");
    for (i, allergen) in COMMON_ALLERGENS.iter().enumerate() {
        let mark = if flow.manual_selections().iter().any(|s| s == allergen) {
            "✓".green().to_string()
        } else {
            " ".to_string()
        };
        println!("  [{}] {}. {}", mark, i + 1, allergen);
    }
    if !flow.parsed_foods().is_empty() {
        println!(
            "\n  📄 {} foods already extracted from your report.",
            flow.parsed_foods().len()
        );
    }

    let line = prompt(
        rl,
        "Toggle a number, 'upload <file>', 'done', or 'back': ",
    )?;
    let input = line.trim();

    if let Ok(n) = input.parse::<usize>() {
        if (1..=COMMON_ALLERGENS.len()).contains(&n) {
            flow.toggle_trigger(COMMON_ALLERGENS[n - 1]);
        } else {
            println!("{}", "No such trigger number.".yellow());
        }
        return Ok(());
    }

    match input.to_lowercase().as_str() {
        "done" => {
            if let Err(e) = flow.advance() {
                println!("{}", e.yellow());
            }
        }
        "back" => flow.back(),
        _ => {
            if let Some(path) = input.strip_prefix("upload ") {
                let path = Path::new(path.trim());
                match fs::read(path) {
                    Ok(data) => {
                        println!("📄 Analyzing report...");
                        flow.upload_report(gateway, data, report_mime_type(path)).await;
                        if let Some(e) = flow.take_error() {
                            println!("{}", e.red());
                        }
                    }
                    Err(e) => println!("{}", format!("Could not read file: {e}").red()),
                }
            } else if !input.is_empty() {
                // Anything else is a custom trigger name.
                flow.toggle_trigger(input);
            }
        }
    }
    Ok(())
}

fn pick_option(
    rl: &mut Editor<(), DefaultHistory>,
    label: &str,
    options: &[&str],
) -> AppResult<String> {
    println!("\n{label}:");
    for (i, option) in options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
    let line = prompt(rl, "Pick a number or type your own (Enter for default): ")?;
    let input = line.trim();

    if input.is_empty() {
        return Ok(options[0].to_string());
    }
    if let Ok(n) = input.parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Ok(options[n - 1].to_string());
        }
    }
    Ok(input.to_string())
}

fn prompt(rl: &mut Editor<(), DefaultHistory>, text: &str) -> AppResult<String> {
    match rl.readline(text) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        Err(e) => Err(Box::new(e)),
    }
}
