pub fn handle_command(input: &str) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n🛡️ AllergyGuard Commands:");
            println!("  Just type a dish or product to check it");
            println!("  Examples:");
            println!("    - Starbucks Oat Milk Latte");
            println!("    - check instant ramen");
            println!();

            println!("🔎 Analyzer Commands:");
            println!("  check <query>  - Safety analysis with live web search");
            println!("  plan           - 1-day meal plan from your safe foods");
            println!();

            println!("📷 Scanner Commands:");
            println!("  scan <image>   - Scan a product label photo for triggers");
            println!();

            println!("🩺 Profile Commands:");
            println!("  profile               - Show health settings and intolerances");
            println!("  add <food> [level]    - Add an intolerance (normal/borderline/elevated)");
            println!("  remove <id>           - Remove an intolerance by id");
            println!("  history               - Recent analyses, newest first");
            println!("  reset                 - Clear the stored profile");
            println!();

            println!("⚙️ System Commands:");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(())
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
