use std::time::Duration;

use indicatif::ProgressBar;

use crate::gateway::AiGateway;
use crate::profile::manager::ProfileManager;

pub mod analyze;
pub mod profile_cmd;
pub mod scan;
pub mod system;

use analyze::AnalyzerPanel;
use scan::ScannerPanel;

pub struct CommandHandler {
    profiles: ProfileManager,
    gateway: AiGateway,
    analyzer: AnalyzerPanel,
    scanner: ScannerPanel,
}

impl CommandHandler {
    pub fn new(profiles: ProfileManager, gateway: AiGateway) -> Self {
        Self {
            profiles,
            gateway,
            analyzer: AnalyzerPanel::new(),
            scanner: ScannerPanel::new(),
        }
    }

    pub fn profiles(&self) -> &ProfileManager {
        &self.profiles
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        if input.is_empty() {
            return Ok(());
        }

        let input = input.trim();

        // Handle single-word commands first
        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "profile" => return profile_cmd::show(&self.profiles),
            "history" => return profile_cmd::history(&self.profiles),
            "plan" => {
                return self
                    .analyzer
                    .plan(&self.gateway, &self.profiles)
                    .await
            }
            "reset" => return profile_cmd::reset(&mut self.profiles),
            _ => {}
        }

        // Handle command prefixes
        if let Some(query) = input.strip_prefix("check ") {
            return self
                .analyzer
                .check(query.trim(), &self.gateway, &mut self.profiles)
                .await;
        }

        if let Some(path) = input.strip_prefix("scan ") {
            return self
                .scanner
                .scan(path.trim(), &self.gateway, &mut self.profiles)
                .await;
        }

        if let Some(rest) = input.strip_prefix("add ") {
            return profile_cmd::add(rest.trim(), &mut self.profiles);
        }

        if let Some(id) = input.strip_prefix("remove ") {
            return profile_cmd::remove(id.trim(), &mut self.profiles);
        }

        // Default to a safety check if no command matches: the query box is
        // the dashboard's primary input.
        self.analyzer
            .check(input, &self.gateway, &mut self.profiles)
            .await
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
