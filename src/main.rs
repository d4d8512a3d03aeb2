mod core;
mod interfaces;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::agent::HttpAgentInvoker;
use crate::core::config::ConsoleConfig;
use crate::core::console::Console;
use crate::core::scheduler::HttpSchedulerApi;
use crate::core::terminal;
use crate::interfaces::tui::ConsoleTui;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        terminal::print_error(&format!("{}", e));
        std::process::exit(1);
    } else {
        terminal::print_goodbye();
    }
}

async fn run() -> Result<()> {
    let config_path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let config = ConsoleConfig::load(config_path.as_deref())?;
    logging::init(Path::new(&config.log_file))?;

    terminal::print_info(&format!(
        "Connecting to approval agent {} via {}",
        config.agent_id, config.agent_base_url
    ));

    let invoker = Arc::new(HttpAgentInvoker::new(config.agent_url()?));
    let scheduler = Arc::new(HttpSchedulerApi::new(config.scheduler_url()?));
    let console = Console::new(config, invoker, scheduler);

    ConsoleTui::new(console).run().await
}
