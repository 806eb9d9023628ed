//! Saved-session management and configuration commands.

use anyhow::{Context, Result};
use dialoguer::{Confirm, theme::ColorfulTheme};

use promptsmith::api::{PersistenceService, ServiceClient};
use promptsmith::config::{CONFIG_FILE, Config};
use promptsmith::ui;

/// `promptsmith list` — show every saved session on the service.
pub async fn cmd_list(config: &Config) -> Result<()> {
    let client = ServiceClient::new(&config.service.url, config.timeout())?;
    let bar = ui::spinner("Fetching saved sessions...");
    let saves = client.list_saves().await;
    bar.finish_and_clear();
    ui::print_saves(&saves?);
    Ok(())
}

/// `promptsmith delete <id>` — remove a saved session, with confirmation
/// unless `--force` or `--yes` was given.
pub async fn cmd_delete(config: &Config, id: &str, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete saved session '{}'?", id))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let client = ServiceClient::new(&config.service.url, config.timeout())?;
    let bar = ui::spinner("Deleting saved session...");
    let message = client.delete_save(id).await;
    bar.finish_and_clear();
    println!("{}", message?);
    Ok(())
}

/// `promptsmith config show` — print the effective configuration after the
/// file and environment overrides have been applied.
pub fn cmd_config_show(config: &Config) -> Result<()> {
    println!("service.url          = {}", config.service.url);
    println!("service.timeout_secs = {}", config.service.timeout_secs);
    println!("interview.questions  = {}", config.interview.questions);
    Ok(())
}

/// `promptsmith config init` — write a commented default config file into
/// the current directory.
pub fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let path = Config::init_file(&cwd)?;
    println!("Wrote {}", path.display());
    println!("Edit {} to change the service URL or defaults.", CONFIG_FILE);
    Ok(())
}
