//! Doctor command - check credentials and the Postman CLI

use anyhow::{Context, Result};
use console::style;

use crate::auth::{AuthProvider, ProfileStore};
use crate::config::UserConfig;
use crate::external::{CliChecker, SystemCliChecker};

pub fn run(cli_path: Option<String>) -> Result<()> {
    println!("🩺 API Governance Doctor\n");

    let mut settings = UserConfig::load()?.settings;
    if let Some(path) = cli_path {
        settings.cli_path = path;
    }

    let store = ProfileStore::from_home();
    let auth = store.auth_status();
    let mut healthy = true;

    if auth.is_authenticated {
        match auth.profile {
            Some(profile) => println!("{} Postman API key: profile '{}'", style("✓").green(), profile),
            None => println!("{} Postman API key: from environment", style("✓").green()),
        }
    } else {
        healthy = false;
        println!(
            "{} Postman API key: {}",
            style("✗").red(),
            auth.error.unwrap_or_else(|| "not found".to_string())
        );
        println!("  Run `postman login` or set POSTMAN_API_KEY");
    }

    let checker = SystemCliChecker::default();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let (info, lint_ok) = runtime.block_on(async {
        let info = checker.validate_cli(&settings.cli_path).await;
        let lint_ok = info.available && checker.validate_lint_command(&settings.cli_path).await;
        (info, lint_ok)
    });

    if info.available {
        println!(
            "{} Postman CLI: {} ({})",
            style("✓").green(),
            info.path,
            info.version.as_deref().unwrap_or("unknown version")
        );
    } else {
        healthy = false;
        println!(
            "{} Postman CLI: {} not found ({})",
            style("✗").red(),
            info.path,
            info.error.as_deref().unwrap_or("unknown error")
        );
        println!("  Install it from https://learning.postman.com/docs/postman-cli/postman-cli-installation/");
    }

    if info.available {
        if lint_ok {
            println!("{} `api lint` command: OK", style("✓").green());
        } else {
            healthy = false;
            println!("{} `api lint` command: unavailable in this CLI version", style("✗").red());
        }
    }

    if healthy {
        println!("\n✅ All checks passed!");
    } else {
        println!("\n{}", style("Some checks failed").yellow());
    }
    Ok(())
}
