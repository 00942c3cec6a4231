//! Terminal prompts.
//!
//! Uses dialoguer for terminal UI prompts.

use std::io::{BufRead, IsTerminal};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Password, theme::ColorfulTheme};

use deploy_core::config::{ConfigStore, ENV_TOKEN};

/// Ask for a yes/no answer, defaulting to no.
///
/// Runs inside the deploy run; blocks in place on the runtime worker.
pub fn confirm(prompt: &str) -> Result<bool> {
    tokio::task::block_in_place(|| {
        if !io_is_interactive() {
            println!("{} (y/N)", prompt);
            return read_answer(std::io::stdin().lock());
        }

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    })
}

/// Piped input: accept a plain "y" line
fn read_answer<R: BufRead>(mut input: R) -> Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Ask for a GitHub token and remember it in deploy.toml.
pub fn github_token(store: &ConfigStore) -> Result<String> {
    if !io_is_interactive() {
        anyhow::bail!(
            "No GitHub token configured. Set {} or add `token` under [github] in {}",
            ENV_TOKEN,
            store.config_path().display()
        );
    }

    eprintln!(
        "{}",
        style("A GitHub token with the repo_deployment scope is required.").bold()
    );
    let token = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("GitHub token")
        .interact()?;

    store.save_token(&token)?;
    eprintln!(
        "{} Saved token to {}",
        style("✓").green(),
        store.config_path().display()
    );

    Ok(token)
}

fn io_is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}
