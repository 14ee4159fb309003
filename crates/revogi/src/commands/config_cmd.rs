//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const REDACTED: &str = "****";

/// Copy of the config that is safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.password.is_some() {
        shown.password = Some(REDACTED.into());
    }
    shown
}

fn to_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            // Existing settings are kept; a broken file is reported, not replaced.
            let mut cfg = config::load(global)?;

            eprintln!("revogi configuration");
            eprintln!("   Config path: {}\n", path.display());

            let username: String = Input::new()
                .with_prompt("Account username (email)")
                .interact_text()
                .map_err(prompt_err)?;

            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

            if username.is_empty() || password.is_empty() {
                return Err(CliError::Validation {
                    field: "credentials".into(),
                    reason: "username and password cannot be empty".into(),
                });
            }

            let store_choices = &[
                "Store password in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the password?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            cfg.username = Some(username.clone());

            if store_selection == 0 {
                revogi_config::store_password(&username, &password)?;
                cfg.password = None;
                eprintln!("   Password stored in system keyring");
            } else {
                cfg.password = Some(password);
            }

            revogi_config::save_config_to(&cfg, &path)?;

            eprintln!("\nConfiguration written to {}", path.display());
            eprintln!("  Test it: revogi login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, to_toml, |c| {
                c.username.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), false);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load(global)?;
            let username = cfg.username()?.to_owned();

            let password =
                rpassword::prompt_password(format!("Password for {username}: ")).map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            revogi_config::store_password(&username, &password)?;
            if !global.quiet {
                eprintln!("Password for {username} stored in system keyring");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_hides_plaintext_password() {
        let cfg = Config {
            username: Some("me@example.com".into()),
            password: Some("hunter2".into()),
            ..Config::default()
        };

        let text = to_toml(&redacted(&cfg));
        assert!(text.contains(REDACTED), "{text}");
        assert!(!text.contains("hunter2"), "{text}");
    }

    #[test]
    fn redaction_leaves_missing_password_absent() {
        assert_eq!(redacted(&Config::default()).password, None);
    }
}
