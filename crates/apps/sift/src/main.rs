//! Sift - apply rule files to a Gmail inbox
//!
//! `sift fetch` snapshots the newest inbox messages into SQLite, `sift apply`
//! runs the rule engine over that snapshot, and `sift run` does both.
//! `sift check` validates a rule file without touching Gmail.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use sift::{
    ActionHandler, EmailStore, FailurePolicy, GmailAuth, GmailClient, GmailCredentials,
    MailService, RecordingMailService, Rule, RuleEngine, RunSummary, Settings, SqliteEmailStore,
    load_rules_file, sync_inbox,
};

/// Rule-based classification for a Gmail inbox.
#[derive(Parser, Debug)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Rule file to apply.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// SQLite database holding the inbox snapshot.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Number of inbox messages to fetch.
    #[arg(long, global = true)]
    max_results: Option<usize>,

    /// Stop at the first failed Gmail call.
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Evaluate rules on all cores before dispatching.
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace the local snapshot with the newest inbox messages.
    Fetch,
    /// Apply the rule file to the local snapshot.
    Apply {
        /// Print the actions instead of sending them to Gmail.
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch, then apply.
    Run {
        /// Print the actions instead of sending them to Gmail.
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the rule file and print what it contains.
    Check,
    /// Write a settings.json with the default values.
    Init,
    /// Forget the cached Gmail tokens.
    Logout,
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command; `Ok(false)` means it finished with failures
fn run(cli: Cli) -> Result<bool> {
    let settings = resolve_settings(Settings::load()?, &cli)?;

    match cli.command {
        Commands::Check => {
            check_rules(&settings)?;
            print_gmail_status();
            Ok(true)
        }
        Commands::Init => {
            if Settings::exists() {
                warn!("settings.json already exists; leaving it unchanged");
            } else {
                Settings::default().save()?;
                info!("Wrote default settings.json");
            }
            Ok(true)
        }
        Commands::Logout => {
            gmail_auth()?.logout()?;
            open_store(&settings)?.clear()?;
            info!("Removed cached Gmail tokens and the local inbox snapshot");
            Ok(true)
        }
        Commands::Fetch => {
            let store = open_store(&settings)?;
            let gmail = connect_gmail()?;
            sync_inbox(&gmail, store.as_ref(), settings.max_results)?;
            Ok(true)
        }
        Commands::Apply { dry_run } => {
            let store = open_store(&settings)?;
            let gmail = if dry_run { None } else { Some(Arc::new(connect_gmail()?)) };
            apply_rules(&settings, store, gmail, dry_run)
        }
        Commands::Run { dry_run } => {
            let store = open_store(&settings)?;
            let gmail = Arc::new(connect_gmail()?);
            sync_inbox(&gmail, store.as_ref(), settings.max_results)?;
            let gmail = if dry_run { None } else { Some(gmail) };
            apply_rules(&settings, store, gmail, dry_run)
        }
    }
}

/// Command-line flags take precedence over settings.json
fn resolve_settings(mut settings: Settings, cli: &Cli) -> Result<Settings> {
    if let Some(rules) = &cli.rules {
        settings.rules_path = rules.clone();
    }
    if let Some(db) = &cli.db {
        settings.database_path = Some(db.clone());
    }
    if let Some(max_results) = cli.max_results {
        settings.max_results = max_results;
    }
    settings.fail_fast |= cli.fail_fast;
    settings.parallel |= cli.parallel;

    anyhow::ensure!(
        settings.max_results > 0,
        "max_results must be at least 1"
    );
    Ok(settings)
}

fn open_store(settings: &Settings) -> Result<Arc<dyn EmailStore>> {
    let path = settings.database_path()?;
    let store = SqliteEmailStore::new(&path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(store))
}

fn gmail_auth() -> Result<GmailAuth> {
    let creds = GmailCredentials::load().map_err(|e| {
        if let Some(path) = GmailCredentials::default_credentials_path() {
            warn!(
                "To configure Gmail access, either:\n\
                 1. Place your Google OAuth credentials at: {}\n\
                 2. Or set environment variables: GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
                path.display()
            );
        }
        e
    })?;

    GmailAuth::new(creds.client_id, creds.client_secret)
}

/// Report whether a later fetch will need the browser sign-in
fn print_gmail_status() {
    match gmail_auth() {
        Ok(auth) if auth.is_authenticated() => println!("gmail: signed in"),
        Ok(_) => println!("gmail: not signed in; the next fetch opens the browser"),
        Err(_) => println!("gmail: no OAuth credentials configured"),
    }
}

/// Build an authenticated client, running the browser flow if needed
fn connect_gmail() -> Result<GmailClient> {
    let client = GmailClient::new(gmail_auth()?);
    client.authenticate()?;
    Ok(client)
}

fn load_rules(settings: &Settings) -> Result<Vec<Rule>> {
    let rules = load_rules_file(&settings.rules_path)?;
    info!(
        "Loaded {} rules from {}",
        rules.len(),
        settings.rules_path.display()
    );
    Ok(rules)
}

fn check_rules(settings: &Settings) -> Result<()> {
    for rule in load_rules(settings)? {
        let actions: Vec<String> = rule.actions.iter().map(ToString::to_string).collect();
        println!(
            "rule {}: {} of {} conditions -> [{}]",
            rule.index,
            rule.predicate,
            rule.conditions.len(),
            actions.join(", ")
        );
    }
    Ok(())
}

/// Evaluate the rules against the stored snapshot and dispatch matches
///
/// Without a Gmail client the actions are recorded and printed instead.
fn apply_rules(
    settings: &Settings,
    store: Arc<dyn EmailStore>,
    gmail: Option<Arc<GmailClient>>,
    dry_run: bool,
) -> Result<bool> {
    let rules = load_rules(settings)?;
    let emails = store.load_all()?;
    if emails.is_empty() {
        warn!("No stored emails; run `sift fetch` first");
    }

    let recorder = Arc::new(RecordingMailService::new());
    let service: Arc<dyn MailService> = match gmail {
        Some(gmail) => Arc::new(ActionHandler::new(gmail, store.clone())),
        None => recorder.clone(),
    };

    let policy = if settings.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Isolate
    };
    let engine = RuleEngine::new(service).failure_policy(policy);

    let summary: RunSummary = if settings.parallel {
        engine.run_parallel(&emails, &rules)
    } else {
        engine.run(&emails, &rules)
    };

    if dry_run {
        for call in recorder.calls() {
            println!("{}: {}", call.email_id, call.action);
        }
    }
    for failure in &summary.failures {
        warn!("{}", failure);
    }
    println!("{}", summary);

    Ok(summary.is_clean())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "sift",
            "apply",
            "--rules",
            "custom.json",
            "--max-results",
            "50",
            "--fail-fast",
        ]);
        let settings = resolve_settings(Settings::default(), &cli).unwrap();

        assert_eq!(settings.rules_path, PathBuf::from("custom.json"));
        assert_eq!(settings.max_results, 50);
        assert!(settings.fail_fast);
        assert!(!settings.parallel);
        assert!(matches!(cli.command, Commands::Apply { dry_run: false }));
    }

    #[test]
    fn test_settings_kept_without_flags() {
        let cli = Cli::parse_from(["sift", "check"]);
        let file_settings = Settings {
            max_results: 25,
            parallel: true,
            ..Default::default()
        };
        let settings = resolve_settings(file_settings.clone(), &cli).unwrap();

        assert_eq!(settings, file_settings);
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let cli = Cli::parse_from(["sift", "fetch", "--max-results", "0"]);
        assert!(resolve_settings(Settings::default(), &cli).is_err());

        let cli = Cli::parse_from(["sift", "fetch"]);
        let file_settings = Settings {
            max_results: 0,
            ..Default::default()
        };
        assert!(resolve_settings(file_settings, &cli).is_err());
    }

    #[test]
    fn test_dry_run_apply_records_instead_of_sending() {
        let store: Arc<dyn EmailStore> = Arc::new(SqliteEmailStore::in_memory().unwrap());
        store
            .replace_all(vec![
                sift::Email::builder("m1")
                    .sender("news@example.com")
                    .unread(true)
                    .build(),
            ])
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("rules.json");
        std::fs::write(
            &rules_path,
            r#"[{"predicate": "all",
                 "conditions": [{"field": "sender", "operator": "contains", "value": "news"}],
                 "actions": ["mark as read"]}]"#,
        )
        .unwrap();
        let settings = Settings {
            rules_path,
            ..Default::default()
        };

        assert!(apply_rules(&settings, store.clone(), None, true).unwrap());
        assert!(store.get_email(&"m1".into()).unwrap().unwrap().unread);
    }
}
