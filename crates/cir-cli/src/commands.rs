use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use cir_catalog::SchemaRegistry;
use cir_core::models::answer::AnswerSet;
use cir_core::models::presentation::ResolvedHints;
use cir_core::models::report::Status;
use cir_core::vocab::{Hint, ItemType, ValidatorType};
use cir_engine::{resolve_hints, suggest_menu_hint, suggest_validator, Engine, EngineOptions, SchemaViolation};

use crate::args::{Cli, Commands, ConfigAction};
use crate::config::{self, CliConfig};

/// Report status FAIL.
const EXIT_FAIL: u8 = 1;
/// Document rejected, or bad input or configuration.
pub const EXIT_REJECTED: u8 = 2;

/// Effective settings after layering flags and env vars over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub options: EngineOptions,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: CliConfig) -> Self {
        let mut options = config.engine;
        if let Some(steps) = cli.max_script_steps {
            options.max_script_steps = steps;
        }
        Self {
            config_path: cli.config.clone(),
            catalog: cli.catalog.clone().or(config.catalog),
            options,
        }
    }
}

/// The built-in registry, or one loaded from `path`.
pub fn load_registry(path: Option<&Path>) -> eyre::Result<Cow<'static, SchemaRegistry>> {
    let Some(path) = path else {
        return Ok(Cow::Borrowed(SchemaRegistry::builtin()));
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read catalog at {}: {e}", path.display()))?;
    let registry = SchemaRegistry::from_json(&contents)
        .map_err(|e| eyre::eyre!("catalog {} is invalid: {e}", path.display()))?;
    tracing::info!(path = %path.display(), item_types = registry.len(), "catalog loaded");
    Ok(Cow::Owned(registry))
}

pub fn run(cli: &Cli) -> eyre::Result<ExitCode> {
    let config = config::load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(cli, config);

    match &cli.command {
        Commands::Validate { document, answers } => {
            let registry = load_registry(settings.catalog.as_deref())?;
            let engine = Engine::with_options(&registry, settings.options);
            validate(&engine, document, answers.as_deref())
        }
        Commands::Resolve { document } => {
            let registry = load_registry(settings.catalog.as_deref())?;
            let engine = Engine::with_options(&registry, settings.options);
            resolve(&engine, document)
        }
        Commands::Catalog { item_type } => {
            let registry = load_registry(settings.catalog.as_deref())?;
            catalog(&registry, item_type.as_deref())
        }
        Commands::Config { action } => config_command(action, &settings),
    }
}

fn read_json(path: &Path) -> eyre::Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| eyre::eyre!("{} is not valid JSON: {e}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn rejected(violation: &SchemaViolation) -> eyre::Result<ExitCode> {
    tracing::warn!(path = %violation.path, violations = violation.violations.len(), "document rejected");
    print_json(violation)?;
    eprintln!("error: {violation}");
    Ok(ExitCode::from(EXIT_REJECTED))
}

fn validate(engine: &Engine<'_>, document: &Path, answers: Option<&Path>) -> eyre::Result<ExitCode> {
    let raw = read_json(document)?;
    let answers: AnswerSet = match answers {
        Some(path) => serde_json::from_value(read_json(path)?)
            .map_err(|e| eyre::eyre!("answers in {} are malformed: {e}", path.display()))?,
        None => AnswerSet::new(),
    };

    match engine.validate_document(&raw, &answers) {
        Ok(report) => {
            print_json(&report)?;
            Ok(match report.status {
                Status::Ok => ExitCode::SUCCESS,
                Status::Fail => ExitCode::from(EXIT_FAIL),
            })
        }
        Err(violation) => rejected(&violation),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedItem<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    item_type: &'a ItemType,
    #[serde(flatten)]
    resolved: ResolvedHints,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_menu_hint: Option<Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_validator: Option<ValidatorType>,
}

fn resolve(engine: &Engine<'_>, document: &Path) -> eyre::Result<ExitCode> {
    let raw = read_json(document)?;
    let document = match engine.parse(&raw) {
        Ok(document) => document,
        Err(violation) => return rejected(&violation),
    };

    let items: Vec<_> = document
        .items()
        .iter()
        .map(|item| ResolvedItem {
            id: &item.id,
            item_type: &item.item_type,
            resolved: resolve_hints(item),
            suggested_menu_hint: suggest_menu_hint(item),
            suggested_validator: engine
                .registry()
                .lookup(&item.item_type)
                .ok()
                .and_then(|rule| suggest_validator(item, rule)),
        })
        .collect();
    print_json(&serde_json::json!({ "items": items, "notes": document.notes() }))?;
    Ok(ExitCode::SUCCESS)
}

fn catalog(registry: &SchemaRegistry, item_type: Option<&str>) -> eyre::Result<ExitCode> {
    match item_type {
        Some(name) => print_json(registry.lookup(&ItemType::canonical(name))?)?,
        None => print_json(&serde_json::json!({
            "item_types": registry.rules(),
            "emr_fields": registry.emr_fields().collect::<Vec<_>>(),
        }))?,
    }
    Ok(ExitCode::SUCCESS)
}

fn config_command(action: &ConfigAction, settings: &Settings) -> eyre::Result<ExitCode> {
    match action {
        ConfigAction::Show => print_json(&serde_json::json!({
            "catalog": settings.catalog,
            "engine": settings.options,
        }))?,
        ConfigAction::Init { force } => {
            let path = match &settings.config_path {
                Some(path) => path.clone(),
                None => config::default_config_path()?,
            };
            if path.exists() && !*force {
                eyre::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            config::save_config(&path, &CliConfig::default())?;
            println!("{}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
