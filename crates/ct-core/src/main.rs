//! ct-core CLI entry point.
//!
//! Every subcommand resolves config first, then opens the JSONL request store
//! under the data directory only when it needs one.

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use ct_common::{ConsultationRequest, OutputFormat, RequestId, SCHEMA_VERSION};
use ct_config::{resolve_config, resolve_data_dir, ConfigPaths, ResolvedConfig};
use ct_core::dashboard::{Dashboard, DashboardReport, PurgeMode};
use ct_core::exit_codes::ExitCode;
use ct_core::intake::{submit_answers, IntakeAnswers, CONFIRMATION_MESSAGE};
use ct_core::logging::{self, LogFormat};
use ct_core::output;
use ct_core::store::JsonlRequestStore;
use ct_core::triage::{classify_region, UrgencyRules};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "ct-core", version, about = "Consultation request triage")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to a config file (overrides CONSULT_TRIAGE_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the request store (overrides CONSULT_TRIAGE_DATA)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Evaluate urgency as of this RFC 3339 instant instead of the clock
    #[arg(long, global = true, value_name = "RFC3339", value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full dashboard: totals, latest request, and the region × urgency partition
    Triage,
    /// Request counts per urgency category
    Totals,
    /// The most recently submitted request
    Latest,
    /// Classify a US state code into its region
    Region {
        /// Two-letter state code
        state: String,
    },
    /// Submit a consultation request from a JSON answers file
    Submit {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },
    /// Mark a request resolved
    Resolve { id: String },
    /// Move a resolved request back to pending
    Reopen { id: String },
    /// Delete every request
    Purge {
        /// Confirmation phrase, must be exactly "Delete All"
        #[arg(long, value_name = "PHRASE")]
        confirm: String,
        /// Report how many requests would be deleted without deleting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect the active configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// JSON schema of the stored request record
    Schema,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved policy and where it came from
    Show,
    /// Resolve and validate the policy
    Validate,
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

struct Session {
    format: OutputFormat,
    paths: ConfigPaths,
    config: ResolvedConfig,
    now: DateTime<Utc>,
}

impl Session {
    fn rules(&self) -> UrgencyRules {
        UrgencyRules::from_policy(&self.config.policy)
    }

    fn store(&self) -> ct_common::Result<JsonlRequestStore> {
        let data_dir = resolve_data_dir(&self.paths)?;
        debug!(data_dir = %data_dir.display(), "opening request store");
        Ok(JsonlRequestStore::from_data_dir(&data_dir))
    }

    fn dashboard(&self) -> ct_common::Result<Dashboard<JsonlRequestStore>> {
        Ok(Dashboard::new(self.store()?, self.rules()))
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, summary: impl FnOnce() -> String) -> ct_common::Result<()> {
        match self.format {
            OutputFormat::Json => print!("{}", output::to_json(value)?),
            OutputFormat::Summary => print!("{}", summary()),
        }
        Ok(())
    }

    fn emit_report(&self, report: &DashboardReport) -> ct_common::Result<()> {
        self.emit(report, || output::render_report(report))
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose, cli.global.log_format);

    let format = cli.global.format;
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(format, &err);
            ExitCode::from(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn report_error(format: OutputFormat, err: &ct_common::Error) {
    match format {
        OutputFormat::Json => {
            let body = json!({ "error": { "code": err.code(), "message": err.to_string() } });
            println!("{body}");
        }
        OutputFormat::Summary => eprintln!("error: {err}"),
    }
}

fn run(cli: Cli) -> ct_common::Result<ExitCode> {
    let paths = ConfigPaths {
        config_file: cli.global.config,
        data_dir: cli.global.data_dir,
    };
    let config = resolve_config(&paths)?;
    let session = Session {
        format: cli.global.format,
        now: cli.global.now.unwrap_or_else(Utc::now),
        paths,
        config,
    };

    match cli.command {
        Commands::Triage => run_triage(&session),
        Commands::Totals => run_totals(&session),
        Commands::Latest => run_latest(&session),
        Commands::Region { state } => run_region(&session, &state),
        Commands::Submit { file } => run_submit(&session, file),
        Commands::Resolve { id } => run_resolve(&session, RequestId::from(id), true),
        Commands::Reopen { id } => run_resolve(&session, RequestId::from(id), false),
        Commands::Purge { confirm, dry_run } => run_purge(&session, &confirm, dry_run),
        Commands::Config { command } => run_config(&session, command),
        Commands::Schema => run_schema(&session),
    }
}

fn run_triage(session: &Session) -> ct_common::Result<ExitCode> {
    let report = session.dashboard()?.load(session.now)?;
    session.emit_report(&report)?;
    Ok(if report.has_overdue() {
        ExitCode::OverdueRequests
    } else {
        ExitCode::Clean
    })
}

fn run_totals(session: &Session) -> ct_common::Result<ExitCode> {
    let report = session.dashboard()?.load(session.now)?;
    let body = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": report.generated_at,
        "total_requests": report.total_requests,
        "totals": report.totals,
        "region_totals": report.region_totals,
    });
    session.emit(&body, || {
        let mut text = output::render_totals(&report.totals);
        text.push('\n');
        text.push_str(&output::render_region_totals(&report));
        text
    })?;
    Ok(ExitCode::Clean)
}

fn run_latest(session: &Session) -> ct_common::Result<ExitCode> {
    let report = session.dashboard()?.load(session.now)?;
    let body = json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": report.generated_at,
        "latest": report.latest,
    });
    session.emit(&body, || output::render_latest(report.latest.as_ref()))?;
    Ok(ExitCode::Clean)
}

fn run_region(session: &Session, state: &str) -> ct_common::Result<ExitCode> {
    let region = classify_region(Some(state));
    let body = json!({ "state": state, "region": region });
    session.emit(&body, || format!("{region}\n"))?;
    Ok(ExitCode::Clean)
}

fn run_submit(session: &Session, file: PathBuf) -> ct_common::Result<ExitCode> {
    let raw = std::fs::read_to_string(&file)?;
    let answers: IntakeAnswers = serde_json::from_str(&raw)
        .map_err(|e| ct_common::Error::Intake(format!("invalid answers file {}: {e}", file.display())))?;

    let store = session.store()?;
    let id = submit_answers(session.config.policy.intake, answers, &store, session.now)?;

    let body = json!({ "id": id, "message": CONFIRMATION_MESSAGE });
    session.emit(&body, || format!("{CONFIRMATION_MESSAGE}\nRequest id: {id}\n"))?;
    Ok(ExitCode::Clean)
}

fn run_resolve(session: &Session, id: RequestId, resolve: bool) -> ct_common::Result<ExitCode> {
    let dashboard = session.dashboard()?;
    let report = if resolve {
        dashboard.resolve(&id, session.now)?
    } else {
        dashboard.reopen(&id, session.now)?
    };
    session.emit_report(&report)?;
    Ok(ExitCode::Clean)
}

fn run_purge(session: &Session, confirmation: &str, dry_run: bool) -> ct_common::Result<ExitCode> {
    let mode = if dry_run { PurgeMode::DryRun } else { PurgeMode::Execute };
    let outcome = session.dashboard()?.purge(confirmation, mode)?;
    session.emit(&outcome, || output::render_purge(&outcome))?;
    Ok(ExitCode::Clean)
}

fn run_config(session: &Session, command: ConfigCommands) -> ct_common::Result<ExitCode> {
    let config = &session.config;
    let source = config
        .source
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    match command {
        ConfigCommands::Show => session.emit(config, || {
            let sla = &config.policy.sla;
            let intake = &config.policy.intake;
            format!(
                "Source: {source}\nNew: up to {} business days\nNearly Due: up to {} business days\n\
                 UTC offset: {} minutes\nMax topics: {}\nCAPTCHA required: {}\n",
                sla.new_max_business_days,
                sla.nearly_due_max_business_days,
                config.policy.calendar.utc_offset_minutes,
                intake.max_topics,
                intake.require_captcha,
            )
        })?,
        ConfigCommands::Validate => {
            let body = json!({ "valid": true, "source": config.source });
            session.emit(&body, || format!("Config OK ({source})\n"))?;
        }
    }
    Ok(ExitCode::Clean)
}

fn run_schema(session: &Session) -> ct_common::Result<ExitCode> {
    let schema = schemars::schema_for!(ConsultationRequest);
    session.emit(&schema, || {
        serde_json::to_string_pretty(&schema).map(|s| s + "\n").unwrap_or_default()
    })?;
    Ok(ExitCode::Clean)
}
