//! Patient-portal engagement dashboard: demo CLI
//!
//! Each invocation loads the dataset (or generates one), restores the stored
//! session, runs one command, and exits. Signing in persists the session, so
//! `login` followed by `report` behaves like one dashboard session.
//!
//! `generate` writes the default dataset path, which every later command reads
//! back, so searches and patient ids stay stable between invocations.
//!
//! Usage:
//!   cargo run -p demo -- generate --count 1000
//!   cargo run -p demo -- login --username admin --password admin123
//!   cargo run -p demo -- report --gender female --device Mobile
//!   cargo run -p demo -- search garcia
//!   cargo run -p demo -- patient P-0042
//!   cargo run -p demo -- logout

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use engage_access::{StaticCredentials, TomlAccessPolicy};
use engage_contracts::{error::EngageResult, filter::FilterField};
use engage_core::{
    config::DEFAULT_DATASET_PATH,
    dashboard::{Overview, PatientDetail},
    Dashboard, DashboardConfig, LoginOutcome, Screen, ViewOutcome,
};
use engage_dataset::{load_dataset, save_dataset, source_from_config, DatasetOrigin};
use engage_session::FileSessionStore;
use engage_verify::{dataset_schema, DatasetVerifier};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Patient-portal engagement analytics from the command line.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Patient-portal engagement dashboard",
    long_about = "Role-gated engagement analytics over a patient-portal dataset.\n\
                  Sign in as admin/admin123 or user/user123."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic dataset document.
    Generate {
        #[arg(long, default_value_t = 1000)]
        count: usize,
        #[arg(long, default_value = DEFAULT_DATASET_PATH)]
        out: PathBuf,
    },
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that run against a loaded dashboard.
#[derive(Subcommand)]
enum SessionCommand {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// KPIs and the charts the current role may see.
    Report {
        /// 18-30, 31-45, 46-60, 60+ or all.
        #[arg(long, default_value = "all")]
        age_group: String,
        /// Male, Female, Other or all (case-insensitive).
        #[arg(long, default_value = "all")]
        gender: String,
        /// Mobile, Desktop, Tablet or all.
        #[arg(long, default_value = "all")]
        device: String,
        /// Print the overview as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Find patients by name or id (admin only).
    Search { term: String },
    /// Show one patient's detail (admin only).
    Patient { id: String },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Dashboard error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> EngageResult<()> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    let command = match cli.command {
        Command::Generate { count, out } => return generate(count, &out),
        Command::Session(command) => command,
    };

    let (mut dashboard, origin) = open_dashboard(&config)?;

    match command {
        SessionCommand::Login { username, password } => login(&mut dashboard, &username, &password),
        SessionCommand::Logout => {
            dashboard.logout()?;
            println!("Signed out.");
            Ok(())
        }
        SessionCommand::Whoami => {
            match dashboard.session() {
                Some(s) => println!("{} ({}) - {}", s.name, s.role.label(), s.username),
                None => println!("Not signed in."),
            }
            Ok(())
        }
        SessionCommand::Report {
            age_group,
            gender,
            device,
            json,
        } => {
            dashboard.set_filter(FilterField::AgeGroup, &age_group)?;
            dashboard.set_filter(FilterField::Gender, &gender)?;
            dashboard.set_filter(FilterField::DeviceType, &device)?;
            report(&dashboard, &origin, json)
        }
        SessionCommand::Search { term } => search(&dashboard, &term),
        SessionCommand::Patient { id } => patient(&mut dashboard, &id),
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn open_dashboard(config: &DashboardConfig) -> EngageResult<(Dashboard, DatasetOrigin)> {
    let source = source_from_config(&config.dataset)?;
    let loaded = load_dataset(
        source.as_deref(),
        &DatasetVerifier::new(),
        &dataset_schema(config.dataset.verify_invariants),
        config.dataset.fallback_count,
    );

    let policy = match &config.access.policy_file {
        Some(path) => TomlAccessPolicy::from_file(path)?,
        None => TomlAccessPolicy::default_policy()?,
    };

    let dashboard = Dashboard::new(
        loaded.records,
        Box::new(StaticCredentials),
        Box::new(policy),
        Box::new(FileSessionStore::new(&config.session.dir)),
    )?;
    Ok((dashboard, loaded.origin))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn generate(count: usize, out: &Path) -> EngageResult<()> {
    let records = engage_dataset::generate(count);
    save_dataset(out, &records)?;
    info!(count, path = %out.display(), "dataset written");
    println!("Wrote {} records to {}", records.len(), out.display());
    Ok(())
}

fn login(dashboard: &mut Dashboard, username: &str, password: &str) -> EngageResult<()> {
    match dashboard.login(username, password)? {
        LoginOutcome::SignedIn(session) => {
            println!("Welcome, {} ({}).", session.name, session.role.label());
        }
        LoginOutcome::Rejected { reason } => {
            println!("Login failed: {}", reason);
            println!("Demo credentials: admin/admin123 or user/user123");
        }
    }
    Ok(())
}

fn report(dashboard: &Dashboard, origin: &DatasetOrigin, json: bool) -> EngageResult<()> {
    let overview = match dashboard.screen()? {
        Screen::Overview(overview) => overview,
        Screen::Login | Screen::Patient(_) => {
            println!("Not signed in. Run `demo login` first.");
            return Ok(());
        }
    };

    if json {
        match serde_json::to_string_pretty(&*overview) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("failed to render overview: {}", e),
        }
        return Ok(());
    }

    print_overview(&overview, origin);
    Ok(())
}

fn search(dashboard: &Dashboard, term: &str) -> EngageResult<()> {
    match dashboard.search_patients(term)? {
        None => println!("Admin access required to search patients."),
        Some(hits) if hits.is_empty() => println!("No patients match '{}'.", term),
        Some(hits) => {
            for r in hits {
                println!(
                    "{:<8} {:<22} {:>3}  {:<6} {}",
                    r.patient_id,
                    r.patient_name,
                    r.age,
                    r.gender.as_str(),
                    r.age_group
                );
            }
        }
    }
    Ok(())
}

fn patient(dashboard: &mut Dashboard, id: &str) -> EngageResult<()> {
    match dashboard.select_patient(id)? {
        ViewOutcome::Opened => {}
        ViewOutcome::Restricted { reason } => {
            println!("{}", reason);
            return Ok(());
        }
        ViewOutcome::NotFound => {
            println!("No patient with id '{}'.", id);
            return Ok(());
        }
    }

    if let Screen::Patient(detail) = dashboard.screen()? {
        print_patient(&detail);
    }
    dashboard.back_to_overview()
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn bar(value: f64, max: f64) -> String {
    const WIDTH: f64 = 30.0;
    if max <= 0.0 {
        return String::new();
    }
    "█".repeat((value / max * WIDTH).round() as usize)
}

fn print_overview(o: &Overview, origin: &DatasetOrigin) {
    let kpis = o.kpis.rounded();

    println!();
    println!("Patient Portal Engagement: {} ({})", o.session.name, o.session.role.label());
    println!("Dataset: {} records, {}", o.total_records, origin);
    println!(
        "Filters: age {} · gender {} · device {} ({} active, {} records match)",
        o.filters.value(FilterField::AgeGroup),
        o.filters.value(FilterField::Gender),
        o.filters.value(FilterField::DeviceType),
        o.filters.active_count(),
        o.filtered_records
    );
    println!();
    println!("  Avg logins / week     {:>6.1}", kpis.avg_logins);
    println!("  Avg secure messages   {:>6.1}", kpis.avg_messages);
    println!("  Avg no-show rate      {:>5.1}%", kpis.avg_no_show_rate);
    println!("  Avg session minutes   {:>6.1}", kpis.avg_session_minutes);

    for chart in &o.charts {
        println!();
        println!("{}: {}", chart.title(), chart.description());
        let points = chart.series.points();
        if points.is_empty() {
            println!("  (no data)");
            continue;
        }
        let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        for (label, value) in points {
            println!("  {:<22} {:>7.1} {}", label, value, bar(value, max));
        }
    }

    if !o.locked.is_empty() {
        println!();
        println!("{} more charts available with admin access.", o.locked.len());
    }
    println!();
}

fn print_patient(d: &PatientDetail) {
    let r = &d.record;
    let weekly = engage_dataset::simulate_weekly_logins(r.login_count, &mut rand::thread_rng());

    println!();
    println!("{} ({})", r.patient_name, r.patient_id);
    println!("  {} · {} · {}, {}", r.age, r.gender, r.city, r.state);
    println!("  Insurance {} · Condition {}", r.insurance_type, r.chronic_condition);
    println!("  Enrolled {} · Week of {}", r.enrollment_date, r.week_date);
    println!("  Device {}", r.device_type);
    println!();
    println!("  Logins this week      {:>5}  ({} engagement)", r.login_count, d.engagement_level);
    println!("  Secure messages       {:>5}", r.secure_messages);
    println!("  Refill requests       {:>5}", r.refill_requests);
    println!(
        "  Appointments          {:>5} scheduled, {} missed ({:.1}% no-show)",
        r.appointments_scheduled, r.appointments_missed, d.no_show_rate
    );
    println!("  Avg session minutes   {:>5.1}", r.avg_session_minutes);
    println!(
        "  Satisfaction          {:>5.1} / 5 ({:?}, {:.0}%)",
        r.satisfaction_score, d.satisfaction, d.satisfaction_percent
    );
    println!();
    println!("  Login trend (4 weeks): {:?}", weekly);
    println!();
}
