use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{AppointmentClient, AppointmentStore, AppointmentsView, HttpAppointmentService};
use shared::domain::{AppointmentId, UiAppointment};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(about = "Manage appointments held by the appointment service")]
struct Args {
    /// Appointment collection endpoint; overrides the settings file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// `local`, `utc` or a fixed offset such as `+02:00`.
    #[arg(long, global = true)]
    zone: Option<String>,
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Print the resulting view as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Add(FieldArgs),
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: Option<String>,
    /// `HH:MM`
    #[arg(long)]
    time: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    attendee: Option<String>,
}

impl FieldArgs {
    fn apply(self, mut base: UiAppointment) -> UiAppointment {
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.date {
            base.date = v;
        }
        if let Some(v) = self.time {
            base.time = v;
        }
        if let Some(v) = self.description {
            base.description = v;
        }
        if let Some(v) = self.attendee {
            base.attendee = v;
        }
        base
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(zone) = args.zone {
        settings.zone = zone;
    }
    let zone = settings.zone()?;
    debug!(api_url = %settings.api_url, %zone, "desktop: settings resolved");

    let service = HttpAppointmentService::new(&settings.api_url)
        .with_context(|| format!("invalid api url '{}'", settings.api_url))?;
    let client =
        AppointmentClient::new_with_dependencies(AppointmentStore::new(), Arc::new(service), zone);

    let view = run(&client, args.command).await?;
    print_view(&view, args.json)?;
    if let Some(error) = view.error {
        bail!("{error}");
    }
    Ok(())
}

/// `RUST_LOG` when it parses, `info` otherwise.
fn log_filter(raw: Option<String>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Runs one command and returns the view to print. Writes refetch so the
/// printed list matches the service.
async fn run(client: &AppointmentClient, command: Command) -> Result<AppointmentsView> {
    match command {
        Command::List => {}
        Command::Add(fields) => {
            let created = client
                .add_appointment(fields.apply(UiAppointment::default()))
                .await
                .context("add failed")?;
            if let Some(id) = created.id {
                eprintln!("created appointment {id}");
            }
        }
        Command::Update { id, fields } => {
            let id = AppointmentId(id);
            client.fetch_appointments().await;
            let existing = find(&client.view().await, id)?;
            client
                .update_appointment(fields.apply(existing))
                .await
                .context("update failed")?;
            eprintln!("updated appointment {id}");
        }
        Command::Delete { id } => {
            let id = AppointmentId(id);
            client
                .delete_appointment(id)
                .await
                .context("delete failed")?;
            eprintln!("deleted appointment {id}");
        }
    }
    client.fetch_appointments().await;
    Ok(client.view().await)
}

/// The current copy of `id`, after a fetch has settled.
fn find(view: &AppointmentsView, id: AppointmentId) -> Result<UiAppointment> {
    if let Some(error) = &view.error {
        bail!("could not load appointments: {error}");
    }
    view.appointments
        .iter()
        .find(|appt| appt.id == Some(id))
        .cloned()
        .with_context(|| format!("appointment {id} not found"))
}

fn print_view(view: &AppointmentsView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&view.appointments)?);
        return Ok(());
    }
    for line in render_lines(view) {
        println!("{line}");
    }
    Ok(())
}

fn render_lines(view: &AppointmentsView) -> Vec<String> {
    if view.appointments.is_empty() {
        return vec!["no appointments".to_string()];
    }
    view.appointments
        .iter()
        .map(|appt| {
            let id = appt
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let mut line = format!("#{id} {} {} {}", appt.date, appt.time, appt.name);
            if !appt.attendee.is_empty() {
                line.push_str(&format!(" with {}", appt.attendee));
            }
            if !appt.description.is_empty() {
                line.push_str(&format!(" ({})", appt.description));
            }
            line
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
