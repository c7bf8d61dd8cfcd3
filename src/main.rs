use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, DatePreset};
use config::Config;
use flock::domain::{AttendanceRecord, EventType, Member};
use flock::id::{RecordId, parse_id};
use flock::report::{self, DirectoryReport};
use flock::seed::Seed;
use flock::store::{AttendanceStore, MemberStore};

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flock")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("flock.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Both stores, seeded once for the lifetime of the process
struct Directory {
    members: MemberStore,
    attendance: AttendanceStore,
}

impl Directory {
    fn open(config: &Config) -> Result<Self> {
        let seed = Seed::load(config.seed.dir.as_deref()).context("Failed to load seed data")?;
        let latency = config.latency.build();

        Ok(Self {
            members: MemberStore::new(seed.members, latency.clone()),
            attendance: AttendanceStore::new(seed.attendance, latency),
        })
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let directory = Directory::open(config)?;

    match &cli.command {
        Commands::Members { status } => handle_members_command(&directory, status.as_deref()).await,
        Commands::Show { id } => handle_show_command(&directory, id).await,
        Commands::Search { query, grouped } => handle_search_command(&directory, query, *grouped).await,
        Commands::Families => handle_families_command(&directory).await,
        Commands::Stats => handle_stats_command(&directory).await,
        Commands::Attendance {
            member,
            event,
            since,
            from,
            to,
        } => {
            let range = match since {
                Some(preset) => Some(preset_range(*preset, Utc::now())?),
                None => None,
            };
            let filter = AttendanceFilter::parse(member.as_deref(), event.as_deref(), from.as_deref(), to.as_deref())?
                .with_range(range);
            handle_attendance_command(&directory, &filter).await
        }
        Commands::Report { output } => handle_report_command(&directory, output.as_deref(), config).await,
        Commands::ExportCsv { output } => handle_export_csv_command(&directory, output.as_deref()).await,
    }
}

fn print_member(member: &Member) {
    println!(
        "{:>4}  {:<24} {:<11} {:<28} {}",
        member.id,
        member.full_name(),
        member.status.as_str(),
        member.email,
        member.phone
    );
}

fn print_members(heading: &str, members: &[Member]) {
    println!("{} ({})", heading.cyan().bold(), members.len());
    for member in members {
        print_member(member);
    }
}

fn member_id_arg(text: &str) -> Result<RecordId> {
    parse_id(text).ok_or_else(|| eyre!("Member not found: {}", text))
}

async fn handle_members_command(directory: &Directory, status: Option<&str>) -> Result<()> {
    info!("Listing members - status: {:?}", status);
    let members = match status {
        Some(status) => directory.members.get_by_status(status).await?,
        None => directory.members.get_all().await?,
    };
    print_members("Members", &members);
    Ok(())
}

async fn handle_show_command(directory: &Directory, id: &str) -> Result<()> {
    info!("Showing member: {}", id);
    let id = member_id_arg(id)?;

    let (member, family, attendance) = futures::try_join!(
        directory.members.get_by_id(id),
        directory.members.get_family_members(id),
        directory.attendance.get_by_member_id(id)
    )?;

    println!("{} {}", "Member:".green(), member.full_name().bold());
    println!("  Status:     {}", member.status);
    println!("  Email:      {}", member.email);
    println!("  Phone:      {}", member.phone);
    if let Some(address) = &member.address {
        println!("  Address:    {}", address);
    }
    println!("  Joined:     {}", member.join_date.format("%Y-%m-%d"));
    if let Some(birth_date) = member.birth_date {
        println!("  Born:       {}", birth_date.format("%Y-%m-%d"));
    }
    if let Some(notes) = &member.notes {
        println!("  Notes:      {}", notes);
    }

    let present = attendance.iter().filter(|r| r.present).count();
    println!("  Attendance: {} present of {} records", present, attendance.len());

    if member.family_id.is_some() {
        print_members("Family", &family);
    }
    Ok(())
}

async fn handle_search_command(directory: &Directory, query: &str, grouped: bool) -> Result<()> {
    info!("Searching members: {:?} (grouped: {})", query, grouped);
    let mut results = directory.members.search(query).await?;
    if grouped {
        results = report::group_by_family(results);
    }
    print_members(&format!("Results for {:?}", query), &results);
    Ok(())
}

async fn handle_families_command(directory: &Directory) -> Result<()> {
    info!("Listing families");
    let families = directory.members.get_family_options().await?;
    println!("{} ({})", "Families".cyan().bold(), families.len());
    for family in families {
        println!("  {:<8} {:<20} {} members", family.id, family.name, family.member_count);
    }
    Ok(())
}

async fn handle_stats_command(directory: &Directory) -> Result<()> {
    info!("Showing statistics");
    let (members, attendance) = futures::try_join!(directory.members.get_stats(), directory.attendance.get_stats())?;

    println!("{}", "Members".cyan().bold());
    println!("  Total:       {}", members.total);
    println!("  Active:      {}", members.active);
    println!("  New members: {}", members.new_members);
    println!("  Visitors:    {}", members.visitors);
    println!("  Inactive:    {}", members.inactive);
    println!("{}", "Attendance".cyan().bold());
    println!("  Records:     {}", attendance.total_records);
    println!("  Present:     {}", attendance.present_count);
    println!("  Absent:      {}", attendance.absent_count);
    println!("  Rate:        {}%", attendance.attendance_rate);
    Ok(())
}

/// Parsed `attendance` subcommand filters
#[derive(Debug, Default)]
struct AttendanceFilter {
    member_id: Option<RecordId>,
    event_type: Option<EventType>,
    range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl AttendanceFilter {
    fn parse(member: Option<&str>, event: Option<&str>, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let member_id = member.map(member_id_arg).transpose()?;
        let event_type = event
            .map(|e| e.parse::<EventType>().map_err(|msg| eyre!(msg)))
            .transpose()?;
        let range = match (from, to) {
            (Some(from), Some(to)) => Some((parse_instant(from, false)?, parse_instant(to, true)?)),
            _ => None,
        };

        Ok(Self {
            member_id,
            event_type,
            range,
        })
    }

    /// Replace the date window when a preset supplied one
    fn with_range(mut self, range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Self {
        if range.is_some() {
            self.range = range;
        }
        self
    }

    fn matches(&self, record: &AttendanceRecord) -> bool {
        self.member_id.is_none_or(|id| record.member_id == id)
            && self.event_type.is_none_or(|event| record.event_type == event)
            && self
                .range
                .is_none_or(|(start, end)| record.date >= start && record.date <= end)
    }
}

/// Inclusive window for a date preset, relative to `now`
fn preset_range(preset: DatePreset, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match preset {
        DatePreset::Today => {
            let today = now.date_naive().format("%Y-%m-%d").to_string();
            Ok((parse_instant(&today, false)?, parse_instant(&today, true)?))
        }
        DatePreset::Week => Ok((now - Duration::days(7), now)),
    }
}

/// RFC 3339 instant, or `YYYY-MM-DD` meaning the start (or end) of that UTC day
fn parse_instant(text: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", text))?;
    let time = match end_of_day {
        true => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
        false => NaiveTime::from_hms_opt(0, 0, 0),
    };
    let time = time.ok_or_else(|| eyre!("Invalid time of day"))?;

    Ok(date.and_time(time).and_utc())
}

async fn handle_attendance_command(directory: &Directory, filter: &AttendanceFilter) -> Result<()> {
    info!("Listing attendance: {:?}", filter);

    // Narrow with the most selective store query, then apply the rest locally
    let records = if let Some(member_id) = filter.member_id {
        directory.attendance.get_by_member_id(member_id).await?
    } else if let Some((start, end)) = filter.range {
        directory.attendance.get_by_date_range(start, end).await?
    } else if let Some(event_type) = filter.event_type {
        directory.attendance.get_by_event_type(event_type).await?
    } else {
        directory.attendance.get_all().await?
    };

    let records: Vec<AttendanceRecord> = records.into_iter().filter(|r| filter.matches(r)).collect();
    let members = directory.members.get_all().await?;
    let rows = report::attendance_rows(&records, &members);

    println!("{} ({})", "Attendance records".cyan().bold(), rows.len());
    for row in rows {
        let mark = if row.record.present {
            "present".green()
        } else {
            "absent".red()
        };
        println!(
            "{:>4}  {}  {:<18} {:<24} {}",
            row.record.id,
            row.record.date.format("%Y-%m-%d %H:%M"),
            row.record.event_type.as_str(),
            row.member_name,
            mark
        );
    }
    Ok(())
}

/// Write `content` to `output`, or stdout when no path was given
///
/// A directory path receives `default_name` inside it.
fn write_output(output: Option<&Path>, default_name: &str, content: &str) -> Result<()> {
    match output {
        None => {
            println!("{}", content);
            Ok(())
        }
        Some(path) => {
            let path = if path.is_dir() {
                path.join(default_name)
            } else {
                path.to_path_buf()
            };
            fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", "Exported:".green(), path.display());
            Ok(())
        }
    }
}

async fn handle_report_command(directory: &Directory, output: Option<&Path>, config: &Config) -> Result<()> {
    info!("Exporting report");
    let report = DirectoryReport::build(&directory.members, &directory.attendance, config.report.recent_limit).await?;

    if output.is_some() {
        println!("{}", "Member status breakdown".cyan().bold());
        for (status, count) in report.status_breakdown() {
            println!("  {:<11} {}", status.as_str(), count);
        }
        print_members("Recent members", &report.recent_members);
    }

    let name = DirectoryReport::export_file_name(report.generated_at.date_naive());
    write_output(output, &name, &report.to_json_pretty()?)
}

async fn handle_export_csv_command(directory: &Directory, output: Option<&Path>) -> Result<()> {
    info!("Exporting members CSV");
    let members = directory.members.get_all().await?;
    write_output(output, "members.csv", &report::members_csv(&members))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(config.log_level.as_deref().unwrap_or("info")).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
