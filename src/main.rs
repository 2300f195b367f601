//! Presensi command-line client
//!
//! Main application entry point

use std::io::BufRead;
use std::sync::Arc;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use Presensi::{
    config::Settings,
    i18n::{I18n, TranslationParams},
    models::{PageRequest, Profile},
    services::{RelayEvent, ServiceFactory, SessionDraft},
    state::{RejectReason, RequestContext, ScanOutcome},
    utils::{helpers, logging},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "School attendance QR check-in client")]
struct Cli {
    /// Language for messages (defaults to the system locale)
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Log in as an admin instead of a student
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored credentials
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Create an attendance session and print its QR payload
    Issue {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        teacher: String,
        #[arg(long)]
        location: String,
        /// Minutes: 15, 30, 45, 60, 90 or 120
        #[arg(long)]
        duration: Option<u32>,
    },
    /// List active attendance sessions
    Sessions,
    /// Deactivate an attendance session
    Deactivate { session_code: String },
    /// Show who attended a session
    Report { session_code: String },
    /// Submit a decoded QR payload; reads stdin when no payload is given
    Scan { payload: Option<String> },
    /// Listen for live notifications
    Listen,
    /// Check in for today
    Checkin {
        #[arg(long, default_value = "")]
        subject: String,
    },
    /// Check out for today
    Checkout,
    /// Show your attendance history
    History {
        /// Month as YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Print the effective configuration as TOML
    Config,
}

struct App {
    services: ServiceFactory,
    i18n: Arc<I18n>,
    lang: String,
}

impl App {
    fn t(&self, key: &str, params: &[(&str, String)]) -> String {
        let params: TranslationParams = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.i18n.t(key, &self.lang, Some(&params))
    }

    /// Context from stored credentials, or an error telling the user to log in
    async fn context(&self) -> anyhow::Result<RequestContext> {
        match self.services.auth_service.store().load().await? {
            Some(credentials) => Ok(RequestContext::from_credentials(credentials)),
            None => bail!(self.t("auth.not_logged_in", &[])),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", Presensi::info());

    // Initialize i18n system
    let mut i18n = I18n::new(&settings.i18n);
    i18n.load_translations().await?;
    let locale = cli.lang.clone().or_else(|| std::env::var("LANG").ok());
    let lang = i18n.detect_language(locale.as_deref());

    let services = ServiceFactory::new(settings)?;
    let app = App {
        services,
        i18n: Arc::new(i18n),
        lang,
    };

    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    let services = &app.services;
    let auth = &services.auth_service;

    match command {
        Command::Login { email, password, admin } => {
            let result = if admin {
                auth.admin_login(&email, &password).await
            } else {
                auth.student_login(&email, &password).await
            };
            match result {
                Ok(credentials) => println!("{}", app.t("auth.login_success", &[("name", credentials.name)])),
                Err(e) => {
                    let message = match &e {
                        Presensi::AttendanceError::Api(api) => api.user_message(&app.t("auth.login_failed", &[])),
                        other => other.to_string(),
                    };
                    bail!(message);
                }
            }
        }

        Command::Logout => {
            auth.logout().await?;
            println!("{}", app.t("auth.logged_out", &[]));
        }

        Command::Whoami => match auth.restore().await? {
            Some(ctx) => {
                let profile = auth.profile(&ctx).await?;
                let detail = match &profile {
                    Profile::Student(s) => format!("{} - {} {}", s.student_id, s.class, s.grade),
                    Profile::Admin(a) => a.email.clone(),
                };
                println!(
                    "{}",
                    app.t(
                        "auth.whoami",
                        &[
                            ("name", profile.display_name().to_string()),
                            ("user_type", profile.user_type().to_string()),
                        ]
                    )
                );
                println!("{}", detail);
            }
            None => println!("{}", app.t("auth.not_logged_in", &[])),
        },

        Command::Issue { subject, teacher, location, duration } => {
            let ctx = app.context().await?;
            let draft = SessionDraft {
                subject,
                teacher,
                location,
                duration_minutes: duration.unwrap_or(services.settings().session.default_duration),
            };
            let issued = match auth.guard(services.issuer.issue(&ctx, &draft).await).await {
                Ok(issued) => issued,
                Err(e) => {
                    warn!(error = %e, "Session creation failed");
                    bail!(app.t("issuer.failed", &[]));
                }
            };
            println!("{}", app.t("issuer.created", &[("subject", issued.session.subject.clone())]));
            println!(
                "{}",
                app.t(
                    "issuer.expires",
                    &[
                        ("time", helpers::format_date_time(issued.session.expires_at)),
                        ("minutes", draft.duration_minutes.to_string()),
                    ]
                )
            );
            println!("{}", issued.session.session_code);
            println!("{}", issued.payload);
        }

        Command::Sessions => {
            let ctx = app.context().await?;
            let sessions = auth.guard(services.issuer.list_active(&ctx).await).await?;
            if sessions.is_empty() {
                println!("{}", app.t("issuer.no_sessions", &[]));
            }
            for session in sessions {
                println!(
                    "{}  {}  {}  {}  {}",
                    session.session_code,
                    session.subject,
                    session.teacher,
                    session.location,
                    helpers::format_time(session.expires_at)
                );
            }
        }

        Command::Deactivate { session_code } => {
            let ctx = app.context().await?;
            auth.guard(services.issuer.deactivate(&ctx, &session_code).await).await?;
            println!("{}", app.t("issuer.deactivated", &[("code", session_code)]));
        }

        Command::Report { session_code } => {
            let ctx = app.context().await?;
            let report = auth.guard(services.issuer.report(&ctx, &session_code).await).await?;
            println!(
                "{}",
                app.t(
                    "issuer.report_header",
                    &[("count", report.total_count.to_string()), ("code", report.session.session_code.clone())]
                )
            );
            for row in report.attendances {
                println!(
                    "{}  {}  {} {}  {}",
                    row.student_id,
                    helpers::truncate_text(&row.student_name, 30),
                    row.class,
                    row.grade,
                    helpers::format_time(row.scan_time)
                );
            }
        }

        Command::Scan { payload } => {
            let ctx = app.context().await?;
            let raw = match payload {
                Some(raw) => raw,
                None => {
                    println!("{}", app.t("scanner.ready", &[]));
                    let mut line = String::new();
                    std::io::stdin().lock().read_line(&mut line)?;
                    line.trim().to_string()
                }
            };

            let mut scanner = services.scanner(app.i18n.clone(), &app.lang);
            scanner.start()?;
            let outcome = scanner.on_decoded(&ctx, &raw).await?;
            if outcome.is_some() {
                scanner.acknowledge()?;
            }

            match outcome {
                Some(ScanOutcome::Success { message, subject, teacher, .. }) => {
                    println!("{}", message);
                    println!("{}", scanner.success_detail(&subject, &teacher));
                }
                Some(ScanOutcome::Rejected { reason, message }) => {
                    if reason == RejectReason::Unauthorized {
                        auth.logout().await?;
                    }
                    bail!(message);
                }
                None => {}
            }
        }

        Command::Listen => {
            let ctx = app.context().await?;
            let mut center = services.notification_center();
            let events = services.relay.events(&ctx);

            center
                .run(events, |event, alert| match event {
                    RelayEvent::Connected => println!("{}", app.t("relay.connected", &[])),
                    RelayEvent::Notification(_) => {
                        if let Some(alert) = alert {
                            println!("[{}] {}: {}", alert.style.color(), alert.title, alert.message);
                        }
                    }
                    RelayEvent::Disconnected { .. } => println!("{}", app.t("relay.disconnected", &[])),
                    RelayEvent::Reconnecting { attempt, delay } => println!(
                        "{}",
                        app.t(
                            "relay.reconnecting",
                            &[("seconds", delay.as_secs().to_string()), ("attempt", attempt.to_string())]
                        )
                    ),
                    RelayEvent::GaveUp { .. } => println!("{}", app.t("relay.gave_up", &[])),
                    RelayEvent::Dropped { .. } => {}
                })
                .await;

            let unread = center.feed().unread_count() as i64;
            println!("{}", app.i18n.tp("relay.unread", &app.lang, unread, None));
        }

        Command::Checkin { subject } => {
            let ctx = app.context().await?;
            match auth.guard(services.attendance_service.check_in(&ctx, &subject).await).await {
                Ok(receipt) => println!("{}", receipt.message),
                Err(e) => bail!(user_message(&e, &app.t("attendance.checkin_failed", &[]))),
            }
        }

        Command::Checkout => {
            let ctx = app.context().await?;
            match auth.guard(services.attendance_service.check_out(&ctx).await).await {
                Ok(receipt) => println!("{}", receipt.message),
                Err(e) => bail!(user_message(&e, &app.t("attendance.checkout_failed", &[]))),
            }
        }

        Command::History { month, page, limit } => {
            let ctx = app.context().await?;
            let page = PageRequest { page, limit };
            let records = match auth
                .guard(services.attendance_service.my_attendance(&ctx, page, month.as_deref()).await)
                .await
            {
                Ok(records) => records,
                Err(e) => bail!(user_message(&e, &app.t("attendance.history_failed", &[]))),
            };

            if records.items.is_empty() {
                println!("{}", app.t("attendance.history_empty", &[]));
            }
            for record in &records.items {
                let status = app.i18n.t(&record.status.translation_key(), &app.lang, None);
                let check_in = record.check_in_time.map(helpers::format_time).unwrap_or_else(|| "-".to_string());
                let check_out = record.check_out_time.map(helpers::format_time).unwrap_or_else(|| "-".to_string());
                println!("{}  {:<12}  {}  {}", helpers::format_date(record.date), status, check_in, check_out);
            }
            println!("{}", app.i18n.tp("attendance.records", &app.lang, records.total as i64, None));
        }

        Command::Config => {
            println!("{}", services.settings().to_toml()?);
        }
    }

    Ok(())
}

fn user_message(error: &Presensi::AttendanceError, fallback: &str) -> String {
    match error {
        Presensi::AttendanceError::Api(api) => api.user_message(fallback),
        _ => fallback.to_string(),
    }
}
