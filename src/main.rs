use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use notas::error::ClientError;
use notas::identity::{Credentials, Role};
use notas::notes::format::{DEFAULT_WIDTH, format_date, truncate};
use notas::notes::{
    Note, NoteFilter, NoteUpdate, Priority, Status, StatusChange, allowed_transitions,
};
use notas::router::Navigation;
use notas::{AppState, config, initialize_state, telemetry};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,
    /// Backend URL, overrides the configuration file.
    #[arg(long, env = "NOTAS_URL")]
    url: Option<String>,
    /// Employee number used to log in.
    #[arg(long, env = "NOTAS_LEGAJO")]
    legajo: Option<String>,
    #[arg(long, env = "NOTAS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show who owns the session.
    Whoami,
    /// Open an application route through the navigation guard.
    Open { path: String },
    /// List notes.
    Notas {
        #[arg(long)]
        estado: Option<Status>,
        #[arg(long)]
        prioridad: Option<Priority>,
        /// Only notes past their due date.
        #[arg(long)]
        atrasadas: bool,
    },
    /// Move a note to another status. Without a target, list the allowed ones.
    Estado {
        id: u64,
        nuevo: Option<Status>,
        #[arg(long)]
        motivo: Option<String>,
        /// User id of the new assignee.
        #[arg(long)]
        responsable: Option<u64>,
    },
    /// Edit a note.
    Editar {
        id: u64,
        #[arg(long)]
        tema: Option<String>,
        #[arg(long)]
        prioridad: Option<Priority>,
        /// Due date, `YYYY-MM-DD`.
        #[arg(long)]
        vence: Option<NaiveDate>,
        #[arg(long)]
        responsable: Option<u64>,
    },
    /// Remove an attachment.
    BorrarAdjunto { id: u64 },
    /// Close the session.
    Logout,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn print_notes(state: &AppState, notes: &[Note]) {
    if notes.is_empty() {
        println!("Sin notas.");
        return;
    }

    for note in notes {
        let overdue = if state.calendar.is_overdue(note) {
            "ATRASADA"
        } else {
            ""
        };
        println!(
            "{:<16} {:<41} {:<12} {:<8} {:<10} {:<16} {}",
            note.reference(),
            truncate(&note.subject, DEFAULT_WIDTH),
            note.status_label(),
            note.priority_label(),
            format_date(note.due_date),
            state.calendar.recency_label(&note.entry_date.to_string()),
            overdue,
        );
    }
}

/// Run the guard for `path`. Prints the redirect and returns `None` when the
/// route cannot be opened.
async fn enter(state: &AppState, path: &str) -> Option<Role> {
    match state.navigator.navigate(path).await {
        Navigation::Proceed(_) => state.session.role(),
        Navigation::Redirect { verdict, to } => {
            println!("{verdict}: {to}");
            None
        },
    }
}

/// A refused fetch that dropped the session goes back through the guard
/// instead of surfacing as an error.
async fn settle(state: &AppState, path: &str, err: ClientError) -> CliResult {
    if !state.session.is_authenticated() && enter(state, path).await.is_none() {
        return Ok(());
    }
    Err(err.display_message(&err.to_string()).into())
}

async fn show(state: &AppState, path: &str, notes: notas::error::Result<Vec<Note>>) -> CliResult {
    match notes {
        Ok(notes) => {
            print_notes(state, &notes);
            Ok(())
        },
        Err(err) => settle(state, path, err).await,
    }
}

async fn open(state: &AppState, path: &str) -> CliResult {
    let route = match state.navigator.navigate(path).await {
        Navigation::Proceed(route) => route,
        Navigation::Redirect { verdict, to } => {
            println!("{verdict}: {to}");
            return Ok(());
        },
    };
    let role = state.session.role();

    match route.name {
        Some("dashboard") => match state.notes.list(&NoteFilter::default()).await {
            Ok(notes) => {
                let summary = state.calendar.summarize(&notes);
                println!("Hola, {}.", state.session.display_name());
                println!(
                    "Total: {} | Este mes: {} | Hoy: {} | Atrasadas: {} | Pendientes: {}",
                    summary.total,
                    summary.this_month,
                    summary.today,
                    summary.overdue,
                    summary.pending
                );
            },
            Err(err) => settle(state, path, err).await?,
        },
        Some("notas") => show(state, path, state.notes.list(&NoteFilter::default()).await).await?,
        Some("notas-nueva") => {
            if role.is_some_and(Role::can_create_notes) {
                println!("{}", route.path);
            } else {
                println!("No tiene permiso para crear notas.");
            }
        },
        Some("notas-pendientes") => show(state, path, state.notes.pending().await).await?,
        Some("notas-atrasadas") => {
            if role.is_some_and(Role::can_see_all_notes) {
                show(state, path, state.notes.overdue().await).await?;
            } else {
                println!("No tiene permiso para ver el listado de notas.");
            }
        },
        _ => println!("{}", route.path),
    }

    Ok(())
}

async fn change_status(
    state: &AppState,
    id: u64,
    target: Option<Status>,
    reason: Option<String>,
    assignee: Option<u64>,
) -> CliResult {
    let path = "/notas";
    let Some(role) = enter(state, path).await else {
        return Ok(());
    };
    let note = match state.notes.get(id).await {
        Ok(note) => note,
        Err(err) => return settle(state, path, err).await,
    };
    let Some(current) = note.status() else {
        println!("{}: estado {} desconocido.", note.reference(), note.status_label());
        return Ok(());
    };

    let Some(target) = target else {
        let allowed = allowed_transitions(current, role);
        if allowed.is_empty() {
            println!("{} ({current}): sin acciones disponibles.", note.reference());
        }
        for status in allowed {
            let mut needs = Vec::new();
            if status.requires_reason() {
                needs.push("--motivo");
            }
            if status.requires_assignee() {
                needs.push("--responsable");
            }
            println!("{:<12} {}", status.as_str(), needs.join(" "));
        }
        return Ok(());
    };

    let mut change = StatusChange::to(target);
    if let Some(reason) = reason {
        change = change.reason(reason);
    }
    if let Some(assignee) = assignee {
        change = change.assignee(assignee);
    }
    change.check(current, role)?;

    match state.notes.change_status(id, &change).await {
        Ok(note) => {
            println!("{}: {}", note.reference(), note.status_label());
            Ok(())
        },
        Err(err) => settle(state, path, err).await,
    }
}

async fn edit(state: &AppState, id: u64, update: NoteUpdate) -> CliResult {
    let path = "/notas";
    let Some(role) = enter(state, path).await else {
        return Ok(());
    };
    if !role.can_assign_notes() {
        return Err("Se requiere rol Director, Jefe o Administrador.".into());
    }
    if update.is_empty() {
        println!("Nada para cambiar.");
        return Ok(());
    }

    match state.notes.update(id, &update).await {
        Ok(note) => {
            println!(
                "{}: {} ({}, vence {})",
                note.reference(),
                truncate(&note.subject, DEFAULT_WIDTH),
                note.priority_label(),
                format_date(note.due_date)
            );
            Ok(())
        },
        Err(err) => settle(state, path, err).await,
    }
}

#[tokio::main]
async fn main() -> CliResult {
    let args = Args::parse();

    let mut config = config::Configuration::default().path(args.config);
    if let Some(url) = args.url {
        config = config.url(url);
    }
    let config = config.read()?;

    telemetry::setup_tracing(&config.log_level)?;
    telemetry::describe_metrics();

    let state = initialize_state(config)?;

    if let (Some(legajo), Some(password)) = (args.legajo, args.password) {
        if state.session.login(&Credentials::new(legajo, password)).await.is_err() {
            eprintln!("{}", state.session.error().unwrap_or_default());
            std::process::exit(1);
        }
    }

    match args.cmd {
        Commands::Whoami => {
            let identity = match state.session.identity() {
                Some(identity) => Some(identity),
                None => state.session.refresh_identity().await,
            };
            match identity {
                Some(identity) => println!(
                    "{} ({}) - {}",
                    identity.full_name, identity.username, identity.role
                ),
                None => println!("Sin sesión."),
            }
        },
        Commands::Open { path } => open(&state, &path).await?,
        Commands::Notas {
            estado,
            prioridad,
            atrasadas,
        } => {
            let path = "/notas";
            if enter(&state, path).await.is_none() {
                return Ok(());
            }
            let filter = NoteFilter {
                status: estado,
                priority: prioridad,
                assignee: None,
                overdue_only: atrasadas,
            };
            show(&state, path, state.notes.list(&filter).await).await?;
        },
        Commands::Estado {
            id,
            nuevo,
            motivo,
            responsable,
        } => change_status(&state, id, nuevo, motivo, responsable).await?,
        Commands::Editar {
            id,
            tema,
            prioridad,
            vence,
            responsable,
        } => {
            let update = NoteUpdate {
                subject: tema,
                priority: prioridad,
                due_date: vence,
                assignee: responsable,
            };
            edit(&state, id, update).await?;
        },
        Commands::BorrarAdjunto { id } => {
            let path = "/notas";
            if enter(&state, path).await.is_none() {
                return Ok(());
            }
            match state.notes.delete_attachment(id).await {
                Ok(()) => println!("Adjunto {id} eliminado."),
                Err(err) => settle(&state, path, err).await?,
            }
        },
        Commands::Logout => {
            state.session.logout().await;
            println!("Sesión cerrada.");
        },
    }

    Ok(())
}
