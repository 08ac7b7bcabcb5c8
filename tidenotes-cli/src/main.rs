//! Command-line driver for Tidenotes.
//!
//! Each invocation opens a session against the local backend, issues the
//! requested mutation, then pumps the change stream so the printed list
//! reflects the confirmed state.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tidenotes_core::{default_owner, LocalBackend, NotesBackend, Session};

#[derive(Parser)]
#[command(name = "tidenotes", about = "A note-taking client with live change-stream reconciliation", version)]
struct Cli {
    /// Path to the note store.
    #[arg(short, long, default_value = "tidenotes.db")]
    file: PathBuf,

    /// Owner identity; defaults to $TIDENOTES_OWNER or the hostname.
    #[arg(short, long)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all notes.
    List,
    /// Create a new note.
    Add {
        /// Note text.
        text: String,
    },
    /// Replace the text of an existing note.
    Edit {
        /// Note ID (as shown by `list`).
        id: String,
        /// Replacement text.
        text: String,
    },
    /// Delete a note.
    Rm {
        /// Note ID (as shown by `list`).
        id: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let owner = match cli.owner {
        Some(owner) => owner,
        None => default_owner().context("could not determine owner identity")?,
    };

    let backend = Arc::new(
        LocalBackend::open(&cli.file)
            .with_context(|| format!("could not open note store {}", cli.file.display()))?,
    );
    let mut session = Session::open(backend as Arc<dyn NotesBackend>, owner)
        .context("could not open session")?;

    match cli.command {
        Command::List => {}
        Command::Add { text } => {
            session.set_draft(text);
            session.submit().context("create failed")?;
        }
        Command::Edit { id, text } => {
            session
                .select(&id)
                .with_context(|| format!("no note with id {id}"))?;
            session.set_draft(text);
            session.submit().context("update failed")?;
        }
        Command::Rm { id } => {
            session.delete(&id).with_context(|| format!("delete failed for {id}"))?;
        }
    }

    let applied = session.pump_events();
    log::debug!("applied {applied} stream events");

    if session.notes().is_empty() {
        println!("(no notes)");
    } else {
        for note in session.notes() {
            println!("{}  {}", note.id, note.content);
        }
    }

    Ok(())
}
