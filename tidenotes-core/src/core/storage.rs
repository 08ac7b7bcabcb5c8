use crate::{Note, Result, TidenotesError};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('notes', 'store_meta')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(TidenotesError::InvalidStore(
                "Not a valid Tidenotes database".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    /// Opens `path` if it already holds a note store, otherwise creates one.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    pub fn list_notes(&self, owner: &str) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, content, created_at, updated_at
             FROM notes WHERE owner = ? ORDER BY created_at ASC, id ASC",
        )?;
        let notes = stmt
            .query_map([owner], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    owner: row.get(1)?,
                    content: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    pub fn get_note(&self, id: &str) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                "SELECT id, owner, content, created_at, updated_at
                 FROM notes WHERE id = ?",
                [id],
                |row| {
                    Ok(Note {
                        id: row.get(0)?,
                        owner: row.get(1)?,
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(note)
    }

    pub fn insert_note(&self, note: &Note) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notes (id, owner, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                note.id,
                note.owner,
                note.content,
                note.created_at,
                note.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn update_note(&self, note: &Note) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![note.content, note.updated_at, note.id],
        )?;
        if changed == 0 {
            return Err(TidenotesError::NoteNotFound(note.id.clone()));
        }
        Ok(())
    }

    pub fn delete_note(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(TidenotesError::NoteNotFound(id.to_string()));
        }
        Ok(())
    }
}
