//! Veterinary records, owned by a single dog.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::convert::{vet_record_from_row, VET_RECORD_COLUMNS};
use super::error::{map_constraint, Result, StoreError};
use crate::models::{NewVetRecord, VetRecord};

/// Veterinary history of one dog, most recent first.
pub fn fetch_vet_records(conn: &Connection, dog_id: i64) -> Result<Vec<VetRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VET_RECORD_COLUMNS} FROM vet_records
         WHERE dog_id = ?1
         ORDER BY date DESC, id DESC"
    ))?;
    let records = stmt
        .query_map([dog_id], vet_record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn fetch_vet_record(conn: &Connection, id: i64) -> Result<Option<VetRecord>> {
    let record = conn
        .query_row(
            &format!("SELECT {VET_RECORD_COLUMNS} FROM vet_records WHERE id = ?1"),
            [id],
            vet_record_from_row,
        )
        .optional()?;
    Ok(record)
}

pub fn create_vet_record(conn: &Connection, record: &NewVetRecord) -> Result<VetRecord> {
    conn.execute(
        "INSERT INTO vet_records (dog_id, type, title, date, next_due_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.dog_id,
            record.kind,
            record.title,
            record.date,
            record.next_due_date,
            record.notes,
        ],
    )
    .map_err(|err| map_constraint(err, "vet record"))?;

    let id = conn.last_insert_rowid();
    debug!(id, dog_id = record.dog_id, kind = record.kind.code(), "inserted vet record");
    Ok(VetRecord::from_new(id, record.clone()))
}

pub fn update_vet_record(conn: &Connection, id: i64, record: &NewVetRecord) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE vet_records SET
                dog_id = ?1, type = ?2, title = ?3, date = ?4, next_due_date = ?5, notes = ?6
             WHERE id = ?7",
            params![
                record.dog_id,
                record.kind,
                record.title,
                record.date,
                record.next_due_date,
                record.notes,
                id,
            ],
        )
        .map_err(|err| map_constraint(err, "vet record"))?;

    if updated == 0 {
        return Err(StoreError::NotFound {
            entity: "vet record",
            id,
        });
    }
    debug!(id, "updated vet record");
    Ok(())
}

pub fn delete_vet_record(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM vet_records WHERE id = ?1", params![id])?;
    debug!(id, deleted, "deleted vet record");
    Ok(deleted > 0)
}
