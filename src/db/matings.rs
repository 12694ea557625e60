//! Matings between two dogs, listed most recent first.
//! Either parent's removal cascades to the mating.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::convert::{mating_from_row, MATING_COLUMNS};
use super::error::{map_constraint, Result, StoreError};
use crate::models::{Mating, NewMating};

/// Every mating, most recent first. Matings sharing a date come back newest
/// insert first.
pub fn fetch_matings(conn: &Connection) -> Result<Vec<Mating>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MATING_COLUMNS} FROM matings ORDER BY date DESC, id DESC"
    ))?;
    let matings = stmt
        .query_map([], mating_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(matings)
}

/// Matings where the dog occupies either slot, in the same order as
/// [`fetch_matings`].
pub fn fetch_matings_for_dog(conn: &Connection, dog_id: i64) -> Result<Vec<Mating>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MATING_COLUMNS} FROM matings
         WHERE male_dog_id = ?1 OR female_dog_id = ?1
         ORDER BY date DESC, id DESC"
    ))?;
    let matings = stmt
        .query_map([dog_id], mating_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(matings)
}

pub fn fetch_mating(conn: &Connection, id: i64) -> Result<Option<Mating>> {
    let mating = conn
        .query_row(
            &format!("SELECT {MATING_COLUMNS} FROM matings WHERE id = ?1"),
            [id],
            mating_from_row,
        )
        .optional()?;
    Ok(mating)
}

/// Insert a mating. Both dogs must already exist or the foreign keys reject
/// the row with [`StoreError::ConstraintViolation`].
pub fn create_mating(conn: &Connection, mating: &NewMating) -> Result<Mating> {
    conn.execute(
        "INSERT INTO matings (male_dog_id, female_dog_id, date) VALUES (?1, ?2, ?3)",
        params![mating.male_dog_id, mating.female_dog_id, mating.date],
    )
    .map_err(|err| map_constraint(err, "mating"))?;

    let id = conn.last_insert_rowid();
    debug!(
        id,
        male = mating.male_dog_id,
        female = mating.female_dog_id,
        "inserted mating"
    );
    Ok(Mating::from_new(id, mating.clone()))
}

pub fn update_mating(conn: &Connection, id: i64, mating: &NewMating) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE matings SET male_dog_id = ?1, female_dog_id = ?2, date = ?3 WHERE id = ?4",
            params![mating.male_dog_id, mating.female_dog_id, mating.date, id],
        )
        .map_err(|err| map_constraint(err, "mating"))?;

    if updated == 0 {
        return Err(StoreError::NotFound {
            entity: "mating",
            id,
        });
    }
    debug!(id, "updated mating");
    Ok(())
}

pub fn delete_mating(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM matings WHERE id = ?1", params![id])?;
    debug!(id, deleted, "deleted mating");
    Ok(deleted > 0)
}
