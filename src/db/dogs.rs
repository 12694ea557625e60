//! Dog profiles: CRUD plus the dependent counts shown before a delete.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::convert::{dog_from_row, DOG_COLUMNS};
use super::error::{map_constraint, Result, StoreError};
use crate::models::{DependentCounts, Dog, NewDog};

/// Retrieve every dog in insertion order.
pub fn fetch_dogs(conn: &Connection) -> Result<Vec<Dog>> {
    let mut stmt = conn.prepare(&format!("SELECT {DOG_COLUMNS} FROM dogs ORDER BY id"))?;
    let dogs = stmt
        .query_map([], dog_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(dogs)
}

pub fn fetch_dog(conn: &Connection, id: i64) -> Result<Option<Dog>> {
    let dog = conn
        .query_row(
            &format!("SELECT {DOG_COLUMNS} FROM dogs WHERE id = ?1"),
            [id],
            dog_from_row,
        )
        .optional()?;
    Ok(dog)
}

/// Insert a new dog, returning the hydrated struct so the caller can push it
/// straight into the in-memory list.
pub fn create_dog(conn: &Connection, dog: &NewDog) -> Result<Dog> {
    conn.execute(
        "INSERT INTO dogs
            (name, registered_name, sex, breed, birthdate, color, microchip, notes, image_uri)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            dog.name,
            dog.registered_name,
            dog.sex,
            dog.breed,
            dog.birthdate,
            dog.color,
            dog.microchip,
            dog.notes,
            dog.image_uri,
        ],
    )
    .map_err(|err| map_constraint(err, "dog"))?;

    let id = conn.last_insert_rowid();
    debug!(id, name = %dog.name, "inserted dog");
    Ok(Dog::from_new(id, dog.clone()))
}

/// Replace every field of an existing dog.
pub fn update_dog(conn: &Connection, id: i64, dog: &NewDog) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE dogs SET
                name = ?1, registered_name = ?2, sex = ?3, breed = ?4, birthdate = ?5,
                color = ?6, microchip = ?7, notes = ?8, image_uri = ?9
             WHERE id = ?10",
            params![
                dog.name,
                dog.registered_name,
                dog.sex,
                dog.breed,
                dog.birthdate,
                dog.color,
                dog.microchip,
                dog.notes,
                dog.image_uri,
                id,
            ],
        )
        .map_err(|err| map_constraint(err, "dog"))?;

    if updated == 0 {
        return Err(StoreError::NotFound { entity: "dog", id });
    }
    debug!(id, "updated dog");
    Ok(())
}

/// Remove a dog. The schema cascades to matings, genetic tests and vet
/// records, so dependents are not deleted here. Returns whether a row existed.
pub fn delete_dog(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM dogs WHERE id = ?1", params![id])?;
    debug!(id, deleted, "deleted dog");
    Ok(deleted > 0)
}

/// Count the rows a delete of this dog would cascade to.
pub fn count_dependents(conn: &Connection, dog_id: i64) -> Result<DependentCounts> {
    let counts = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM matings WHERE male_dog_id = ?1 OR female_dog_id = ?1),
            (SELECT COUNT(*) FROM genetic_tests WHERE dog_id = ?1),
            (SELECT COUNT(*) FROM vet_records WHERE dog_id = ?1)",
        [dog_id],
        |row| {
            Ok(DependentCounts {
                matings: row.get(0)?,
                genetic_tests: row.get(1)?,
                vet_records: row.get(2)?,
            })
        },
    )?;
    Ok(counts)
}
