//! Idempotent schema creation. Foreign keys are switched on per connection.

use rusqlite::Connection;
use tracing::info;

use super::error::Result;

/// Create every table and index that is missing and turn on foreign-key
/// enforcement for this connection. SQLite ships with enforcement off, and
/// the cascade from `dogs` to its dependents relies on it.
///
/// Every statement is `IF NOT EXISTS`, so running this against a populated
/// store leaves the rows alone.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS dogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            registered_name TEXT NOT NULL DEFAULT '',
            sex TEXT NOT NULL CHECK (sex IN ('M', 'F')),
            breed TEXT NOT NULL DEFAULT '',
            birthdate TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT '',
            microchip TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            image_uri TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS matings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            male_dog_id INTEGER NOT NULL,
            female_dog_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            FOREIGN KEY(male_dog_id) REFERENCES dogs(id) ON DELETE CASCADE,
            FOREIGN KEY(female_dog_id) REFERENCES dogs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS genetic_tests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dog_id INTEGER NOT NULL,
            test_name TEXT NOT NULL,
            result TEXT NOT NULL DEFAULT '',
            lab TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(dog_id) REFERENCES dogs(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS vet_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dog_id INTEGER NOT NULL,
            type TEXT NOT NULL
                CHECK (type IN ('VACCINATION', 'DEWORMING', 'EXAM', 'SURGERY', 'OTHER')),
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            next_due_date TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(dog_id) REFERENCES dogs(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_matings_male ON matings(male_dog_id);
        CREATE INDEX IF NOT EXISTS idx_matings_female ON matings(female_dog_id);
        CREATE INDEX IF NOT EXISTS idx_genetic_tests_dog ON genetic_tests(dog_id);
        CREATE INDEX IF NOT EXISTS idx_vet_records_dog ON vet_records(dog_id);",
    )?;

    info!("schema ready");
    Ok(())
}
