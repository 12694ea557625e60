//! Column conversions for the enum-typed fields and the row mappers shared by
//! the repository modules.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;

use crate::models::{Dog, GeneticTest, Mating, Sex, VetRecord, VetType};

impl ToSql for Sex {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Sex {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Sex::from_code(code).ok_or_else(|| unknown_code("sex", code))
    }
}

impl ToSql for VetType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for VetType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        VetType::from_code(code).ok_or_else(|| unknown_code("vet record type", code))
    }
}

fn unknown_code(column: &str, code: &str) -> FromSqlError {
    FromSqlError::Other(format!("unknown {column} code '{code}'").into())
}

pub(crate) const DOG_COLUMNS: &str =
    "id, name, registered_name, sex, breed, birthdate, color, microchip, notes, image_uri";

pub(crate) fn dog_from_row(row: &Row<'_>) -> rusqlite::Result<Dog> {
    Ok(Dog {
        id: row.get(0)?,
        name: row.get(1)?,
        registered_name: row.get(2)?,
        sex: row.get(3)?,
        breed: row.get(4)?,
        birthdate: row.get(5)?,
        color: row.get(6)?,
        microchip: row.get(7)?,
        notes: row.get(8)?,
        image_uri: row.get(9)?,
    })
}

pub(crate) const MATING_COLUMNS: &str = "id, male_dog_id, female_dog_id, date";

pub(crate) fn mating_from_row(row: &Row<'_>) -> rusqlite::Result<Mating> {
    Ok(Mating {
        id: row.get(0)?,
        male_dog_id: row.get(1)?,
        female_dog_id: row.get(2)?,
        date: row.get(3)?,
    })
}

pub(crate) const GENETIC_TEST_COLUMNS: &str = "id, dog_id, test_name, result, lab, date, notes";

pub(crate) fn genetic_test_from_row(row: &Row<'_>) -> rusqlite::Result<GeneticTest> {
    Ok(GeneticTest {
        id: row.get(0)?,
        dog_id: row.get(1)?,
        test_name: row.get(2)?,
        result: row.get(3)?,
        lab: row.get(4)?,
        date: row.get(5)?,
        notes: row.get(6)?,
    })
}

pub(crate) const VET_RECORD_COLUMNS: &str =
    "id, dog_id, type, title, date, next_due_date, notes";

pub(crate) fn vet_record_from_row(row: &Row<'_>) -> rusqlite::Result<VetRecord> {
    Ok(VetRecord {
        id: row.get(0)?,
        dog_id: row.get(1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        date: row.get(4)?,
        next_due_date: row.get(5)?,
        notes: row.get(6)?,
    })
}
