use std::fs;
use std::thread;

use probreedics::db::{
    count_dependents, create_dog, create_genetic_test, create_mating, create_vet_record,
    delete_dog, delete_genetic_test, delete_mating, delete_vet_record, ensure_schema, fetch_dog,
    fetch_dogs, fetch_genetic_test, fetch_genetic_tests, fetch_mating, fetch_matings,
    fetch_matings_for_dog, fetch_vet_record, fetch_vet_records, update_dog, update_genetic_test,
    update_mating, update_vet_record, StorageHandle, StoreError,
};
use probreedics::models::{
    NewDog, NewGeneticTest, NewMating, NewVetRecord, Sex, VetType,
};
use probreedics::paths::AppPaths;
use rusqlite::Connection;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> StorageHandle {
    let store = StorageHandle::at(&AppPaths::under(dir.path()));
    ensure_schema(&store.acquire().expect("open store")).expect("create schema");
    store
}

fn dog(name: &str, sex: Sex) -> NewDog {
    NewDog {
        name: name.to_string(),
        sex,
        ..NewDog::default()
    }
}

fn mating(male: i64, female: i64, date: &str) -> NewMating {
    NewMating {
        male_dog_id: male,
        female_dog_id: female,
        date: date.to_string(),
    }
}

fn genetic_test(dog_id: i64, name: &str, date: &str) -> NewGeneticTest {
    NewGeneticTest {
        dog_id,
        test_name: name.to_string(),
        date: date.to_string(),
        ..NewGeneticTest::default()
    }
}

fn vet_record(dog_id: i64, title: &str, date: &str) -> NewVetRecord {
    NewVetRecord {
        dog_id,
        title: title.to_string(),
        date: date.to_string(),
        ..NewVetRecord::default()
    }
}

fn foreign_keys_enabled(conn: &Connection) -> bool {
    conn.query_row("PRAGMA foreign_keys", [], |row| row.get::<_, i64>(0))
        .expect("read pragma")
        == 1
}

#[test]
fn handle_opens_lazily_and_once() {
    let dir = TempDir::new().unwrap();
    let paths = AppPaths::under(dir.path().join("nested"));
    let store = StorageHandle::at(&paths);

    assert!(!store.is_open());
    assert!(!paths.db_file.exists());

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let conn = store.acquire().expect("acquire");
                ensure_schema(&conn).expect("schema");
            });
        }
    });

    assert!(store.is_open());
    assert!(paths.db_file.exists());
    assert_eq!(store.path(), paths.db_file.as_path());
}

#[test]
fn unreachable_path_reports_storage_unavailable() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"plain file").unwrap();

    let store = StorageHandle::new(blocker.join("probreedics.db"));
    let err = store.acquire().unwrap_err();
    assert!(matches!(err, StoreError::StorageUnavailable { .. }), "{err:?}");
    assert!(!store.is_open());
}

#[test]
fn ensure_schema_is_idempotent_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let asha = create_dog(&store.acquire().unwrap(), &dog("Asha", Sex::Female)).unwrap();

    let conn = store.acquire().unwrap();
    ensure_schema(&conn).unwrap();
    ensure_schema(&conn).unwrap();

    assert!(foreign_keys_enabled(&conn));
    assert_eq!(fetch_dogs(&conn).unwrap(), vec![asha]);
}

#[test]
fn schema_survives_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        create_dog(&store.acquire().unwrap(), &dog("Asha", Sex::Female)).unwrap();
    }

    let store = open_store(&dir);
    let conn = store.acquire().unwrap();
    let dogs = fetch_dogs(&conn).unwrap();
    assert_eq!(dogs.len(), 1);
    assert_eq!(dogs[0].name, "Asha");
    assert!(foreign_keys_enabled(&conn));
}

#[test]
fn deleting_a_dog_cascades_to_every_dependent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    let asha = create_dog(
        &conn,
        &NewDog {
            name: "Asha".into(),
            sex: Sex::Female,
            breed: "Border Collie".into(),
            birthdate: "2021-03-14".into(),
            ..NewDog::default()
        },
    )
    .unwrap();
    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();
    assert_eq!(rex.sex, Sex::Male);
    assert_eq!(asha.breed, "Border Collie");

    let litter = create_mating(&conn, &mating(rex.id, asha.id, "2024-05-01")).unwrap();
    create_genetic_test(&conn, &genetic_test(asha.id, "PRA", "2023-01-10")).unwrap();
    create_vet_record(&conn, &vet_record(asha.id, "Rabies", "2024-02-02")).unwrap();
    create_vet_record(&conn, &vet_record(rex.id, "Annual exam", "2024-02-03")).unwrap();

    let counts = count_dependents(&conn, asha.id).unwrap();
    assert_eq!(counts.matings, 1);
    assert_eq!(counts.genetic_tests, 1);
    assert_eq!(counts.vet_records, 1);
    assert_eq!(counts.total(), 3);

    assert!(delete_dog(&conn, asha.id).unwrap());

    assert_eq!(fetch_dog(&conn, asha.id).unwrap(), None);
    assert_eq!(fetch_mating(&conn, litter.id).unwrap(), None);
    assert!(fetch_matings(&conn).unwrap().is_empty());
    assert!(fetch_genetic_tests(&conn, asha.id).unwrap().is_empty());
    assert!(fetch_vet_records(&conn, asha.id).unwrap().is_empty());

    assert_eq!(fetch_dogs(&conn).unwrap(), vec![rex.clone()]);
    assert_eq!(fetch_vet_records(&conn, rex.id).unwrap().len(), 1);
}

#[test]
fn mating_cascades_from_either_slot() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();
    let asha = create_dog(&conn, &dog("Asha", Sex::Female)).unwrap();
    let bella = create_dog(&conn, &dog("Bella", Sex::Female)).unwrap();

    let with_asha = create_mating(&conn, &mating(rex.id, asha.id, "2024-01-01")).unwrap();
    let with_bella = create_mating(&conn, &mating(rex.id, bella.id, "2024-02-01")).unwrap();

    delete_dog(&conn, bella.id).unwrap();
    assert_eq!(fetch_matings(&conn).unwrap(), vec![with_asha.clone()]);
    assert_eq!(fetch_mating(&conn, with_bella.id).unwrap(), None);

    delete_dog(&conn, rex.id).unwrap();
    assert!(fetch_matings(&conn).unwrap().is_empty());
    assert!(fetch_matings_for_dog(&conn, asha.id).unwrap().is_empty());
}

#[test]
fn matings_are_newest_first_with_id_tiebreak() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();
    let asha = create_dog(&conn, &dog("Asha", Sex::Female)).unwrap();
    let bella = create_dog(&conn, &dog("Bella", Sex::Female)).unwrap();

    let oldest = create_mating(&conn, &mating(rex.id, asha.id, "2023-06-01")).unwrap();
    let first_same_day = create_mating(&conn, &mating(rex.id, bella.id, "2024-03-01")).unwrap();
    let second_same_day = create_mating(&conn, &mating(rex.id, asha.id, "2024-03-01")).unwrap();

    let ids: Vec<i64> = fetch_matings(&conn).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![second_same_day.id, first_same_day.id, oldest.id]);

    let for_asha: Vec<i64> = fetch_matings_for_dog(&conn, asha.id)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(for_asha, vec![second_same_day.id, oldest.id]);

    let for_rex = fetch_matings_for_dog(&conn, rex.id).unwrap();
    assert_eq!(for_rex.len(), 3);
    assert!(for_rex.iter().all(|m| m.involves(rex.id)));
}

#[test]
fn dependent_lists_are_newest_first() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();
    let asha = create_dog(&conn, &dog("Asha", Sex::Female)).unwrap();

    let early = create_genetic_test(&conn, &genetic_test(asha.id, "PRA", "2022-01-01")).unwrap();
    let late = create_genetic_test(&conn, &genetic_test(asha.id, "CEA", "2023-01-01")).unwrap();
    let undated = create_genetic_test(&conn, &genetic_test(asha.id, "MDR1", "")).unwrap();
    let ids: Vec<i64> = fetch_genetic_tests(&conn, asha.id)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![late.id, early.id, undated.id]);

    let first = create_vet_record(&conn, &vet_record(asha.id, "Rabies", "2024-01-05")).unwrap();
    let second = create_vet_record(&conn, &vet_record(asha.id, "Booster", "2024-01-05")).unwrap();
    let ids: Vec<i64> = fetch_vet_records(&conn, asha.id)
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn dependents_for_missing_dog_are_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();
    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();

    let err = create_genetic_test(&conn, &genetic_test(999, "PRA", "2024-01-01")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { entity: "genetic test", .. }), "{err:?}");

    let err = create_vet_record(&conn, &vet_record(999, "Rabies", "2024-01-01")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { .. }), "{err:?}");

    let err = create_mating(&conn, &mating(rex.id, 999, "2024-01-01")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { .. }), "{err:?}");

    assert!(fetch_matings(&conn).unwrap().is_empty());
    assert!(fetch_genetic_tests(&conn, 999).unwrap().is_empty());
}

#[test]
fn missing_ids_are_reported_or_ignored() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    assert_eq!(fetch_dog(&conn, 42).unwrap(), None);
    assert_eq!(fetch_mating(&conn, 42).unwrap(), None);
    assert_eq!(fetch_genetic_test(&conn, 42).unwrap(), None);
    assert_eq!(fetch_vet_record(&conn, 42).unwrap(), None);

    let err = update_dog(&conn, 42, &dog("Ghost", Sex::Male)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "dog", id: 42 }), "{err:?}");

    assert!(!delete_dog(&conn, 42).unwrap());
    assert!(!delete_mating(&conn, 42).unwrap());
    assert!(!delete_genetic_test(&conn, 42).unwrap());
    assert!(!delete_vet_record(&conn, 42).unwrap());
}

#[test]
fn updates_replace_every_field() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    let asha = create_dog(
        &conn,
        &NewDog {
            name: "Asha".into(),
            registered_name: "Ch. Asha of the Hills".into(),
            sex: Sex::Female,
            color: "Black".into(),
            notes: "Shy with strangers".into(),
            ..NewDog::default()
        },
    )
    .unwrap();
    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();

    let replacement = NewDog {
        name: "Asha".into(),
        sex: Sex::Female,
        microchip: "985112003456789".into(),
        ..NewDog::default()
    };
    update_dog(&conn, asha.id, &replacement).unwrap();
    let stored = fetch_dog(&conn, asha.id).unwrap().unwrap();
    assert_eq!(stored.to_new(), replacement);
    assert!(stored.registered_name.is_empty());
    assert!(stored.notes.is_empty());

    let litter = create_mating(&conn, &mating(rex.id, asha.id, "2024-05-01")).unwrap();
    update_mating(&conn, litter.id, &mating(rex.id, asha.id, "2024-05-03")).unwrap();
    assert_eq!(fetch_mating(&conn, litter.id).unwrap().unwrap().date, "2024-05-03");

    let test = create_genetic_test(
        &conn,
        &NewGeneticTest {
            result: "Clear".into(),
            lab: "Optigen".into(),
            ..genetic_test(asha.id, "PRA", "2023-01-10")
        },
    )
    .unwrap();
    let retest = genetic_test(asha.id, "PRA-prcd", "2023-02-01");
    update_genetic_test(&conn, test.id, &retest).unwrap();
    assert_eq!(fetch_genetic_test(&conn, test.id).unwrap().unwrap().to_new(), retest);

    let record = create_vet_record(
        &conn,
        &NewVetRecord {
            kind: VetType::Vaccination,
            next_due_date: "2025-02-02".into(),
            ..vet_record(asha.id, "Rabies", "2024-02-02")
        },
    )
    .unwrap();
    assert_eq!(record.kind, VetType::Vaccination);
    let corrected = NewVetRecord {
        kind: VetType::Surgery,
        ..vet_record(asha.id, "Spay", "2024-02-02")
    };
    update_vet_record(&conn, record.id, &corrected).unwrap();
    let stored = fetch_vet_record(&conn, record.id).unwrap().unwrap();
    assert_eq!(stored.to_new(), corrected);
    assert!(stored.next_due_date.is_empty());
}

#[test]
fn vet_records_default_to_exam() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();
    let asha = create_dog(&conn, &dog("Asha", Sex::Female)).unwrap();

    let record = create_vet_record(&conn, &vet_record(asha.id, "Checkup", "2024-04-04")).unwrap();
    let stored = fetch_vet_record(&conn, record.id).unwrap().unwrap();
    assert_eq!(stored.kind, VetType::Exam);
}

#[test]
fn updates_report_broken_references_and_missing_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let conn = store.acquire().unwrap();

    let asha = create_dog(&conn, &dog("Asha", Sex::Female)).unwrap();
    let rex = create_dog(&conn, &dog("Rex", Sex::Male)).unwrap();
    assert_eq!((asha.id, rex.id), (1, 2));
    let litter = create_mating(&conn, &mating(rex.id, asha.id, "2024-05-01")).unwrap();
    assert_eq!(litter.id, 1);
    let test = create_genetic_test(&conn, &genetic_test(asha.id, "PRA", "2023-01-10")).unwrap();
    let record = create_vet_record(&conn, &vet_record(asha.id, "Rabies", "2024-02-02")).unwrap();

    let err = update_mating(&conn, litter.id, &mating(99, asha.id, "2024-05-01")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { entity: "mating", .. }), "{err:?}");
    let err = update_genetic_test(&conn, test.id, &genetic_test(99, "PRA", "")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { entity: "genetic test", .. }), "{err:?}");
    let err = update_vet_record(&conn, record.id, &vet_record(99, "Rabies", "2024-02-02")).unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation { entity: "vet record", .. }), "{err:?}");

    // Rejected updates leave the stored rows alone.
    assert_eq!(fetch_mating(&conn, litter.id).unwrap(), Some(litter.clone()));
    assert_eq!(fetch_genetic_test(&conn, test.id).unwrap(), Some(test));
    assert_eq!(fetch_vet_record(&conn, record.id).unwrap(), Some(record));

    let err = update_mating(&conn, 77, &mating(rex.id, asha.id, "2024-05-01")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "mating", id: 77 }), "{err:?}");
    let err = update_genetic_test(&conn, 77, &genetic_test(asha.id, "PRA", "")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "genetic test", id: 77 }), "{err:?}");
    let err = update_vet_record(&conn, 77, &vet_record(asha.id, "Rabies", "2024-02-02")).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "vet record", id: 77 }), "{err:?}");

    assert!(delete_dog(&conn, asha.id).unwrap());
    assert!(fetch_matings(&conn).unwrap().is_empty());
}
