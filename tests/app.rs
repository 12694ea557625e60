use crossterm::event::KeyCode;
use probreedics::db::{ensure_schema, fetch_dogs, fetch_matings, fetch_vet_records, StorageHandle};
use probreedics::models::{Sex, VetType};
use probreedics::{App, AppPaths, ImageStore};
use tempfile::TempDir;

fn start(dir: &TempDir) -> (App, AppPaths) {
    let paths = AppPaths::under(dir.path());
    let store = StorageHandle::at(&paths);
    ensure_schema(&store.acquire().unwrap()).unwrap();
    let app = App::new(store, ImageStore::new(&paths.image_dir)).unwrap();
    (app, paths)
}

fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(code).unwrap()
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        assert!(!press(app, KeyCode::Char(ch)));
    }
}

#[test]
fn quick_add_record_and_delete_through_the_keyboard() {
    let dir = TempDir::new().unwrap();
    let (mut app, paths) = start(&dir);
    let reader = StorageHandle::at(&paths);

    press(&mut app, KeyCode::Char('+'));
    type_text(&mut app, "Asha");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Right);
    assert!(!press(&mut app, KeyCode::Enter));

    let dogs = fetch_dogs(&reader.acquire().unwrap()).unwrap();
    assert_eq!(dogs.len(), 1);
    assert_eq!(dogs[0].name, "Asha");
    assert_eq!(dogs[0].sex, Sex::Female);
    let asha = dogs[0].id;

    // Dog page, Vet tab, new record.
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Char('+'));
    press(&mut app, KeyCode::Down);
    type_text(&mut app, "Rabies");
    press(&mut app, KeyCode::Down);
    type_text(&mut app, "20240202");
    press(&mut app, KeyCode::Enter);

    let records = fetch_vet_records(&reader.acquire().unwrap(), asha).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Rabies");
    assert_eq!(records[0].date, "2024-02-02");
    assert_eq!(records[0].kind, VetType::Exam);

    // Back to the list, then delete with confirmation.
    assert!(!press(&mut app, KeyCode::Esc));
    press(&mut app, KeyCode::Char('-'));
    press(&mut app, KeyCode::Char('y'));

    let conn = reader.acquire().unwrap();
    assert!(fetch_dogs(&conn).unwrap().is_empty());
    assert!(fetch_vet_records(&conn, asha).unwrap().is_empty());
    drop(conn);

    assert!(press(&mut app, KeyCode::Char('q')));
}

#[test]
fn rejected_forms_stay_open_and_save_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut app, paths) = start(&dir);
    let reader = StorageHandle::at(&paths);

    press(&mut app, KeyCode::Char('+'));
    // Nickname is required, so Enter keeps the form open.
    assert!(!press(&mut app, KeyCode::Enter));
    type_text(&mut app, "Rex");
    assert!(!press(&mut app, KeyCode::Enter));
    assert_eq!(fetch_dogs(&reader.acquire().unwrap()).unwrap().len(), 1);

    // A mating with an incomplete date is refused.
    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::Char('+'));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    for _ in 0..10 {
        press(&mut app, KeyCode::Backspace);
    }
    type_text(&mut app, "202405");
    assert!(!press(&mut app, KeyCode::Enter));
    assert!(fetch_matings(&reader.acquire().unwrap()).unwrap().is_empty());

    // Esc discards the form first, then leaves the matings screen.
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(!press(&mut app, KeyCode::Esc));
    assert!(press(&mut app, KeyCode::Esc));
}
