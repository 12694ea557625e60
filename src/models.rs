//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. Stored records carry their primary key; the `New*` drafts carry the
//! same fields without one and are what inserts and full-replace updates take.
//! Optional text fields are plain `String`s that stay empty when unset.

use std::fmt;

/// Declared sex of a dog. Stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("Male"),
            Sex::Female => f.write_str("Female"),
        }
    }
}

/// Category of a veterinary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VetType {
    Vaccination,
    Deworming,
    #[default]
    Exam,
    Surgery,
    Other,
}

impl VetType {
    pub const ALL: [VetType; 5] = [
        VetType::Vaccination,
        VetType::Deworming,
        VetType::Exam,
        VetType::Surgery,
        VetType::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            VetType::Vaccination => "VACCINATION",
            VetType::Deworming => "DEWORMING",
            VetType::Exam => "EXAM",
            VetType::Surgery => "SURGERY",
            VetType::Other => "OTHER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for VetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VetType::Vaccination => "Vaccination",
            VetType::Deworming => "Deworming",
            VetType::Exam => "Exam",
            VetType::Surgery => "Surgery",
            VetType::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Field set of a dog profile, used for inserts and full-replace updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDog {
    /// Display nickname; the only field the forms insist on.
    pub name: String,
    /// Formal pedigree name.
    pub registered_name: String,
    pub sex: Sex,
    pub breed: String,
    /// `YYYY-MM-DD` or empty.
    pub birthdate: String,
    pub color: String,
    pub microchip: String,
    pub notes: String,
    /// Durable local path produced by the image store, or empty.
    pub image_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A dog profile as stored.
pub struct Dog {
    /// Primary key from the database. Edit/delete flows bubble it back to the
    /// persistence layer.
    pub id: i64,
    pub name: String,
    pub registered_name: String,
    pub sex: Sex,
    pub breed: String,
    pub birthdate: String,
    pub color: String,
    pub microchip: String,
    pub notes: String,
    pub image_uri: String,
}

impl Dog {
    pub fn from_new(id: i64, dog: NewDog) -> Self {
        Self {
            id,
            name: dog.name,
            registered_name: dog.registered_name,
            sex: dog.sex,
            breed: dog.breed,
            birthdate: dog.birthdate,
            color: dog.color,
            microchip: dog.microchip,
            notes: dog.notes,
            image_uri: dog.image_uri,
        }
    }

    /// Copy the editable fields back out, e.g. to seed an edit form.
    pub fn to_new(&self) -> NewDog {
        NewDog {
            name: self.name.clone(),
            registered_name: self.registered_name.clone(),
            sex: self.sex,
            breed: self.breed.clone(),
            birthdate: self.birthdate.clone(),
            color: self.color.clone(),
            microchip: self.microchip.clone(),
            notes: self.notes.clone(),
            image_uri: self.image_uri.clone(),
        }
    }

    /// `Nickname (Registered Name)`, omitting the parenthesis when the formal
    /// name is blank.
    pub fn display_name(&self) -> String {
        if self.registered_name.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.registered_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMating {
    pub male_dog_id: i64,
    pub female_dog_id: i64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A recorded mating between the dog in the male slot and the dog in the
/// female slot. Slots are not checked against the dogs' declared sex.
pub struct Mating {
    pub id: i64,
    pub male_dog_id: i64,
    pub female_dog_id: i64,
    pub date: String,
}

impl Mating {
    pub fn from_new(id: i64, mating: NewMating) -> Self {
        Self {
            id,
            male_dog_id: mating.male_dog_id,
            female_dog_id: mating.female_dog_id,
            date: mating.date,
        }
    }

    pub fn involves(&self, dog_id: i64) -> bool {
        self.male_dog_id == dog_id || self.female_dog_id == dog_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGeneticTest {
    pub dog_id: i64,
    pub test_name: String,
    pub result: String,
    pub lab: String,
    pub date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneticTest {
    pub id: i64,
    pub dog_id: i64,
    pub test_name: String,
    pub result: String,
    pub lab: String,
    pub date: String,
    pub notes: String,
}

impl GeneticTest {
    pub fn from_new(id: i64, test: NewGeneticTest) -> Self {
        Self {
            id,
            dog_id: test.dog_id,
            test_name: test.test_name,
            result: test.result,
            lab: test.lab,
            date: test.date,
            notes: test.notes,
        }
    }

    pub fn to_new(&self) -> NewGeneticTest {
        NewGeneticTest {
            dog_id: self.dog_id,
            test_name: self.test_name.clone(),
            result: self.result.clone(),
            lab: self.lab.clone(),
            date: self.date.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVetRecord {
    pub dog_id: i64,
    pub kind: VetType,
    pub title: String,
    pub date: String,
    /// Empty when no follow-up is scheduled.
    pub next_due_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetRecord {
    pub id: i64,
    pub dog_id: i64,
    pub kind: VetType,
    pub title: String,
    pub date: String,
    pub next_due_date: String,
    pub notes: String,
}

impl VetRecord {
    pub fn from_new(id: i64, record: NewVetRecord) -> Self {
        Self {
            id,
            dog_id: record.dog_id,
            kind: record.kind,
            title: record.title,
            date: record.date,
            next_due_date: record.next_due_date,
            notes: record.notes,
        }
    }

    pub fn to_new(&self) -> NewVetRecord {
        NewVetRecord {
            dog_id: self.dog_id,
            kind: self.kind,
            title: self.title.clone(),
            date: self.date.clone(),
            next_due_date: self.next_due_date.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// How many rows would disappear alongside a dog. Shown in the delete
/// confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependentCounts {
    pub matings: i64,
    pub genetic_tests: i64,
    pub vet_records: i64,
}

impl DependentCounts {
    pub fn total(&self) -> i64 {
        self.matings + self.genetic_tests + self.vet_records
    }
}
