use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{fetch_genetic_tests, fetch_matings, fetch_matings_for_dog, fetch_vet_records};
use crate::models::{Dog, GeneticTest, Mating, VetRecord};

use super::helpers::step_index;

/// Sections of a dog's page, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DogTab {
    Genetics,
    Vet,
    Matings,
}

impl DogTab {
    pub(crate) const ALL: [DogTab; 3] = [DogTab::Genetics, DogTab::Vet, DogTab::Matings];

    pub(crate) fn label(self) -> &'static str {
        match self {
            DogTab::Genetics => "Genetics",
            DogTab::Vet => "Vet records",
            DogTab::Matings => "Matings",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            DogTab::Genetics => 0,
            DogTab::Vet => 1,
            DogTab::Matings => 2,
        }
    }
}

/// Everything shown on one dog's page.
pub(crate) struct DogScreen {
    pub(crate) dog: Dog,
    pub(crate) tab: DogTab,
    pub(crate) genetic_tests: Vec<GeneticTest>,
    pub(crate) vet_records: Vec<VetRecord>,
    pub(crate) matings: Vec<Mating>,
    pub(crate) selected: usize,
}

impl DogScreen {
    pub(crate) fn load(conn: &Connection, dog: Dog) -> Result<Self> {
        let mut screen = Self {
            dog,
            tab: DogTab::Genetics,
            genetic_tests: Vec::new(),
            vet_records: Vec::new(),
            matings: Vec::new(),
            selected: 0,
        };
        screen.reload(conn, None)?;
        Ok(screen)
    }

    /// Re-read the dependent lists, optionally replacing the profile too.
    pub(crate) fn reload(&mut self, conn: &Connection, dog: Option<Dog>) -> Result<()> {
        if let Some(dog) = dog {
            self.dog = dog;
        }
        self.genetic_tests =
            fetch_genetic_tests(conn, self.dog.id).context("failed to load genetic tests")?;
        self.vet_records =
            fetch_vet_records(conn, self.dog.id).context("failed to load vet records")?;
        self.matings =
            fetch_matings_for_dog(conn, self.dog.id).context("failed to load matings")?;
        self.ensure_in_bounds();
        Ok(())
    }

    pub(crate) fn cycle_tab(&mut self, delta: isize) {
        let len = DogTab::ALL.len() as isize;
        let next = (self.tab.index() as isize + delta).rem_euclid(len) as usize;
        self.tab = DogTab::ALL[next];
        self.selected = 0;
    }

    pub(crate) fn len(&self) -> usize {
        match self.tab {
            DogTab::Genetics => self.genetic_tests.len(),
            DogTab::Vet => self.vet_records.len(),
            DogTab::Matings => self.matings.len(),
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_index(self.selected, self.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.len().saturating_sub(1);
    }

    pub(crate) fn current_genetic_test(&self) -> Option<&GeneticTest> {
        match self.tab {
            DogTab::Genetics => self.genetic_tests.get(self.selected),
            _ => None,
        }
    }

    pub(crate) fn current_vet_record(&self) -> Option<&VetRecord> {
        match self.tab {
            DogTab::Vet => self.vet_records.get(self.selected),
            _ => None,
        }
    }

    pub(crate) fn current_mating(&self) -> Option<&Mating> {
        match self.tab {
            DogTab::Matings => self.matings.get(self.selected),
            _ => None,
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.len() {
            self.selected = self.len().saturating_sub(1);
        }
    }
}

/// Every mating in the kennel, most recent first.
pub(crate) struct MatingScreen {
    pub(crate) matings: Vec<Mating>,
    pub(crate) selected: usize,
}

impl MatingScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let mut screen = Self {
            matings: Vec::new(),
            selected: 0,
        };
        screen.reload(conn)?;
        Ok(screen)
    }

    pub(crate) fn reload(&mut self, conn: &Connection) -> Result<()> {
        self.matings = fetch_matings(conn).context("failed to load matings")?;
        if self.selected >= self.matings.len() {
            self.selected = self.matings.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn current_mating(&self) -> Option<&Mating> {
        self.matings.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_index(self.selected, self.matings.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.matings.len().saturating_sub(1);
    }
}
