use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::date_mask::{is_full_valid, mask_date, DateMaskError};
use crate::models::{
    DependentCounts, Dog, GeneticTest, Mating, NewDog, NewGeneticTest, NewMating, NewVetRecord,
    Sex, VetRecord, VetType,
};

const NICKNAME: &str = "Nickname";
const REGISTERED_NAME: &str = "Registered name";
const SEX: &str = "Sex";
const BREED: &str = "Breed";
const BIRTHDATE: &str = "Birthdate";
const COLOR: &str = "Color";
const MICROCHIP: &str = "Microchip";
const NOTES: &str = "Notes";
const PHOTO: &str = "Photo";
const MALE: &str = "Male";
const FEMALE: &str = "Female";
const DATE: &str = "Date";
const TEST_NAME: &str = "Test name";
const RESULT: &str = "Result";
const LAB: &str = "Lab";
const TYPE: &str = "Type";
const TITLE: &str = "Title";
const NEXT_DUE: &str = "Next due";

/// Input behaviour of a single form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Text,
    /// Masked on every keystroke; `error` is the mask's verdict.
    Date { error: Option<DateMaskError> },
    /// Cycled with the arrow keys.
    Choice { options: Vec<String>, selected: usize },
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
}

impl Field {
    fn text(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
            kind: FieldKind::Text,
            required: false,
        }
    }

    fn date(label: &'static str, value: &str) -> Self {
        let masked = mask_date(value);
        Self {
            label,
            value: masked.value,
            kind: FieldKind::Date {
                error: masked.error,
            },
            required: false,
        }
    }

    fn choice(label: &'static str, options: Vec<String>, selected: usize) -> Self {
        let selected = selected.min(options.len().saturating_sub(1));
        Self {
            label,
            value: String::new(),
            kind: FieldKind::Choice { options, selected },
            required: false,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn push_char(&mut self, ch: char) -> bool {
        match &mut self.kind {
            FieldKind::Text => {
                if ch.is_control() {
                    return false;
                }
                self.value.push(ch);
                true
            }
            FieldKind::Date { error } => {
                let before = self.value.len();
                self.value.push(ch);
                let masked = mask_date(&self.value);
                self.value = masked.value;
                *error = masked.error;
                self.value.len() != before
            }
            FieldKind::Choice { .. } => false,
        }
    }

    fn backspace(&mut self) {
        match &mut self.kind {
            FieldKind::Text => {
                self.value.pop();
            }
            FieldKind::Date { error } => {
                self.value.pop();
                let masked = mask_date(&self.value);
                self.value = masked.value;
                *error = masked.error;
            }
            FieldKind::Choice { .. } => {}
        }
    }

    fn cycle(&mut self, delta: isize) {
        if let FieldKind::Choice { options, selected } = &mut self.kind {
            if options.is_empty() {
                return;
            }
            let len = options.len() as isize;
            *selected = (*selected as isize + delta).rem_euclid(len) as usize;
        }
    }

    fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Choice { options, selected } => options
                .get(*selected)
                .map(|option| format!("< {option} >"))
                .unwrap_or_else(|| "<none>".to_string()),
            _ => self.value.clone(),
        }
    }
}

/// Which record a form creates or replaces once saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormTarget {
    QuickDog,
    NewDog,
    EditDog { id: i64 },
    /// `dog_ids` lines up with the options of both dog choice fields.
    NewMating { dog_ids: Vec<i64> },
    EditMating { id: i64, dog_ids: Vec<i64> },
    NewGeneticTest { dog_id: i64 },
    EditGeneticTest { id: i64, dog_id: i64 },
    NewVetRecord { dog_id: i64 },
    EditVetRecord { id: i64, dog_id: i64 },
}

/// Form state shared by every add/edit dialog.
#[derive(Clone, Debug)]
pub(crate) struct RecordForm {
    pub(crate) target: FormTarget,
    pub(crate) fields: Vec<Field>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl RecordForm {
    fn new(target: FormTarget, fields: Vec<Field>) -> Self {
        Self {
            target,
            fields,
            active: 0,
            error: None,
        }
    }

    /// Nickname, sex and photo only.
    pub(crate) fn quick_dog() -> Self {
        Self::new(
            FormTarget::QuickDog,
            vec![
                Field::text(NICKNAME, "").required(),
                sex_field(Sex::Male),
                Field::text(PHOTO, ""),
            ],
        )
    }

    pub(crate) fn new_dog() -> Self {
        Self::new(FormTarget::NewDog, dog_fields(&NewDog::default()))
    }

    pub(crate) fn edit_dog(dog: &Dog) -> Self {
        Self::new(FormTarget::EditDog { id: dog.id }, dog_fields(&dog.to_new()))
    }

    /// A blank mating dated `today`. When opened from a dog's page that dog
    /// is preselected in the slot matching its sex.
    pub(crate) fn new_mating(dogs: &[Dog], today: &str, preset: Option<&Dog>) -> Self {
        let first_of = |sex: Sex| dogs.iter().position(|dog| dog.sex == sex).unwrap_or(0);
        let mut male = first_of(Sex::Male);
        let mut female = first_of(Sex::Female);
        if let Some(dog) = preset {
            if let Some(idx) = dogs.iter().position(|candidate| candidate.id == dog.id) {
                match dog.sex {
                    Sex::Male => male = idx,
                    Sex::Female => female = idx,
                }
            }
        }
        Self::new(
            FormTarget::NewMating {
                dog_ids: dogs.iter().map(|dog| dog.id).collect(),
            },
            mating_fields(dogs, male, female, today),
        )
    }

    pub(crate) fn edit_mating(mating: &Mating, dogs: &[Dog]) -> Self {
        let index_of = |id: i64| dogs.iter().position(|dog| dog.id == id).unwrap_or(0);
        Self::new(
            FormTarget::EditMating {
                id: mating.id,
                dog_ids: dogs.iter().map(|dog| dog.id).collect(),
            },
            mating_fields(
                dogs,
                index_of(mating.male_dog_id),
                index_of(mating.female_dog_id),
                &mating.date,
            ),
        )
    }

    pub(crate) fn new_genetic_test(dog_id: i64) -> Self {
        Self::new(
            FormTarget::NewGeneticTest { dog_id },
            genetic_test_fields(&NewGeneticTest::default()),
        )
    }

    pub(crate) fn edit_genetic_test(test: &GeneticTest) -> Self {
        Self::new(
            FormTarget::EditGeneticTest {
                id: test.id,
                dog_id: test.dog_id,
            },
            genetic_test_fields(&test.to_new()),
        )
    }

    pub(crate) fn new_vet_record(dog_id: i64) -> Self {
        Self::new(
            FormTarget::NewVetRecord { dog_id },
            vet_record_fields(&NewVetRecord::default()),
        )
    }

    pub(crate) fn edit_vet_record(record: &VetRecord) -> Self {
        Self::new(
            FormTarget::EditVetRecord {
                id: record.id,
                dog_id: record.dog_id,
            },
            vet_record_fields(&record.to_new()),
        )
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.target {
            FormTarget::QuickDog => "Quick Add Dog",
            FormTarget::NewDog => "Add Dog",
            FormTarget::EditDog { .. } => "Edit Dog",
            FormTarget::NewMating { .. } => "Add Mating",
            FormTarget::EditMating { .. } => "Edit Mating",
            FormTarget::NewGeneticTest { .. } => "Add Genetic Test",
            FormTarget::EditGeneticTest { .. } => "Edit Genetic Test",
            FormTarget::NewVetRecord { .. } => "Add Veterinary Record",
            FormTarget::EditVetRecord { .. } => "Edit Veterinary Record",
        }
    }

    pub(crate) fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub(crate) fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Feed a character to the active field. Returns whether it changed.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.fields.get_mut(self.active) {
            Some(field) => field.push_char(ch),
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.backspace();
        }
    }

    /// Step the active choice field; other fields ignore it.
    pub(crate) fn cycle_choice(&mut self, delta: isize) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.cycle(delta);
        }
    }

    pub(crate) fn active_is_choice(&self) -> bool {
        matches!(
            self.fields.get(self.active).map(|field| &field.kind),
            Some(FieldKind::Choice { .. })
        )
    }

    /// Trimmed value of a text or date field; empty when the form lacks it.
    pub(crate) fn value(&self, label: &str) -> String {
        self.field(label)
            .map(|field| field.value.trim().to_string())
            .unwrap_or_default()
    }

    fn choice_index(&self, label: &str) -> Option<usize> {
        match self.field(label).map(|field| &field.kind) {
            Some(FieldKind::Choice { options, selected }) if !options.is_empty() => {
                Some(*selected)
            }
            _ => None,
        }
    }

    fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.label == label)
    }

    /// Required fields must be filled; dates must be empty or a real day.
    fn validate(&self) -> Result<()> {
        for field in &self.fields {
            let value = field.value.trim();
            let is_choice = matches!(field.kind, FieldKind::Choice { .. });
            if field.required && !is_choice && value.is_empty() {
                return Err(anyhow!("{} is required.", field.label));
            }
            if matches!(field.kind, FieldKind::Date { .. })
                && !value.is_empty()
                && !is_full_valid(value)
            {
                return Err(anyhow!("{} is not a valid date.", field.label));
            }
        }
        Ok(())
    }

    /// Validate and collect a dog. `image_uri` holds the photo path as typed;
    /// the caller swaps in the durable copy.
    pub(crate) fn parse_dog(&self) -> Result<NewDog> {
        self.validate()?;
        let sex = self
            .choice_index(SEX)
            .and_then(|idx| Sex::ALL.get(idx).copied())
            .unwrap_or_default();
        Ok(NewDog {
            name: self.value(NICKNAME),
            registered_name: self.value(REGISTERED_NAME),
            sex,
            breed: self.value(BREED),
            birthdate: self.value(BIRTHDATE),
            color: self.value(COLOR),
            microchip: self.value(MICROCHIP),
            notes: self.value(NOTES),
            image_uri: self.value(PHOTO),
        })
    }

    pub(crate) fn parse_mating(&self) -> Result<NewMating> {
        self.validate()?;
        let dog_ids = match &self.target {
            FormTarget::NewMating { dog_ids } | FormTarget::EditMating { dog_ids, .. } => dog_ids,
            _ => return Err(anyhow!("This form does not describe a mating.")),
        };
        let pick = |label: &str| {
            self.choice_index(label)
                .and_then(|idx| dog_ids.get(idx).copied())
                .ok_or_else(|| anyhow!("{label} is required."))
        };
        Ok(NewMating {
            male_dog_id: pick(MALE)?,
            female_dog_id: pick(FEMALE)?,
            date: self.value(DATE),
        })
    }

    pub(crate) fn parse_genetic_test(&self) -> Result<NewGeneticTest> {
        self.validate()?;
        let dog_id = match self.target {
            FormTarget::NewGeneticTest { dog_id } | FormTarget::EditGeneticTest { dog_id, .. } => {
                dog_id
            }
            _ => return Err(anyhow!("This form does not describe a genetic test.")),
        };
        Ok(NewGeneticTest {
            dog_id,
            test_name: self.value(TEST_NAME),
            result: self.value(RESULT),
            lab: self.value(LAB),
            date: self.value(DATE),
            notes: self.value(NOTES),
        })
    }

    pub(crate) fn parse_vet_record(&self) -> Result<NewVetRecord> {
        self.validate()?;
        let dog_id = match self.target {
            FormTarget::NewVetRecord { dog_id } | FormTarget::EditVetRecord { dog_id, .. } => {
                dog_id
            }
            _ => return Err(anyhow!("This form does not describe a vet record.")),
        };
        let kind = self
            .choice_index(TYPE)
            .and_then(|idx| VetType::ALL.get(idx).copied())
            .unwrap_or_default();
        Ok(NewVetRecord {
            dog_id,
            kind,
            title: self.value(TITLE),
            date: self.value(DATE),
            next_due_date: self.value(NEXT_DUE),
            notes: self.value(NOTES),
        })
    }

    /// One rendered line per field, highlighting the active one.
    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let is_active = idx == self.active;
                let display = field.display_value();
                let empty = display.is_empty();
                let shown = match (empty, field.required) {
                    (true, true) => "<required>".to_string(),
                    (true, false) => String::new(),
                    (false, _) => display,
                };
                let style = if is_active {
                    Style::default().fg(Color::Yellow)
                } else if empty {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default()
                };

                let mut spans = vec![
                    Span::raw(field_prefix(field)),
                    Span::styled(shown, style),
                ];
                if let FieldKind::Date { error: Some(error) } = &field.kind {
                    spans.push(Span::styled(
                        format!("  {error}"),
                        Style::default().fg(Color::Red),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }

    /// Cursor position relative to the form's inner area, or `None` when the
    /// active field is a choice.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        let field = self.fields.get(self.active)?;
        if matches!(field.kind, FieldKind::Choice { .. }) {
            return None;
        }
        let x = field_prefix(field).chars().count() + field.value.chars().count();
        Some((x as u16, self.active as u16))
    }
}

fn field_prefix(field: &Field) -> String {
    if field.required {
        format!("{} *: ", field.label)
    } else {
        format!("{}: ", field.label)
    }
}

fn sex_field(sex: Sex) -> Field {
    let selected = Sex::ALL.iter().position(|option| *option == sex).unwrap_or(0);
    Field::choice(
        SEX,
        Sex::ALL.iter().map(ToString::to_string).collect(),
        selected,
    )
}

fn dog_fields(dog: &NewDog) -> Vec<Field> {
    vec![
        Field::text(NICKNAME, &dog.name).required(),
        Field::text(REGISTERED_NAME, &dog.registered_name),
        sex_field(dog.sex),
        Field::text(BREED, &dog.breed),
        Field::date(BIRTHDATE, &dog.birthdate),
        Field::text(COLOR, &dog.color),
        Field::text(MICROCHIP, &dog.microchip),
        Field::text(NOTES, &dog.notes),
        Field::text(PHOTO, &dog.image_uri),
    ]
}

fn mating_fields(dogs: &[Dog], male: usize, female: usize, date: &str) -> Vec<Field> {
    let names: Vec<String> = dogs
        .iter()
        .map(|dog| format!("{} #{}", dog.name, dog.id))
        .collect();
    vec![
        Field::choice(MALE, names.clone(), male).required(),
        Field::choice(FEMALE, names, female).required(),
        Field::date(DATE, date).required(),
    ]
}

fn genetic_test_fields(test: &NewGeneticTest) -> Vec<Field> {
    vec![
        Field::text(TEST_NAME, &test.test_name).required(),
        Field::text(RESULT, &test.result),
        Field::text(LAB, &test.lab),
        Field::date(DATE, &test.date),
        Field::text(NOTES, &test.notes),
    ]
}

fn vet_record_fields(record: &NewVetRecord) -> Vec<Field> {
    let selected = VetType::ALL
        .iter()
        .position(|kind| *kind == record.kind)
        .unwrap_or(0);
    vec![
        Field::choice(
            TYPE,
            VetType::ALL.iter().map(ToString::to_string).collect(),
            selected,
        ),
        Field::text(TITLE, &record.title).required(),
        Field::date(DATE, &record.date).required(),
        Field::date(NEXT_DUE, &record.next_due_date),
        Field::text(NOTES, &record.notes),
    ]
}

/// A delete waiting for the user to confirm.
#[derive(Clone, Debug)]
pub(crate) enum PendingDelete {
    Dog { dog: Dog, counts: DependentCounts },
    Mating { id: i64, summary: String },
    GeneticTest { id: i64, summary: String },
    VetRecord { id: i64, summary: String },
}

impl PendingDelete {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            PendingDelete::Dog { .. } => "Delete Dog",
            PendingDelete::Mating { .. } => "Delete Mating",
            PendingDelete::GeneticTest { .. } => "Delete Genetic Test",
            PendingDelete::VetRecord { .. } => "Delete Veterinary Record",
        }
    }

    pub(crate) fn prompt_lines(&self) -> Vec<Line<'static>> {
        let mut lines = match self {
            PendingDelete::Dog { dog, counts } => {
                let mut lines = vec![Line::from(format!("Remove \"{}\"?", dog.name))];
                if counts.total() > 0 {
                    lines.push(Line::from(format!(
                        "This also removes {} mating(s), {} genetic test(s) and {} vet record(s).",
                        counts.matings, counts.genetic_tests, counts.vet_records
                    )));
                }
                lines
            }
            PendingDelete::Mating { summary, .. }
            | PendingDelete::GeneticTest { summary, .. }
            | PendingDelete::VetRecord { summary, .. } => {
                vec![Line::from(format!("Remove {summary}?"))]
            }
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));
        lines
    }
}
