use std::mem;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::db::{
    count_dependents, create_dog, create_genetic_test, create_mating, create_vet_record,
    delete_dog, delete_genetic_test, delete_mating, delete_vet_record, fetch_dog, fetch_dogs,
    update_dog, update_genetic_test, update_mating, update_vet_record, StorageHandle,
};
use crate::images::ImageStore;
use crate::models::{Dog, Mating, NewDog};

use super::forms::{FormTarget, PendingDelete, RecordForm};
use super::helpers::{centered_rect, or_dash, step_index, surface_error, today};
use super::screens::{DogScreen, DogTab, MatingScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width share of the dog list on the home screen.
const DOG_LIST_PERCENT: u16 = 40;

/// High-level navigation states.
enum Screen {
    Dogs,
    Dog(DogScreen),
    Matings(MatingScreen),
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    Editing(RecordForm),
    ConfirmDelete(PendingDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: StorageHandle,
    images: ImageStore,
    dogs: Vec<Dog>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app around an opened store whose schema is in place.
    pub fn new(store: StorageHandle, images: ImageStore) -> Result<Self> {
        let dogs = fetch_dogs(&*store.acquire()?).context("failed to load dogs")?;
        info!(dogs = dogs.len(), "loaded kennel");
        Ok(Self {
            store,
            images,
            dogs,
            selected: 0,
            screen: Screen::Dogs,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Editing(form) => self.handle_form(code, form)?,
            Mode::ConfirmDelete(pending) => self.handle_confirm_delete(code, pending)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Dogs => self.handle_dogs_key(code, exit),
            Screen::Dog(_) => self.handle_dog_key(code, exit),
            Screen::Matings(_) => self.handle_matings_key(code, exit),
        }
    }

    fn handle_dogs_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.move_dog_selection(-1),
            KeyCode::Down => self.move_dog_selection(1),
            KeyCode::PageUp => self.move_dog_selection(-5),
            KeyCode::PageDown => self.move_dog_selection(5),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.dogs.len().saturating_sub(1),
            KeyCode::Enter => match self.current_dog().cloned() {
                Some(dog) => {
                    self.clear_status();
                    self.open_dog(dog)?;
                }
                None => self.set_status("No dog selected.", StatusKind::Error),
            },
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::Editing(RecordForm::quick_dog()));
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Editing(RecordForm::new_dog()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match self.current_dog() {
                Some(dog) => return Ok(Mode::Editing(RecordForm::edit_dog(dog))),
                None => self.set_status("No dog selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match self.current_dog().cloned() {
                Some(dog) => return self.confirm_dog_delete(dog),
                None => self.set_status("No dog selected to remove.", StatusKind::Error),
            },
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.clear_status();
                self.open_matings()?;
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_dog_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Dog(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                let focus = screen.dog.id;
                self.clear_status();
                self.screen = Screen::Dogs;
                self.reload_dogs(Some(focus))?;
            }
            KeyCode::Tab | KeyCode::Right => screen.cycle_tab(1),
            KeyCode::BackTab | KeyCode::Left => screen.cycle_tab(-1),
            KeyCode::Up => screen.move_selection(-1),
            KeyCode::Down => screen.move_selection(1),
            KeyCode::PageUp => screen.move_selection(-5),
            KeyCode::PageDown => screen.move_selection(5),
            KeyCode::Home => screen.select_first(),
            KeyCode::End => screen.select_last(),
            KeyCode::Char('+') => {
                let dog_id = screen.dog.id;
                let form = match screen.tab {
                    DogTab::Genetics => RecordForm::new_genetic_test(dog_id),
                    DogTab::Vet => RecordForm::new_vet_record(dog_id),
                    DogTab::Matings => {
                        RecordForm::new_mating(&self.dogs, &today(), Some(&screen.dog))
                    }
                };
                return Ok(Mode::Editing(form));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                let form = match screen.tab {
                    DogTab::Genetics => screen
                        .current_genetic_test()
                        .map(RecordForm::edit_genetic_test),
                    DogTab::Vet => screen.current_vet_record().map(RecordForm::edit_vet_record),
                    DogTab::Matings => screen
                        .current_mating()
                        .map(|mating| RecordForm::edit_mating(mating, &self.dogs)),
                };
                match form {
                    Some(form) => return Ok(Mode::Editing(form)),
                    None => self.set_status("Nothing selected to edit.", StatusKind::Error),
                }
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                return Ok(Mode::Editing(RecordForm::edit_dog(&screen.dog)));
            }
            KeyCode::Char('-') => {
                let pending = match screen.tab {
                    DogTab::Genetics => {
                        screen
                            .current_genetic_test()
                            .map(|test| PendingDelete::GeneticTest {
                                id: test.id,
                                summary: format!("the {} test", test.test_name),
                            })
                    }
                    DogTab::Vet => {
                        screen
                            .current_vet_record()
                            .map(|record| PendingDelete::VetRecord {
                                id: record.id,
                                summary: format!("the vet record \"{}\"", record.title),
                            })
                    }
                    DogTab::Matings => screen.current_mating().map(|mating| {
                        PendingDelete::Mating {
                            id: mating.id,
                            summary: mating_summary(&self.dogs, mating),
                        }
                    }),
                };
                match pending {
                    Some(pending) => return Ok(Mode::ConfirmDelete(pending)),
                    None => self.set_status("Nothing selected to remove.", StatusKind::Error),
                }
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let image = screen.dog.image_uri.trim().to_string();
                if image.is_empty() {
                    self.set_status("This dog does not have a photo.", StatusKind::Error);
                } else if let Err(err) = open_path(&image) {
                    warn!(%err, image = %image, "failed to open photo");
                    self.set_status(format!("Failed to open photo: {err}"), StatusKind::Error);
                } else {
                    self.set_status("Opened photo.", StatusKind::Info);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_matings_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Matings(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('M') => {
                self.clear_status();
                self.screen = Screen::Dogs;
            }
            KeyCode::Up => screen.move_selection(-1),
            KeyCode::Down => screen.move_selection(1),
            KeyCode::PageUp => screen.move_selection(-5),
            KeyCode::PageDown => screen.move_selection(5),
            KeyCode::Home => screen.select_first(),
            KeyCode::End => screen.select_last(),
            KeyCode::Char('+') => {
                if self.dogs.is_empty() {
                    self.set_status("Add a dog before recording a mating.", StatusKind::Error);
                } else {
                    return Ok(Mode::Editing(RecordForm::new_mating(
                        &self.dogs,
                        &today(),
                        None,
                    )));
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match screen.current_mating() {
                Some(mating) => {
                    return Ok(Mode::Editing(RecordForm::edit_mating(mating, &self.dogs)))
                }
                None => self.set_status("No mating selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match screen.current_mating() {
                Some(mating) => {
                    return Ok(Mode::ConfirmDelete(PendingDelete::Mating {
                        id: mating.id,
                        summary: mating_summary(&self.dogs, mating),
                    }))
                }
                None => self.set_status("No mating selected to remove.", StatusKind::Error),
            },
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_form(&mut self, code: KeyCode, mut form: RecordForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Changes discarded.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left if form.active_is_choice() => form.cycle_choice(-1),
            KeyCode::Right if form.active_is_choice() => form.cycle_choice(1),
            KeyCode::Char(' ') if form.active_is_choice() => form.cycle_choice(1),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => match self.save_form(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = format!("Cannot save: {}", surface_error(&err));
                    warn!(error = %err, "save failed");
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Editing(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, pending: PendingDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&pending) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(pending))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(pending)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Dogs => self.draw_dogs(frame, content_area),
            Screen::Dog(screen) => self.draw_dog_screen(frame, content_area, screen),
            Screen::Matings(screen) => self.draw_matings(frame, content_area, screen),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Editing(form) => self.draw_form(frame, area, form),
            Mode::ConfirmDelete(pending) => self.draw_confirm(frame, area, pending),
            Mode::Normal => {}
        }
    }

    fn draw_dogs(&self, frame: &mut Frame, area: Rect) {
        if self.dogs.is_empty() {
            let message = Paragraph::new("No dogs yet. Press '+' for a quick add or 'a' for a full profile.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(DOG_LIST_PERCENT),
                Constraint::Percentage(100 - DOG_LIST_PERCENT),
            ])
            .split(area);

        let items: Vec<ListItem> = self
            .dogs
            .iter()
            .map(|dog| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", dog.sex.code()),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(dog.display_name()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Dogs"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        if let Some(dog) = self.current_dog() {
            let profile = Paragraph::new(profile_lines(dog))
                .block(Block::default().borders(Borders::ALL).title("Profile"))
                .wrap(Wrap { trim: true });
            frame.render_widget(profile, chunks[1]);
        }
    }

    fn draw_dog_screen(&self, frame: &mut Frame, area: Rect, screen: &DogScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let titles: Vec<Line> = DogTab::ALL.iter().map(|tab| Line::from(tab.label())).collect();
        let tabs = Tabs::new(titles)
            .select(screen.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(screen.dog.display_name()),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let rows: Vec<ListItem> = match screen.tab {
            DogTab::Genetics => screen
                .genetic_tests
                .iter()
                .map(|test| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                format!("{:<10} ", or_dash(&test.date)),
                                Style::default().fg(Color::Cyan),
                            ),
                            Span::styled(
                                test.test_name.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(format!("  {}", or_dash(&test.result))),
                        ]),
                        Line::from(Span::styled(
                            format!("           lab: {}  {}", or_dash(&test.lab), test.notes),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect(),
            DogTab::Vet => screen
                .vet_records
                .iter()
                .map(|record| {
                    let due = if record.next_due_date.is_empty() {
                        String::new()
                    } else {
                        format!("  next due {}", record.next_due_date)
                    };
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(
                                format!("{:<10} ", record.date),
                                Style::default().fg(Color::Cyan),
                            ),
                            Span::styled(
                                format!("[{}] ", record.kind),
                                Style::default().fg(Color::Magenta),
                            ),
                            Span::styled(
                                record.title.clone(),
                                Style::default().add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(due, Style::default().fg(Color::Yellow)),
                        ]),
                        Line::from(Span::styled(
                            format!("           {}", record.notes),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect(),
            DogTab::Matings => screen
                .matings
                .iter()
                .map(|mating| ListItem::new(self.mating_line(mating)))
                .collect(),
        };

        if rows.is_empty() {
            let message = Paragraph::new(format!(
                "No {} recorded. Press '+' to add one.",
                screen.tab.label().to_lowercase()
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let list = List::new(rows)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(screen.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_matings(&self, frame: &mut Frame, area: Rect, screen: &MatingScreen) {
        let block = Block::default().borders(Borders::ALL).title("Matings");
        if screen.matings.is_empty() {
            let message = Paragraph::new("No matings recorded. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = screen
            .matings
            .iter()
            .map(|mating| ListItem::new(self.mating_line(mating)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(screen.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Editing(_)) => &[
                ("[Tab]", " Next field   "),
                ("[←→]", " Choose   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmDelete(_)) => &[("[Y]", " Delete   "), ("[N]", " Keep")],
            (Screen::Dogs, Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Open   "),
                ("[+]", " Quick add   "),
                ("[a]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[m]", " Matings   "),
                ("[q]", " Quit"),
            ],
            (Screen::Dog(_), Mode::Normal) => &[
                ("[Tab]", " Section   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[p]", " Profile   "),
                ("[o]", " Photo   "),
                ("[Esc]", " Back"),
            ],
            (Screen::Matings(_), Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[Esc]", " Back"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &RecordForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.build_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • ←/→ to choose • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if let Some((x, y)) = form.cursor_offset() {
            frame.set_cursor_position((
                (inner.x + x).min(inner.right().saturating_sub(1)),
                inner.y + y,
            ));
        }
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, pending: &PendingDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(pending.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let paragraph = Paragraph::new(pending.prompt_lines())
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Persist the form's record. Any error leaves the store untouched and
    /// the form open.
    fn save_form(&mut self, form: &RecordForm) -> Result<()> {
        let mut focus_dog = None;
        let message = match &form.target {
            FormTarget::QuickDog | FormTarget::NewDog => {
                let dog = self.with_durable_photo(form.parse_dog()?)?;
                let dog = create_dog(&*self.store.acquire()?, &dog)?;
                focus_dog = Some(dog.id);
                format!("Added {}.", dog.name)
            }
            FormTarget::EditDog { id } => {
                let dog = self.with_durable_photo(form.parse_dog()?)?;
                update_dog(&*self.store.acquire()?, *id, &dog)
                    .context("failed to update dog")?;
                focus_dog = Some(*id);
                format!("Updated {}.", dog.name)
            }
            FormTarget::NewMating { .. } => {
                let mating = create_mating(&*self.store.acquire()?, &form.parse_mating()?)?;
                format!("Recorded {}.", mating_summary(&self.dogs, &mating))
            }
            FormTarget::EditMating { id, .. } => {
                update_mating(&*self.store.acquire()?, *id, &form.parse_mating()?)
                    .context("failed to update mating")?;
                "Updated mating.".to_string()
            }
            FormTarget::NewGeneticTest { .. } => {
                let test =
                    create_genetic_test(&*self.store.acquire()?, &form.parse_genetic_test()?)?;
                format!("Added {} test.", test.test_name)
            }
            FormTarget::EditGeneticTest { id, .. } => {
                update_genetic_test(&*self.store.acquire()?, *id, &form.parse_genetic_test()?)
                    .context("failed to update genetic test")?;
                "Updated genetic test.".to_string()
            }
            FormTarget::NewVetRecord { .. } => {
                let record = create_vet_record(&*self.store.acquire()?, &form.parse_vet_record()?)?;
                format!("Added {}.", record.title)
            }
            FormTarget::EditVetRecord { id, .. } => {
                update_vet_record(&*self.store.acquire()?, *id, &form.parse_vet_record()?)
                    .context("failed to update vet record")?;
                "Updated vet record.".to_string()
            }
        };

        self.refresh(focus_dog)?;
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    /// Swap the typed photo path for a durable copy in the image store.
    fn with_durable_photo(&self, mut dog: NewDog) -> Result<NewDog> {
        if !dog.image_uri.is_empty() {
            let durable = self.images.persist(Path::new(&dog.image_uri))?;
            dog.image_uri = durable.to_string_lossy().into_owned();
        }
        Ok(dog)
    }

    fn confirm_dog_delete(&mut self, dog: Dog) -> Result<Mode> {
        let counts = count_dependents(&*self.store.acquire()?, dog.id)
            .context("failed to count dependent records")?;
        self.clear_status();
        Ok(Mode::ConfirmDelete(PendingDelete::Dog { dog, counts }))
    }

    fn perform_delete(&mut self, pending: &PendingDelete) -> Result<()> {
        let message = match pending {
            PendingDelete::Dog { dog, .. } => {
                delete_dog(&*self.store.acquire()?, dog.id).context("failed to delete dog")?;
                if matches!(&self.screen, Screen::Dog(screen) if screen.dog.id == dog.id) {
                    self.screen = Screen::Dogs;
                }
                format!("Deleted {}.", dog.name)
            }
            PendingDelete::Mating { id, .. } => {
                delete_mating(&*self.store.acquire()?, *id).context("failed to delete mating")?;
                "Deleted mating.".to_string()
            }
            PendingDelete::GeneticTest { id, .. } => {
                delete_genetic_test(&*self.store.acquire()?, *id)
                    .context("failed to delete genetic test")?;
                "Deleted genetic test.".to_string()
            }
            PendingDelete::VetRecord { id, .. } => {
                delete_vet_record(&*self.store.acquire()?, *id)
                    .context("failed to delete vet record")?;
                "Deleted vet record.".to_string()
            }
        };
        self.refresh(None)?;
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    /// Re-read the dog list and whatever the current screen shows.
    fn refresh(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.reload_dogs(focus_id)?;

        let conn = self.store.acquire()?;
        let mut dog_gone = false;
        match &mut self.screen {
            Screen::Dogs => {}
            Screen::Dog(screen) => match fetch_dog(&conn, screen.dog.id)? {
                Some(dog) => screen.reload(&conn, Some(dog))?,
                None => dog_gone = true,
            },
            Screen::Matings(screen) => screen.reload(&conn)?,
        }
        if dog_gone {
            self.screen = Screen::Dogs;
        }
        Ok(())
    }

    fn reload_dogs(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.dogs = fetch_dogs(&*self.store.acquire()?).context("failed to load dogs")?;
        if self.dogs.is_empty() {
            self.selected = 0;
            return Ok(());
        }

        if let Some(id) = focus_id {
            if let Some(idx) = self.dogs.iter().position(|dog| dog.id == id) {
                self.selected = idx;
                return Ok(());
            }
        }

        if self.selected >= self.dogs.len() {
            self.selected = self.dogs.len() - 1;
        }
        Ok(())
    }

    fn open_dog(&mut self, dog: Dog) -> Result<()> {
        let screen = DogScreen::load(&*self.store.acquire()?, dog)?;
        self.screen = Screen::Dog(screen);
        Ok(())
    }

    fn open_matings(&mut self) -> Result<()> {
        let screen = MatingScreen::load(&*self.store.acquire()?)?;
        self.screen = Screen::Matings(screen);
        Ok(())
    }

    fn move_dog_selection(&mut self, offset: isize) {
        self.selected = step_index(self.selected, self.dogs.len(), offset);
    }

    fn current_dog(&self) -> Option<&Dog> {
        self.dogs.get(self.selected)
    }

    fn mating_line(&self, mating: &Mating) -> Line<'static> {
        Line::from(vec![
            Span::styled(
                format!("{:<10} ", mating.date),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                dog_name(&self.dogs, mating.male_dog_id),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" × "),
            Span::styled(
                dog_name(&self.dogs, mating.female_dog_id),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

fn dog_name(dogs: &[Dog], id: i64) -> String {
    dogs.iter()
        .find(|dog| dog.id == id)
        .map(|dog| dog.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

fn mating_summary(dogs: &[Dog], mating: &Mating) -> String {
    format!(
        "the mating of {} × {} on {}",
        dog_name(dogs, mating.male_dog_id),
        dog_name(dogs, mating.female_dog_id),
        mating.date
    )
}

fn profile_lines(dog: &Dog) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::Gray);
    let row = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<16}"), label_style),
            Span::raw(or_dash(value).to_string()),
        ])
    };
    vec![
        Line::from(Span::styled(
            dog.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        row("Registered name", &dog.registered_name),
        row("Sex", &dog.sex.to_string()),
        row("Breed", &dog.breed),
        row("Birthdate", &dog.birthdate),
        row("Color", &dog.color),
        row("Microchip", &dog.microchip),
        row("Photo", &dog.image_uri),
        Line::from(""),
        Line::from(dog.notes.clone()),
    ]
}
