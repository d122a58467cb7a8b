use ratatui::widgets::TableState;
use tracing::{debug, warn};
use crate::error::TaskError;
use crate::models::{parse_due_date, Priority, Theme};
use crate::render::{SharedSnapshot, TaskView};
use crate::storage::PersistencePort;
use crate::store::{EditRequest, TaskStore};

#[derive(PartialEq, Debug)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    ConfirmDelete,
}

#[derive(PartialEq, Debug)]
pub enum InputField {
    None,
    Text,
    Priority,
    Due,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub priority: Priority,
    pub step: usize, // 0: Text, 1: Priority, 2: Due
}

pub struct App<P: PersistencePort> {
    pub store: TaskStore<P>,
    /// Latest snapshot pushed by the store after each change.
    pub view: SharedSnapshot,
    /// Rows currently shown, in display order.
    pub rows: Vec<TaskView>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_index: Option<usize>,
    pub add_state: AddState,
    pub show_completed: bool,
    pub theme: Theme,
    /// Last error, shown in place of the help line until the next action.
    pub status: Option<String>,
}

impl<P: PersistencePort> App<P> {
    /// Creates a new App around an opened store.
    pub fn new(mut store: TaskStore<P>) -> App<P> {
        let view = SharedSnapshot::new();
        store.set_renderer(Box::new(view.clone()));
        let theme = store.theme().unwrap_or_else(|e| {
            warn!(error = %e, "could not read theme; using light");
            Theme::default()
        });

        let mut app = App {
            store,
            view,
            rows: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_index: None,
            add_state: AddState::default(),
            show_completed: true,
            theme,
            status: None,
        };
        app.reload();
        app
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        if self.rows.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Store index of the highlighted row.
    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected().and_then(|i| self.rows.get(i)).map(|v| v.index)
    }

    /// Marks the selected task done, or reopens it.
    pub fn toggle_selected(&mut self) {
        self.status = None;
        if let Some(index) = self.selected_index() {
            let result = self.store.toggle(index);
            self.report(result);
            self.reload();
        }
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn start_delete(&mut self) {
        self.status = None;
        if let Some(index) = self.selected_index() {
            self.target_index = Some(index);
            self.input_mode = InputMode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(index) = self.target_index.take() {
            let result = self.store.delete(index);
            self.report(result);
        }
        self.input_mode = InputMode::Normal;
        self.reload();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.target_index = None;
        self.input_buffer.clear();
    }

    /// Rebuilds the visible rows from the latest snapshot and keeps the selection in range.
    pub fn reload(&mut self) {
        let show_completed = self.show_completed;
        self.rows = self
            .view
            .get()
            .tasks
            .iter()
            .filter(|v| show_completed || !v.task.completed)
            .cloned()
            .collect();

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Toggles the visibility of completed tasks.
    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.reload();
    }

    /// Switches between light and dark and saves the choice.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        let result = self.store.set_theme(self.theme);
        self.report(result);
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.status = None;
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Initiates editing of a specific field for the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        self.status = None;
        let Some(index) = self.selected_index() else { return; };
        let Some(task) = self.store.get(index) else { return; };

        // Pre-fill buffer for editing
        self.input_buffer = match field {
            InputField::Text => task.text.clone(),
            InputField::Priority => task.priority.to_string(),
            InputField::Due => task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            InputField::None => String::new(),
        };
        self.target_index = Some(index);
        self.input_field = field;
        self.input_mode = InputMode::Editing;
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            _ => {}
        }
    }

    /// Handles input for the "Add Task" wizard. Bad input keeps the wizard on the same step.
    fn handle_adding_input(&mut self) {
        self.status = None;
        match self.add_state.step {
            0 => { // Text
                if self.input_buffer.trim().is_empty() {
                    self.status = Some("The task text is blank. Enter a task name and try again.".into());
                    return;
                }
                self.add_state.text = self.input_buffer.trim().to_string();
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            1 => { // Priority, blank keeps medium
                if !self.input_buffer.trim().is_empty() {
                    match Priority::parse(&self.input_buffer) {
                        Some(p) => self.add_state.priority = p,
                        None => {
                            self.status = Some("Enter low, medium or high.".into());
                            return;
                        }
                    }
                }
                self.add_state.step += 1;
                self.input_buffer.clear();
            }
            2 => { // Due
                let due = match parse_due_date(&self.input_buffer) {
                    Ok(due) => due,
                    Err(e) => {
                        self.status = Some(e.to_string());
                        return;
                    }
                };
                let result = self.store.create(&self.add_state.text, self.add_state.priority, due);
                self.report(result);
                self.cancel_input();
                self.reload();
            }
            _ => {}
        }
    }

    /// Handles input for the "Edit Task" mode.
    fn handle_editing_input(&mut self) {
        self.status = None;
        let Some(index) = self.target_index else { return; };
        let value = Some(self.input_buffer.clone());
        let request = match self.input_field {
            InputField::Text => EditRequest { text: value, ..Default::default() },
            InputField::Priority => {
                if Priority::parse(&self.input_buffer).is_none() {
                    self.status = Some("Enter low, medium or high.".into());
                    return;
                }
                EditRequest { priority: value, ..Default::default() }
            }
            InputField::Due => EditRequest { due_date: value, ..Default::default() },
            InputField::None => return,
        };
        let result = self.store.edit(index, request);
        let keep_editing = matches!(result, Err(TaskError::Validation(_)));
        self.report(result);
        if keep_editing {
            return;
        }
        self.cancel_input();
        self.reload();
    }

    fn report<T>(&mut self, result: Result<T, TaskError>) {
        if let Err(e) = result {
            debug!(error = %e, "task operation failed");
            self.status = Some(e.to_string());
        }
    }
}
