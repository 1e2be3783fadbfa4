//! Form model shared by every screen: a list of fields with a focus cursor,
//! key-driven editing and client-side validation.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::ValidationError;
use crate::task::due_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    /// `YYYY-MM-DD`.
    Date,
    /// One of a fixed set of values, cycled with Left/Right.
    Choice(&'static [&'static str]),
    /// A local file path.
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

impl Field {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let value = match kind {
            FieldKind::Choice(options) => options.first().copied().unwrap_or_default().to_string(),
            _ => String::new(),
        };
        Self {
            name,
            label,
            kind,
            required: false,
            value,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Value as it should be drawn; passwords are masked.
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Password => "•".repeat(self.value.chars().count()),
            FieldKind::Choice(_) => format!("◂ {} ▸", self.value),
            _ => self.value.clone(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let value = self.value.trim();
        if value.is_empty() {
            return if self.required {
                Err(ValidationError::Required(self.label))
            } else {
                Ok(())
            };
        }
        match self.kind {
            FieldKind::Email if !is_email(value) => Err(ValidationError::InvalidEmail(self.label)),
            FieldKind::Date if due_date::parse(value).is_none() => {
                Err(ValidationError::InvalidDate(self.label))
            }
            _ => Ok(()),
        }
    }

    fn cycle(&mut self, step: isize) {
        let FieldKind::Choice(options) = self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = options.iter().position(|o| *o == self.value).unwrap_or(0);
        let len = options.len() as isize;
        let next = (current as isize + step).rem_euclid(len) as usize;
        self.value = options[next].to_string();
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !value.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    /// The key was consumed by editing or focus movement.
    Edited,
    Submit,
    /// The form has no use for the key.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map_or("", |f| f.value.as_str())
    }

    /// Trimmed value of a field.
    pub fn text(&self, name: &str) -> String {
        self.value(name).trim().to_string()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value.into();
        }
    }

    /// First validation failure, in field order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.iter().try_for_each(Field::validate)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return FormInput::Ignored;
        }
        match key.code {
            KeyCode::Enter => FormInput::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                FormInput::Edited
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(-1);
                FormInput::Edited
            }
            KeyCode::Left | KeyCode::Right => match self.fields.get_mut(self.focus) {
                Some(field) if matches!(field.kind, FieldKind::Choice(_)) => {
                    field.cycle(if key.code == KeyCode::Left { -1 } else { 1 });
                    FormInput::Edited
                }
                _ => FormInput::Ignored,
            },
            KeyCode::Backspace => match self.editable() {
                Some(field) => {
                    field.value.pop();
                    FormInput::Edited
                }
                None => FormInput::Ignored,
            },
            KeyCode::Char(c) => match self.editable() {
                Some(field) => {
                    field.value.push(c);
                    FormInput::Edited
                }
                None => FormInput::Ignored,
            },
            _ => FormInput::Ignored,
        }
    }

    fn editable(&mut self) -> Option<&mut Field> {
        self.fields
            .get_mut(self.focus)
            .filter(|f| !matches!(f.kind, FieldKind::Choice(_)))
    }

    fn move_focus(&mut self, step: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + step).rem_euclid(len) as usize;
    }
}
