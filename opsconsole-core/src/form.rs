//! Command forms
//!
//! Builds editable forms from the backend's command schema, one tab per
//! command type, and serializes the filled-in form back into the
//! `{type, field_descriptions}` submission the backend expects.

use thiserror::Error;

use crate::domain::command::{
    Command, CommandType, FieldDescription, FieldValue, is_truthy_str, parse_bool,
};
use crate::dto::command::{SubmitCommand, SubmittedField};
use crate::html::Element;

/// Errors raised while filling in or submitting a form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Unknown command type: {0}")]
    UnknownCommandType(String),

    #[error("Command type {command_type} has no field '{field}'")]
    UnknownField { command_type: String, field: String },

    #[error("Value '{value}' is not allowed for field '{field}' (allowed: {})", .allowed.join(", "))]
    ValueNotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Field '{field}' expects a boolean, got '{value}'")]
    InvalidBool { field: String, value: String },

    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("A submission for {0} is already in flight")]
    SubmissionInFlight(String),

    #[error("No command type is active")]
    NoActiveCommandType,
}

/// The kind of input a field is rendered as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// Single-select over the allowed values
    Select {
        options: Vec<String>,
        selected: String,
    },
    Checkbox {
        checked: bool,
    },
    Text {
        value: String,
        placeholder: Option<String>,
        required: bool,
    },
}

/// One rendered form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub field_id: String,
    pub parent_class_name: String,
    pub hint: String,
    pub kind: ControlKind,
}

impl FormControl {
    /// Pick the control for a field: select if enumerated, checkbox if
    /// boolean, text otherwise
    pub fn from_description(fd: &FieldDescription) -> Self {
        let current = fd.value.as_ref().map(|v| v.to_string());
        let options = fd.allowed_values();

        let kind = if !options.is_empty() {
            let selected = [current.as_ref(), fd.placeholder.as_ref()]
                .into_iter()
                .flatten()
                .find(|candidate| options.contains(*candidate))
                .unwrap_or(&options[0])
                .clone();
            ControlKind::Select {
                options: options.to_vec(),
                selected,
            }
        } else if fd.is_bool {
            let checked = fd.value.as_ref().is_some_and(FieldValue::is_truthy)
                || fd
                    .placeholder
                    .as_deref()
                    .is_some_and(is_truthy_str);
            ControlKind::Checkbox { checked }
        } else {
            ControlKind::Text {
                value: current.unwrap_or_default(),
                placeholder: fd.placeholder.clone(),
                required: fd.placeholder.is_none() && !fd.optional,
            }
        };

        Self {
            field_id: fd.id.clone(),
            parent_class_name: fd.parent_class_name.clone(),
            hint: fd.hint.clone(),
            kind,
        }
    }

    /// Control key, unique across every tab of a form
    pub fn key(&self) -> String {
        format!("{}-{}", self.parent_class_name, self.field_id)
    }

    /// The value this control contributes to a submission, if any
    ///
    /// Checkboxes always contribute their state. Text inputs fall back to
    /// the placeholder when left empty; empty strings are never submitted.
    pub fn resolved_value(&self) -> Option<FieldValue> {
        let text = match &self.kind {
            ControlKind::Checkbox { checked } => return Some(FieldValue::Bool(*checked)),
            ControlKind::Select { selected, .. } => Some(selected.clone()),
            ControlKind::Text {
                value, placeholder, ..
            } => {
                if value.is_empty() {
                    placeholder.clone()
                } else {
                    Some(value.clone())
                }
            }
        };
        text.filter(|t| !t.is_empty()).map(FieldValue::Text)
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, ControlKind::Text { required: true, .. })
    }

    /// Apply operator input to this control
    pub fn set_input(&mut self, raw: &str) -> Result<(), FormError> {
        match &mut self.kind {
            ControlKind::Text { value, .. } => {
                *value = raw.to_string();
            }
            ControlKind::Select { options, selected } => {
                if !options.iter().any(|o| o == raw) {
                    return Err(FormError::ValueNotAllowed {
                        field: self.field_id.clone(),
                        value: raw.to_string(),
                        allowed: options.clone(),
                    });
                }
                *selected = raw.to_string();
            }
            ControlKind::Checkbox { checked } => {
                *checked = parse_bool(raw).ok_or_else(|| FormError::InvalidBool {
                    field: self.field_id.clone(),
                    value: raw.to_string(),
                })?;
            }
        }
        Ok(())
    }

    fn to_html(&self) -> Element {
        let key = self.key();
        let label = Element::new("div")
            .class("col-sm-4 col-form-label text-right")
            .child(
                Element::new("small")
                    .class("form-text d-inline-block text-muted")
                    .text(self.hint.as_str()),
            )
            .child(
                Element::new("label")
                    .attr("for", key.as_str())
                    .text(self.field_id.as_str()),
            );

        let input = match &self.kind {
            ControlKind::Select { options, selected } => Element::new("select")
                .class("custom-select form-control col-sm-6")
                .attr("id", key.as_str())
                .attr("data-id", self.field_id.as_str())
                .attr("data-parent-class-name", self.parent_class_name.as_str())
                .children(options.iter().map(|option| {
                    Element::new("option")
                        .attr("value", option.as_str())
                        .flag_if("selected", option == selected)
                        .text(option.as_str())
                })),
            ControlKind::Checkbox { checked } => Element::new("div").class("form-check").child(
                Element::new("input")
                    .class("form-check-input position-static mt-2")
                    .attr("type", "checkbox")
                    .attr("id", key.as_str())
                    .attr("data-id", self.field_id.as_str())
                    .attr("data-parent-class-name", self.parent_class_name.as_str())
                    .flag_if("checked", *checked),
            ),
            ControlKind::Text {
                value,
                placeholder,
                required,
            } => Element::new("input")
                .class("form-control col-sm-6")
                .attr("type", "text")
                .attr("id", key.as_str())
                .attr("data-id", self.field_id.as_str())
                .attr("data-parent-class-name", self.parent_class_name.as_str())
                .attr_opt("placeholder", placeholder.as_deref())
                .attr_opt("value", Some(value.as_str()).filter(|v| !v.is_empty()))
                .flag_if("required", *required),
        };

        Element::new("div")
            .class("form-group row")
            .child(label)
            .child(input)
    }
}

/// The form for one command type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTab {
    command_type: String,
    controls: Vec<FormControl>,
    submit_disabled: bool,
}

impl CommandTab {
    fn new(command_type: &str, fields: &[FieldDescription]) -> Self {
        Self {
            command_type: command_type.to_string(),
            controls: fields.iter().map(FormControl::from_description).collect(),
            submit_disabled: false,
        }
    }

    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    pub fn controls(&self) -> &[FormControl] {
        &self.controls
    }

    pub fn control(&self, field_id: &str) -> Option<&FormControl> {
        self.controls.iter().find(|c| c.field_id == field_id)
    }

    /// Set a field from operator input
    pub fn set_input(&mut self, field_id: &str, raw: &str) -> Result<(), FormError> {
        let control = self
            .controls
            .iter_mut()
            .find(|c| c.field_id == field_id)
            .ok_or_else(|| FormError::UnknownField {
                command_type: self.command_type.clone(),
                field: field_id.to_string(),
            })?;
        control.set_input(raw)
    }

    /// Required fields that would currently submit nothing
    pub fn missing_required(&self) -> Vec<String> {
        self.controls
            .iter()
            .filter(|c| c.is_required() && c.resolved_value().is_none())
            .map(|c| c.field_id.clone())
            .collect()
    }

    /// Collect every control with a value, in form order
    pub fn serialize(&self) -> SubmitCommand {
        let field_descriptions = self
            .controls
            .iter()
            .filter_map(|control| {
                control.resolved_value().map(|value| SubmittedField {
                    id: control.field_id.clone(),
                    value,
                })
            })
            .collect();

        SubmitCommand {
            command_type: self.command_type.clone(),
            field_descriptions,
        }
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.submit_disabled
    }

    /// Validate, disable the submit control and produce the request body
    pub fn begin_submit(&mut self) -> Result<SubmitCommand, FormError> {
        if self.submit_disabled {
            return Err(FormError::SubmissionInFlight(self.command_type.clone()));
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        self.submit_disabled = true;
        Ok(self.serialize())
    }

    /// Record the outcome of a submission
    ///
    /// Only a failure re-enables the submit control; after a success the
    /// operator is expected to move on.
    pub fn finish_submit(&mut self, succeeded: bool) {
        if !succeeded {
            self.submit_disabled = false;
        }
    }

    fn to_html(&self, active: bool) -> Element {
        let pane_class = if active {
            "tab-pane show active"
        } else {
            "tab-pane show"
        };

        Element::new("div")
            .class(pane_class)
            .attr("id", self.command_type.as_str())
            .attr("role", "tabpanel")
            .child(
                Element::new("form")
                    .children(self.controls.iter().map(FormControl::to_html))
                    .child(
                        Element::new("button")
                            .attr("type", "submit")
                            .class("btn btn-primary")
                            .flag_if("disabled", self.submit_disabled)
                            .text("Submit"),
                    ),
            )
    }
}

/// Forms for every command type, with at most one active tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandForm {
    tabs: Vec<CommandTab>,
    active: Option<String>,
}

impl CommandForm {
    /// Build the form from the schema, pre-populating the tab matching
    /// `existing` with that command's values
    pub fn render(schema: &[CommandType], existing: Option<&Command>) -> Self {
        let tabs = schema
            .iter()
            .map(|command_type| match existing {
                Some(command) if command.command_type == command_type.command_type => {
                    CommandTab::new(&command_type.command_type, &command.field_descriptions)
                }
                _ => CommandTab::new(
                    &command_type.command_type,
                    &command_type.field_descriptions,
                ),
            })
            .collect();

        Self {
            tabs,
            active: existing.map(|command| command.command_type.clone()),
        }
    }

    pub fn tabs(&self) -> &[CommandTab] {
        &self.tabs
    }

    pub fn active_type(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn tab(&self, command_type: &str) -> Option<&CommandTab> {
        self.tabs.iter().find(|t| t.command_type == command_type)
    }

    pub fn tab_mut(&mut self, command_type: &str) -> Option<&mut CommandTab> {
        self.tabs.iter_mut().find(|t| t.command_type == command_type)
    }

    /// Make `command_type` the active tab
    pub fn activate(&mut self, command_type: &str) -> Result<(), FormError> {
        if self.tab(command_type).is_none() {
            return Err(FormError::UnknownCommandType(command_type.to_string()));
        }
        self.active = Some(command_type.to_string());
        Ok(())
    }

    pub fn active_tab_mut(&mut self) -> Result<&mut CommandTab, FormError> {
        let active = self.active.clone().ok_or(FormError::NoActiveCommandType)?;
        self.tab_mut(&active)
            .ok_or(FormError::UnknownCommandType(active))
    }

    /// Pills plus one tab pane per command type
    pub fn to_html(&self) -> String {
        let is_active = |tab: &CommandTab| self.active.as_deref() == Some(tab.command_type());

        let pills = Element::new("div").class("mt-2").child(
            Element::new("ul")
                .class("nav nav-pills mt-4 mb-4")
                .attr("id", "command-pills")
                .children(self.tabs.iter().map(|tab| {
                    let link_class = if is_active(tab) {
                        "nav-link active"
                    } else {
                        "nav-link"
                    };
                    Element::new("li").class("nav-item").child(
                        Element::new("a")
                            .class(link_class)
                            .attr("data-toggle", "pill")
                            .attr("href", format!("#{}", tab.command_type))
                            .text(tab.command_type.as_str()),
                    )
                })),
        );

        let body = Element::new("div")
            .class("tab-content")
            .attr("id", "commands-send-body")
            .children(self.tabs.iter().map(|tab| tab.to_html(is_active(tab))));

        format!("{}{}", pills.render(), body.render())
    }
}
