//! Field type dispatch table
//!
//! One table maps every field type to the control it renders as, the shape
//! of its value, its seeded default, and where its choices come from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{FieldDescriptor, FieldKind, FieldValue, FormError, ValueStore};

static ALL_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Which day names a `weekdays` field offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdaySet {
    /// Monday through Sunday
    #[default]
    All,
    /// Monday through Friday
    Workweek,
}

impl WeekdaySet {
    pub fn names(self) -> &'static [&'static str] {
        match self {
            WeekdaySet::All => &ALL_WEEKDAYS,
            WeekdaySet::Workweek => &ALL_WEEKDAYS[..5],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// `<input>` with the rule's `input_type`
    Input,
    RadioGroup,
    Select,
    CheckboxGroup,
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Flag,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSource {
    None,
    Schema,
    Weekdays,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub control: ControlKind,
    pub input_type: &'static str,
    pub shape: ValueShape,
    pub options: OptionSource,
    /// Label of the empty first `<option>` of a select
    pub blank_option: Option<&'static str>,
}

impl FieldRule {
    const fn input(input_type: &'static str) -> Self {
        Self {
            control: ControlKind::Input,
            input_type,
            shape: ValueShape::Text,
            options: OptionSource::None,
            blank_option: None,
        }
    }

    const fn choice(control: ControlKind, options: OptionSource, blank: Option<&'static str>) -> Self {
        Self {
            control,
            input_type: "",
            shape: ValueShape::Text,
            options,
            blank_option: blank,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self.shape {
            ValueShape::Flag => FieldValue::Flag(false),
            ValueShape::Text | ValueShape::Many => FieldValue::text(""),
        }
    }

    /// Whether a text value must be one of the field's options.
    fn restricts_choice(&self) -> bool {
        self.options != OptionSource::None
    }
}

#[derive(Debug, Clone)]
pub struct FieldRegistry {
    rules: HashMap<FieldKind, FieldRule>,
    aliases: HashMap<String, FieldKind>,
    fallback: FieldRule,
    weekdays: WeekdaySet,
}

impl FieldRegistry {
    pub fn new(weekdays: WeekdaySet) -> Self {
        let rules = HashMap::from([
            (FieldKind::Text, FieldRule::input("text")),
            (FieldKind::Number, FieldRule::input("number")),
            (FieldKind::Date, FieldRule::input("date")),
            (FieldKind::FixedTime, FieldRule::input("time")),
            (
                FieldKind::Radio,
                FieldRule::choice(ControlKind::RadioGroup, OptionSource::Schema, None),
            ),
            (
                FieldKind::Dropdown,
                FieldRule::choice(ControlKind::Select, OptionSource::Schema, Some("-- Select --")),
            ),
            (
                FieldKind::Weekdays,
                FieldRule::choice(
                    ControlKind::Select,
                    OptionSource::Weekdays,
                    Some("-- Select Day --"),
                ),
            ),
            (
                FieldKind::Multiple,
                FieldRule {
                    control: ControlKind::CheckboxGroup,
                    input_type: "checkbox",
                    shape: ValueShape::Many,
                    options: OptionSource::Schema,
                    blank_option: None,
                },
            ),
            (
                FieldKind::Checkbox,
                FieldRule {
                    control: ControlKind::Checkbox,
                    input_type: "checkbox",
                    shape: ValueShape::Flag,
                    options: OptionSource::None,
                    blank_option: None,
                },
            ),
        ]);

        Self {
            rules,
            aliases: HashMap::new(),
            fallback: FieldRule::input("text"),
            weekdays,
        }
    }

    /// Treat the raw `fieldType` tag `tag` as `kind`. Tags match
    /// case-insensitively.
    pub fn with_alias(mut self, tag: &str, kind: FieldKind) -> Self {
        self.aliases.insert(tag.to_lowercase(), kind);
        self
    }

    pub fn weekdays(&self) -> WeekdaySet {
        self.weekdays
    }

    /// Kind after alias resolution.
    pub fn resolve<'a>(&'a self, kind: &'a FieldKind) -> &'a FieldKind {
        match kind {
            FieldKind::Other(tag) => self.aliases.get(&tag.to_lowercase()).unwrap_or(kind),
            _ => kind,
        }
    }

    /// Rule for `kind`; unknown kinds get the plain text input rule.
    pub fn rule(&self, kind: &FieldKind) -> &FieldRule {
        self.rules.get(self.resolve(kind)).unwrap_or(&self.fallback)
    }

    pub fn default_value(&self, field: &FieldDescriptor) -> FieldValue {
        self.rule(&field.field_type).default_value()
    }

    /// Store with one default entry per field.
    pub fn seed(&self, fields: &[FieldDescriptor]) -> ValueStore {
        fields
            .iter()
            .map(|f| (f.key().to_string(), self.default_value(f)))
            .collect()
    }

    /// Choices offered for `field`. Missing schema options yield none.
    pub fn options(&self, field: &FieldDescriptor) -> Vec<String> {
        match self.rule(&field.field_type).options {
            OptionSource::None => Vec::new(),
            OptionSource::Schema => field.properties.options.clone(),
            OptionSource::Weekdays => self.weekdays.names().iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Check that `value` has the shape the field type expects and, for
    /// choice fields, only names offered options.
    pub fn check_value(&self, field: &FieldDescriptor, value: &FieldValue) -> Result<(), FormError> {
        let rule = self.rule(&field.field_type);
        let key = field.key();

        match (rule.shape, value) {
            (ValueShape::Flag, FieldValue::Flag(_)) => Ok(()),
            (ValueShape::Flag, _) => Err(FormError::invalid(key, "expected a boolean")),
            (ValueShape::Text, FieldValue::Text(text)) => {
                if rule.restricts_choice() && !text.is_empty() && !self.offers(field, text) {
                    Err(FormError::invalid(key, format!("'{}' is not an offered option", text)))
                } else {
                    Ok(())
                }
            }
            (ValueShape::Text, _) => Err(FormError::invalid(key, "expected a string")),
            (ValueShape::Many, FieldValue::Many(items)) => {
                match items.iter().find(|item| !self.offers(field, item)) {
                    Some(item) => Err(FormError::invalid(
                        key,
                        format!("'{}' is not an offered option", item),
                    )),
                    None => Ok(()),
                }
            }
            // The seeded empty string stands for an empty selection
            (ValueShape::Many, FieldValue::Text(text)) if text.is_empty() => Ok(()),
            (ValueShape::Many, _) => Err(FormError::invalid(key, "expected a list of options")),
        }
    }

    /// Value of `field` from the raw strings an HTML form posted under its
    /// name. An absent checkbox is unchecked; an absent text field is empty.
    pub fn value_from_form(&self, field: &FieldDescriptor, posted: &[&str]) -> FieldValue {
        match self.rule(&field.field_type).shape {
            ValueShape::Flag => FieldValue::Flag(!posted.is_empty()),
            ValueShape::Many => FieldValue::Many(posted.iter().map(|s| s.to_string()).collect()),
            ValueShape::Text => FieldValue::text(posted.first().copied().unwrap_or_default()),
        }
    }

    fn offers(&self, field: &FieldDescriptor, candidate: &str) -> bool {
        self.options(field).iter().any(|o| o == candidate)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new(WeekdaySet::default())
    }
}
