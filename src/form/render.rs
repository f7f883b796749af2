//! HTML rendering of the form through embedded Tera templates

use serde::Serialize;
use tera::{Context, Tera};

use super::registry::{ControlKind, FieldRegistry};
use crate::domain::{FieldDescriptor, FieldValue, ValueStore};

const TEMPLATES: [(&str, &str); 7] = [
    ("form.html", include_str!("../../templates/form.html")),
    ("submitted.html", include_str!("../../templates/submitted.html")),
    ("controls/input.html", include_str!("../../templates/controls/input.html")),
    ("controls/checkbox.html", include_str!("../../templates/controls/checkbox.html")),
    ("controls/radio.html", include_str!("../../templates/controls/radio.html")),
    (
        "controls/checkbox_group.html",
        include_str!("../../templates/controls/checkbox_group.html"),
    ),
    ("controls/select.html", include_str!("../../templates/controls/select.html")),
];

#[derive(Debug, Serialize)]
struct OptionContext {
    value: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct ControlContext<'a> {
    id: &'a str,
    label: &'a str,
    field_type: &'a str,
    input_type: &'a str,
    placeholder: &'a str,
    required: bool,
    value: &'a str,
    checked: bool,
    blank_option: Option<&'static str>,
    options: Vec<OptionContext>,
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    title: &'a str,
    controls: Vec<String>,
    errors: &'a [String],
}

pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Render one control for `field` showing `value`.
    ///
    /// Never fails on missing properties: absent options render no choices
    /// and an absent value renders as the field's default.
    pub fn render_field(
        &self,
        registry: &FieldRegistry,
        field: &FieldDescriptor,
        value: Option<&FieldValue>,
    ) -> Result<String, tera::Error> {
        let rule = registry.rule(&field.field_type);
        let default = rule.default_value();
        let value = value.unwrap_or(&default);
        let selections = value.selections();

        let options = registry
            .options(field)
            .into_iter()
            .map(|option| OptionContext {
                selected: selections.contains(&option),
                value: option,
            })
            .collect();

        let control = ControlContext {
            id: field.key(),
            label: field.label(),
            field_type: field.field_type.as_str(),
            input_type: rule.input_type,
            placeholder: field.properties.placeholder.as_deref().unwrap_or_default(),
            required: field.properties.required,
            value: value.as_text().unwrap_or_default(),
            checked: value.as_flag().unwrap_or(false),
            blank_option: rule.blank_option,
            options,
        };

        let template = match rule.control {
            ControlKind::Input => "controls/input.html",
            ControlKind::Checkbox => "controls/checkbox.html",
            ControlKind::RadioGroup => "controls/radio.html",
            ControlKind::CheckboxGroup => "controls/checkbox_group.html",
            ControlKind::Select => "controls/select.html",
        };

        self.tera
            .render(template, &Context::from_serialize(&control)?)
    }

    /// Render the full page: one labeled control per field and a submit button.
    pub fn render_form(
        &self,
        title: &str,
        registry: &FieldRegistry,
        fields: &[FieldDescriptor],
        values: &ValueStore,
        errors: &[String],
    ) -> Result<String, tera::Error> {
        let controls = fields
            .iter()
            .map(|field| self.render_field(registry, field, values.get(field.key())))
            .collect::<Result<Vec<_>, _>>()?;

        let page = PageContext {
            title,
            controls,
            errors,
        };
        self.tera.render("form.html", &Context::from_serialize(&page)?)
    }

    /// Confirmation page listing the submitted values as JSON.
    pub fn render_submitted(&self, title: &str, values: &ValueStore) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert(
            "payload",
            &serde_json::to_string_pretty(values).unwrap_or_default(),
        );
        self.tera.render("submitted.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldKind, FieldProperties};
    use crate::form::registry::WeekdaySet;

    fn field(id: &str, kind: &str, options: &[&str]) -> FieldDescriptor {
        FieldDescriptor {
            field_unique_key: Some(id.to_string()),
            field_type: FieldKind::from(kind),
            field_name: format!("{} name", id),
            properties: FieldProperties {
                options: options.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn render(registry: &FieldRegistry, f: &FieldDescriptor, value: Option<&FieldValue>) -> String {
        HtmlRenderer::new()
            .unwrap()
            .render_field(registry, f, value)
            .unwrap()
    }

    #[test]
    fn test_input_types_per_field_type() {
        let registry = FieldRegistry::default();
        for (kind, input_type) in [
            ("text", "text"),
            ("number", "number"),
            ("date", "date"),
            ("fixed_time", "time"),
        ] {
            let html = render(&registry, &field("f", kind, &[]), None);
            assert!(
                html.contains(&format!("<input type=\"{}\" id=\"f\" name=\"f\"", input_type)),
                "{}: {}",
                kind,
                html
            );
        }
    }

    #[test]
    fn test_unknown_type_renders_text_input() {
        let html = render(&FieldRegistry::default(), &field("sig", "signature", &[]), None);
        assert!(html.contains("<input type=\"text\" id=\"sig\" name=\"sig\""));
        assert!(html.contains("data-field-type=\"signature\""));
    }

    #[test]
    fn test_dropdown_has_blank_option_and_marks_selection() {
        let html = render(
            &FieldRegistry::default(),
            &field("b", "dropdown", &["x", "y"]),
            Some(&FieldValue::text("y")),
        );
        assert!(html.contains("<option value=\"\">-- Select --</option>"));
        assert!(html.contains("<option value=\"x\">x</option>"));
        assert!(html.contains("<option value=\"y\" selected>y</option>"));
    }

    #[test]
    fn test_radio_group_shares_name() {
        let html = render(
            &FieldRegistry::default(),
            &field("r", "radio", &["yes", "no"]),
            Some(&FieldValue::text("no")),
        );
        assert_eq!(html.matches("type=\"radio\" name=\"r\"").count(), 2);
        assert!(html.contains("value=\"no\" checked"));
        assert!(!html.contains("value=\"yes\" checked"));
    }

    #[test]
    fn test_multiple_renders_checkbox_group() {
        let html = render(
            &FieldRegistry::default(),
            &field("m", "multiple", &["a", "b", "c"]),
            Some(&FieldValue::Many(vec!["a".into(), "c".into()])),
        );
        assert_eq!(html.matches("type=\"checkbox\" name=\"m\"").count(), 3);
        assert!(html.contains("value=\"a\" checked"));
        assert!(!html.contains("value=\"b\" checked"));
        assert!(html.contains("value=\"c\" checked"));
    }

    #[test]
    fn test_checkbox_reflects_flag() {
        let registry = FieldRegistry::default();
        let f = field("c", "checkbox", &[]);
        assert!(!render(&registry, &f, Some(&FieldValue::Flag(false))).contains(" checked"));
        assert!(render(&registry, &f, Some(&FieldValue::Flag(true))).contains(" checked"));
    }

    #[test]
    fn test_weekdays_only_offer_day_names() {
        let f = field("w", "weekdays", &["Caturday"]);
        let html = render(&FieldRegistry::new(WeekdaySet::Workweek), &f, None);
        assert!(html.contains("<option value=\"\">-- Select Day --</option>"));
        assert!(html.contains("<option value=\"Friday\">Friday</option>"));
        assert!(!html.contains("Saturday"));
        assert!(!html.contains("Caturday"));
        assert_eq!(html.matches("<option").count(), 6);
    }

    #[test]
    fn test_option_type_without_options_renders_no_choices() {
        let html = render(&FieldRegistry::default(), &field("r", "radio", &[]), None);
        assert!(!html.contains("type=\"radio\""));
        assert!(html.contains("<label>r name</label>"));
    }

    #[test]
    fn test_placeholder_required_and_label() {
        let mut f = field("email", "text", &[]);
        f.properties.placeholder = Some("you at example".into());
        f.properties.required = true;
        f.properties.label = Some("Email".into());

        let html = render(&FieldRegistry::default(), &f, Some(&FieldValue::text("me")));
        assert!(html.contains("<label for=\"email\">Email</label>"));
        assert!(html.contains("value=\"me\""));
        assert!(html.contains("placeholder=\"you at example\""));
        assert!(html.contains(" required>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(
            &FieldRegistry::default(),
            &field("t", "text", &[]),
            Some(&FieldValue::text("<script>")),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_form_page() {
        let registry = FieldRegistry::default();
        let fields = vec![field("a", "checkbox", &[]), field("b", "dropdown", &["x", "y"])];
        let values = registry.seed(&fields);

        let html = HtmlRenderer::new()
            .unwrap()
            .render_form("Dynamic Form", &registry, &fields, &values, &[])
            .unwrap();

        assert!(html.contains("<title>Dynamic Form</title>"));
        assert!(html.contains("<form method=\"post\""));
        assert!(html.contains("<button type=\"submit\">Submit</button>"));
        assert_eq!(html.matches("class=\"form-field\"").count(), 2);
        assert!(!html.contains("form-errors"));
    }

    #[test]
    fn test_render_empty_form_has_no_controls() {
        let html = HtmlRenderer::new()
            .unwrap()
            .render_form("Empty", &FieldRegistry::default(), &[], &ValueStore::new(), &[])
            .unwrap();
        assert!(!html.contains("class=\"form-field\""));
        assert!(html.contains("<button type=\"submit\">Submit</button>"));
    }

    #[test]
    fn test_render_errors_list() {
        let html = HtmlRenderer::new()
            .unwrap()
            .render_form(
                "Form",
                &FieldRegistry::default(),
                &[],
                &ValueStore::new(),
                &["Name is required".to_string()],
            )
            .unwrap();
        assert!(html.contains("<li>Name is required</li>"));
    }

    #[test]
    fn test_render_submitted_shows_payload() {
        let values = ValueStore::new().with("b", FieldValue::text("y"));
        let html = HtmlRenderer::new()
            .unwrap()
            .render_submitted("Form", &values)
            .unwrap();
        assert!(html.contains("Form submitted!"));
        assert!(html.contains("&quot;b&quot;: &quot;y&quot;"));
    }
}
