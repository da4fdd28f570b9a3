//! Server-rendered query form.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::bridge::QueryResult;

const PAGE_TEMPLATE: &str = "index";

/// Transient state of one form interaction.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub user_name: String,
    pub date_required: String,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Result(QueryResult),
    Error(String),
}

#[derive(Serialize)]
struct PageView<'a> {
    user_name: &'a str,
    date_required: &'a str,
    result: Option<&'a QueryResult>,
    error: Option<&'a str>,
}

impl<'a> From<&'a FormState> for PageView<'a> {
    fn from(state: &'a FormState) -> Self {
        let (result, error) = match &state.outcome {
            Some(Outcome::Result(result)) => (Some(result), None),
            Some(Outcome::Error(message)) => (None, Some(message.as_str())),
            None => (None, None),
        };
        Self {
            user_name: &state.user_name,
            date_required: &state.date_required,
            result,
            error,
        }
    }
}

/// Compiled page template. Values are HTML-escaped by handlebars.
#[derive(Clone)]
pub struct FormRenderer {
    handlebars: Handlebars<'static>,
}

impl FormRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("format_hours", Box::new(format_hours_helper));
        handlebars
            .register_template_string(PAGE_TEMPLATE, include_str!("../templates/index.hbs"))?;
        Ok(Self { handlebars })
    }

    /// Renders the full HTML page for `state`.
    pub fn render_page(&self, state: &FormState) -> Result<String, RenderError> {
        self.handlebars.render(PAGE_TEMPLATE, &PageView::from(state))
    }
}

/// Two decimal places, as shown to people.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.2}")
}

fn format_hours_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let hours = h.param(0).and_then(|v| v.value().as_f64()).unwrap_or(0.0);
    out.write(&format_hours(hours))?;
    Ok(())
}
