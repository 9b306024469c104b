//! Server-rendered page templates using Jinja2 syntax.
//!
//! Templates are compiled into the binary so the server does not depend on its
//! working directory. Names ending in `.html` get HTML auto-escaping.

use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Every page template, keyed by the name handlers render it with
const PAGE_TEMPLATES: &[(&str, &str)] = &[
    (
        "layout.html",
        include_str!("../../templates/pages/layout.html"),
    ),
    ("home.html", include_str!("../../templates/pages/home.html")),
    ("tool.html", include_str!("../../templates/pages/tool.html")),
    (
        "login.html",
        include_str!("../../templates/pages/login.html"),
    ),
    (
        "admin.html",
        include_str!("../../templates/pages/admin.html"),
    ),
    ("edit.html", include_str!("../../templates/pages/edit.html")),
    (
        "entry_form.html",
        include_str!("../../templates/pages/entry_form.html"),
    ),
    (
        "error.html",
        include_str!("../../templates/pages/error.html"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in PAGE_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a page template with a serializable context.
///
/// ```ignore
/// let html = render_page("home.html", minijinja::context! { title => "RepoSource" })?;
/// ```
pub fn render_page<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

impl From<TemplateError> for crate::core::error::AppError {
    fn from(err: TemplateError) -> Self {
        crate::core::error::AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_load() {
        let env = get_environment();
        for (name, _) in PAGE_TEMPLATES {
            assert!(env.get_template(name).is_ok(), "template {} failed", name);
        }
    }

    #[test]
    fn test_render_missing_template() {
        let result = render_page("nope.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_error_page_escapes_input() {
        let html = render_page(
            "error.html",
            context! { status => 404, message => "<script>alert(1)</script>" },
        )
        .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
