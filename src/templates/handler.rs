//! Template lookup and rendering for `templateDir` services.

use std::collections::HashMap;
use std::path::Path;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template directory {0} does not exist")]
    MissingDir(String),
    #[error("template parse failure: {0}")]
    Parse(#[from] tera::Error),
}

/// Parsed templates plus the routing rules for one service.
pub struct TemplateService {
    tera: Tera,
    base_route: String,
    aliases: HashMap<String, String>,
}

impl TemplateService {
    /// Parse every `*.html` under the directory. A missing directory is fatal
    /// at startup.
    pub fn from_dir(
        dir: &Path,
        route: &str,
        aliases: HashMap<String, String>,
    ) -> Result<Self, TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::MissingDir(dir.display().to_string()));
        }
        let pattern = dir.join("*.html");
        let tera = Tera::new(&pattern.to_string_lossy())?;

        Ok(Self {
            tera,
            base_route: route.to_string(),
            aliases,
        })
    }

    /// Render the template selected by the request path.
    pub fn render(&self, path: &str) -> Response {
        let name = resolve_template_name(&self.base_route, &self.aliases, path);

        if !self.tera.get_template_names().any(|n| n == name) {
            return (StatusCode::NOT_FOUND, "404 page not found").into_response();
        }

        match self.tera.render(&name, &Context::new()) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!(template = %name, error = %e, "Template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error").into_response()
            }
        }
    }
}

/// Alias map first, then a literal `.html` name, then `path + ".html"`;
/// the route root falls back to `index.html`.
fn resolve_template_name(
    base_route: &str,
    aliases: &HashMap<String, String>,
    path: &str,
) -> String {
    let rest = path.strip_prefix(base_route).unwrap_or(path);
    let rest = rest.trim_matches('/');

    if rest.is_empty() {
        return "index.html".to_string();
    }
    if let Some(mapped) = aliases.get(rest) {
        return mapped.clone();
    }
    if rest.ends_with(".html") {
        rest.to_string()
    } else {
        format!("{}.html", rest)
    }
}
