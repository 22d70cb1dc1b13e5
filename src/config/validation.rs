//! Configuration validation logic.

use std::collections::HashSet;

use url::Url;

use crate::config::schema::{AuthMode, GatewayConfig};

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation error: {}", self.0)
    }
}

/// Validate a GatewayConfig for semantic correctness.
///
/// Deserialization guarantees shape; this pass checks the rules the schema
/// cannot express: route form, target/templateDir exclusivity, URL syntax,
/// and cross-section requirements.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_routes: HashSet<&str> = HashSet::new();

    for svc in &config.services {
        if svc.route.is_empty() {
            errors.push(ValidationError("service route is required".to_string()));
            continue;
        }
        if !svc.route.starts_with('/') {
            errors.push(ValidationError(format!(
                "service '{}': route must start with '/'",
                svc.route
            )));
        }
        if svc.route.len() > 1 && svc.route.ends_with('/') {
            errors.push(ValidationError(format!(
                "service '{}': route must not end with '/' (both forms are registered automatically)",
                svc.route
            )));
        }
        if !seen_routes.insert(svc.route.as_str()) {
            errors.push(ValidationError(format!(
                "service '{}': duplicate route",
                svc.route
            )));
        }

        match (&svc.target, &svc.template_dir) {
            (None, None) => errors.push(ValidationError(format!(
                "service '{}': either target or templateDir must be specified",
                svc.route
            ))),
            (Some(_), Some(_)) => errors.push(ValidationError(format!(
                "service '{}': target and templateDir are mutually exclusive",
                svc.route
            ))),
            (Some(_), None) => validate_targets(svc.route.as_str(), svc, &mut errors),
            (None, Some(_)) => {}
        }

        if svc.auth == AuthMode::Login && svc.session_duration == 0 {
            errors.push(ValidationError(format!(
                "service '{}': sessionDuration must be > 0",
                svc.route
            )));
        }
    }

    let any_login = config
        .services
        .iter()
        .any(|svc| svc.auth == AuthMode::Login);
    if any_login && config.directory.is_none() {
        errors.push(ValidationError(
            "a directory section is required when any service uses auth: login".to_string(),
        ));
    }

    if let Some(token_route) = &config.token_route {
        if !token_route.starts_with('/') || (token_route.len() > 1 && token_route.ends_with('/')) {
            errors.push(ValidationError(format!(
                "tokenRoute '{}' must start with '/' and not end with '/'",
                token_route
            )));
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError(
            "healthCheck.intervalSecs must be > 0".to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_targets(
    route: &str,
    svc: &crate::config::schema::ServiceEntry,
    errors: &mut Vec<ValidationError>,
) {
    let targets = svc.target_list();

    if svc.is_websocket() && targets.len() > 1 {
        errors.push(ValidationError(format!(
            "service '{}': a ws:// target cannot be a list",
            route
        )));
        return;
    }

    for target in targets {
        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https" | "ws") => {}
            Ok(url) => errors.push(ValidationError(format!(
                "service '{}': unsupported target scheme '{}' in {}",
                route,
                url.scheme(),
                target
            ))),
            Err(e) => errors.push(ValidationError(format!(
                "service '{}': invalid target URL '{}': {}",
                route, target, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::*;

    fn entry(route: &str, target: &str) -> ServiceEntry {
        ServiceEntry {
            route: route.into(),
            target: Some(target.into()),
            template_dir: None,
            template_routes: Default::default(),
            log: None,
            auth: AuthMode::None,
            session_duration: 3600,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = GatewayConfig::default();
        config.services.push(entry("/api", "http://backend:5000"));
        config
            .services
            .push(entry("/lb", "http://a:5000, http://b:5000"));

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_target_and_template_dir() {
        let mut config = GatewayConfig::default();
        let mut svc = entry("/api", "http://backend:5000");
        svc.target = None;
        config.services.push(svc);

        let errs = validate_config(&config).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].0.contains("either target or templateDir"));
    }

    #[test]
    fn test_invalid_target_url() {
        let mut config = GatewayConfig::default();
        config.services.push(entry("/api", "http://ok:5000,not a url"));

        let errs = validate_config(&config).unwrap_err();
        assert!(errs[0].0.contains("invalid target URL"));
    }

    #[test]
    fn test_duplicate_route() {
        let mut config = GatewayConfig::default();
        config.services.push(entry("/api", "http://a:5000"));
        config.services.push(entry("/api", "http://b:5000"));

        let errs = validate_config(&config).unwrap_err();
        assert!(errs.iter().any(|e| e.0.contains("duplicate route")));
    }

    #[test]
    fn test_login_requires_directory() {
        let mut config = GatewayConfig::default();
        let mut svc = entry("/app", "http://a:5000");
        svc.auth = AuthMode::Login;
        config.services.push(svc);

        let errs = validate_config(&config).unwrap_err();
        assert!(errs.iter().any(|e| e.0.contains("directory section")));
    }

    #[test]
    fn test_ws_target_cannot_be_list() {
        let mut config = GatewayConfig::default();
        config
            .services
            .push(entry("/ws", "ws://a:9000,ws://b:9000"));

        let errs = validate_config(&config).unwrap_err();
        assert!(errs[0].0.contains("cannot be a list"));
    }
}
