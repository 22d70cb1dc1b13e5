//! Directory (LDAP) authenticator backing the login flow.

use ldap3::{ldap_escape, LdapConnAsync, Scope, SearchEntry};
use thiserror::Error;

use crate::config::DirectoryConfig;

/// Identity returned by a successful bind + search.
#[derive(Debug)]
pub struct DirectoryUser {
    pub username: String,
    pub display_name: String,
    pub groups: Vec<String>,
}

/// Any variant is treated as an authentication failure by the login handler.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory connection failed: {0}")]
    Connect(ldap3::LdapError),
    #[error("invalid credentials: {0}")]
    Bind(ldap3::LdapError),
    #[error("directory search failed: {0}")]
    Search(ldap3::LdapError),
    #[error("user not found")]
    NotFound,
}

/// Bind as `username@domain`, then search the domain base for the entry whose
/// short name matches the input.
pub async fn authenticate(
    config: &DirectoryConfig,
    username: &str,
    password: &str,
) -> Result<DirectoryUser, DirectoryError> {
    let url = format!("ldap://{}:{}", config.host, config.port);
    let (conn, mut ldap) = LdapConnAsync::new(&url)
        .await
        .map_err(DirectoryError::Connect)?;
    ldap3::drive!(conn);

    let principal = format!("{}@{}", username, config.domain);
    ldap.simple_bind(&principal, password)
        .await
        .map_err(DirectoryError::Bind)?
        .success()
        .map_err(DirectoryError::Bind)?;

    let base_dn = format!("DC={}", config.domain.replace('.', ",DC="));
    let filter = format!("(sAMAccountName={})", ldap_escape(username));
    let (entries, _result) = ldap
        .search(
            &base_dn,
            Scope::Subtree,
            &filter,
            vec!["displayName", "memberOf"],
        )
        .await
        .map_err(DirectoryError::Search)?
        .success()
        .map_err(DirectoryError::Search)?;
    let _ = ldap.unbind().await;

    let entry = entries.into_iter().next().ok_or(DirectoryError::NotFound)?;
    let entry = SearchEntry::construct(entry);

    let display_name = entry
        .attrs
        .get("displayName")
        .and_then(|values| values.first())
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| username.to_string());

    let groups = entry
        .attrs
        .get("memberOf")
        .map(|values| {
            values
                .iter()
                .map(|dn| {
                    dn.split(',')
                        .next()
                        .unwrap_or("")
                        .trim_start_matches("CN=")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DirectoryUser {
        username: username.to_string(),
        display_name,
        groups,
    })
}
