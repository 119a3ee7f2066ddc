//! Connection-string normalization.
//!
//! Deployment platforms hand out database URLs in several loosely
//! compatible shapes: the canonical driver form, `postgresql://` or
//! `postgres://` URLs with inline credentials, and Cloud SQL unix-socket
//! forms carrying a `host=/cloudsql/<instance>` query parameter. This
//! module converts any of them into a [`ConnectionTarget`] the Postgres
//! adapter can connect with.

use serde::Deserialize;

use super::error::ValidationError;

const DRIVER_SCHEME: &str = "postgresql://";
const ALIAS_SCHEME: &str = "postgres://";
const CLOUD_SQL_PREFIX: &str = "/cloudsql/";

/// Normalized connection target for the Postgres adapter.
///
/// The pool connects through `url` and, when set, `unix_socket_path`.
/// `cloud_sql_instance` and `lazy_refresh` are informational in this
/// runtime (logged at startup): the driver speaks to the Cloud SQL
/// proxy socket directly rather than through a connector that would
/// consume them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Canonical `postgresql://` URL with credentials carried as
    /// `user`/`password` query parameters.
    pub url: String,

    /// Unix socket directory for Cloud SQL connections.
    pub unix_socket_path: Option<String>,

    /// Instance connection name extracted from a `/cloudsql/<name>` path.
    pub cloud_sql_instance: Option<String>,

    /// Lazy connector refresh marker (set on managed compute, where
    /// background refresh is throttled between requests).
    pub lazy_refresh: bool,
}

/// Managed-compute environment markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudRunEnv {
    pub service: Option<String>,
    pub revision: Option<String>,
}

impl CloudRunEnv {
    /// Reads the `K_SERVICE`/`K_REVISION` markers from the process
    /// environment.
    pub fn detect() -> Self {
        Self {
            service: std::env::var("K_SERVICE").ok(),
            revision: std::env::var("K_REVISION").ok(),
        }
    }

    /// True when either marker is non-blank.
    pub fn is_cloud_run(&self) -> bool {
        is_non_blank(self.service.as_deref()) || is_non_blank(self.revision.as_deref())
    }
}

/// Normalizes a raw connection string against the detected environment.
pub fn normalize_database_url(raw: &str) -> Result<ConnectionTarget, ValidationError> {
    normalize_database_url_in(raw, &CloudRunEnv::detect())
}

/// Normalizes a raw connection string.
///
/// - Strings already in driver form (no user-info) pass through unchanged.
/// - `postgres://` is treated identically to `postgresql://`.
/// - Inline `user:password@` credentials move into the query string,
///   never overwriting keys already present.
/// - A `host`/`unixSocketPath` query parameter pointing under
///   `/cloudsql/` switches the target to a unix socket.
pub fn normalize_database_url_in(
    raw: &str,
    env: &CloudRunEnv,
) -> Result<ConnectionTarget, ValidationError> {
    let url = if let Some(rest) = raw.strip_prefix(ALIAS_SCHEME) {
        to_driver_url(rest)?
    } else if let Some(rest) = raw.strip_prefix(DRIVER_SCHEME) {
        if split_authority(rest).0.contains('@') {
            to_driver_url(rest)?
        } else {
            // Already in driver form.
            raw.to_string()
        }
    } else {
        // Unknown scheme: pass through and let the driver reject it.
        raw.to_string()
    };

    let unix_socket_path = extract_unix_socket_path(&url);
    let cloud_sql_instance = unix_socket_path
        .as_deref()
        .and_then(extract_cloud_sql_instance);
    let lazy_refresh = unix_socket_path.is_some() && env.is_cloud_run();

    Ok(ConnectionTarget {
        url,
        unix_socket_path,
        cloud_sql_instance,
        lazy_refresh,
    })
}

/// Returns the first candidate whose trimmed value is non-empty.
pub fn first_non_blank<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|c| !c.trim().is_empty())
}

// ════════════════════════════════════════════════════════════════════════════
// URL rewriting
// ════════════════════════════════════════════════════════════════════════════

/// Rebuilds `[user[:password]@]host[:port][/path][?query]` (the part after
/// the scheme) as a canonical driver URL.
fn to_driver_url(rest: &str) -> Result<String, ValidationError> {
    let (authority, tail) = split_authority(rest);

    // Host may legally contain '@' only before the userinfo separator,
    // so the last '@' splits credentials from host.
    let (user_info, host_port) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };

    let (host, port) = match host_port.split_once(':') {
        Some((h, p)) => {
            if !p.is_empty() && p.bytes().any(|b| !b.is_ascii_digit()) {
                return Err(ValidationError::InvalidDatabaseUrl(format!(
                    "invalid port in '{}'",
                    host_port
                )));
            }
            (h, Some(p).filter(|p| !p.is_empty()))
        }
        None => (host_port, None),
    };
    let host = if host.is_empty() { "localhost" } else { host };

    let (path, query) = match tail.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (tail, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    let query = append_credentials_if_needed(query, user_info);

    let mut url = String::from(DRIVER_SCHEME);
    url.push_str(host);
    if let Some(port) = port {
        url.push(':');
        url.push_str(port);
    }
    url.push_str(path);
    if let Some(query) = &query {
        url.push('?');
        url.push_str(query);
    }

    Ok(url)
}

/// Splits the post-scheme remainder into authority and the rest
/// (path + query).
fn split_authority(rest: &str) -> (&str, &str) {
    match rest.find(['/', '?']) {
        Some(end) => (&rest[..end], &rest[end..]),
        None => (rest, ""),
    }
}

/// Moves inline credentials into the query string without duplicating
/// keys already present and preserving existing parameter order.
fn append_credentials_if_needed(raw_query: Option<&str>, user_info: Option<&str>) -> Option<String> {
    let user_info = match user_info.filter(|u| !u.trim().is_empty()) {
        Some(u) => u,
        None => return raw_query.filter(|q| !q.is_empty()).map(str::to_string),
    };
    let (user, password) = match user_info.split_once(':') {
        Some((u, p)) => (u, p),
        None => (user_info, ""),
    };

    let existing_keys: Vec<&str> = raw_query
        .unwrap_or("")
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| part.split_once('=').map_or(part, |(k, _)| k))
        .collect();

    let mut query = raw_query.unwrap_or("").to_string();
    if !existing_keys.contains(&"user") && !user.trim().is_empty() {
        append_query_param(&mut query, "user", user);
    }
    if !existing_keys.contains(&"password") && !password.trim().is_empty() {
        append_query_param(&mut query, "password", password);
    }

    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

fn append_query_param(query: &mut String, key: &str, value: &str) {
    if !query.is_empty() {
        query.push('&');
    }
    query.push_str(key);
    query.push('=');
    query.push_str(value);
}

// ════════════════════════════════════════════════════════════════════════════
// Cloud SQL socket detection
// ════════════════════════════════════════════════════════════════════════════

/// Finds a unix socket path in the URL's query string: a `host`
/// parameter under `/cloudsql/`, or any non-blank `unixSocketPath`.
fn extract_unix_socket_path(url: &str) -> Option<String> {
    let raw_query = url.split_once('?').map(|(_, q)| q)?;

    if let Some(host) = extract_query_param(raw_query, "host") {
        let decoded = percent_decode(&host);
        if decoded.starts_with(CLOUD_SQL_PREFIX) {
            return Some(decoded);
        }
    }

    extract_query_param(raw_query, "unixSocketPath")
        .map(|v| percent_decode(&v))
        .filter(|v| !v.trim().is_empty())
}

/// `/cloudsql/<instance-connection-name>` → the instance name.
fn extract_cloud_sql_instance(unix_socket_path: &str) -> Option<String> {
    let instance = unix_socket_path.strip_prefix(CLOUD_SQL_PREFIX)?;
    if instance.trim().is_empty() {
        None
    } else {
        Some(instance.to_string())
    }
}

fn extract_query_param(raw_query: &str, key: &str) -> Option<String> {
    raw_query
        .split('&')
        .filter_map(|part| part.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

/// Decodes `%XX` escapes and `+` as space. Malformed escapes are kept
/// verbatim, matching lenient platform decoders.
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                out.push(hex_val(bytes[i + 1]) << 4 | hex_val(bytes[i + 2]));
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn is_non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_cloud_run() -> CloudRunEnv {
        CloudRunEnv::default()
    }

    fn on_cloud_run() -> CloudRunEnv {
        CloudRunEnv {
            service: Some("lamp-control".to_string()),
            revision: None,
        }
    }

    fn normalize(raw: &str) -> ConnectionTarget {
        normalize_database_url_in(raw, &no_cloud_run()).unwrap()
    }

    #[test]
    fn driver_form_passes_through_unchanged() {
        let raw = "postgresql://db.example.com:5432/lamps?user=lamp&password=secret";
        assert_eq!(normalize(raw).url, raw);
    }

    #[test]
    fn postgres_scheme_with_credentials_is_rewritten() {
        let target = normalize("postgres://user:pw@host:5432/db");
        assert_eq!(target.url, "postgresql://host:5432/db?user=user&password=pw");
    }

    #[test]
    fn postgresql_scheme_with_credentials_is_rewritten() {
        let target = normalize("postgresql://user:pw@host:5432/db");
        assert_eq!(target.url, "postgresql://host:5432/db?user=user&password=pw");
    }

    #[test]
    fn existing_query_params_keep_their_order() {
        let target = normalize("postgres://u:p@h/db?sslmode=require&connect_timeout=5");
        assert_eq!(
            target.url,
            "postgresql://h/db?sslmode=require&connect_timeout=5&user=u&password=p"
        );
    }

    #[test]
    fn present_credentials_keys_are_not_duplicated() {
        let target = normalize("postgres://u:p@h/db?user=other");
        assert_eq!(target.url, "postgresql://h/db?user=other&password=p");
    }

    #[test]
    fn postgres_scheme_without_credentials_keeps_query() {
        let target = normalize("postgres://host:5432/db?sslmode=require");
        assert_eq!(target.url, "postgresql://host:5432/db?sslmode=require");
    }

    #[test]
    fn missing_host_defaults_to_localhost() {
        let target = normalize("postgres://u:p@/db");
        assert_eq!(target.url, "postgresql://localhost/db?user=u&password=p");
    }

    #[test]
    fn missing_path_defaults_to_root() {
        let target = normalize("postgres://u:p@host:5432");
        assert_eq!(target.url, "postgresql://host:5432/?user=u&password=p");
    }

    #[test]
    fn port_is_omitted_when_absent() {
        let target = normalize("postgres://u:p@host/db");
        assert_eq!(target.url, "postgresql://host/db?user=u&password=p");
    }

    #[test]
    fn user_without_password_appends_only_user() {
        let target = normalize("postgres://justuser@host/db");
        assert_eq!(target.url, "postgresql://host/db?user=justuser");
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = normalize_database_url_in("postgres://u:p@host:abc/db", &no_cloud_run());
        assert!(err.is_err());
    }

    #[test]
    fn unknown_scheme_passes_through() {
        let raw = "mysql://host/db";
        assert_eq!(normalize(raw).url, raw);
    }

    #[test]
    fn cloud_sql_host_param_yields_socket_and_instance() {
        let target = normalize(
            "postgresql://localhost/db?host=/cloudsql/proj:region:inst&user=u&password=p",
        );
        assert_eq!(
            target.unix_socket_path.as_deref(),
            Some("/cloudsql/proj:region:inst")
        );
        assert_eq!(
            target.cloud_sql_instance.as_deref(),
            Some("proj:region:inst")
        );
        assert!(!target.lazy_refresh);
    }

    #[test]
    fn cloud_sql_host_param_decodes_percent_escapes() {
        let target =
            normalize("postgresql://localhost/db?host=%2Fcloudsql%2Fproj%3Aregion%3Ainst");
        assert_eq!(
            target.unix_socket_path.as_deref(),
            Some("/cloudsql/proj:region:inst")
        );
    }

    #[test]
    fn unix_socket_path_param_is_honored() {
        let target = normalize("postgresql://localhost/db?unixSocketPath=/var/run/postgres");
        assert_eq!(
            target.unix_socket_path.as_deref(),
            Some("/var/run/postgres")
        );
        // Not under /cloudsql/: no instance name.
        assert!(target.cloud_sql_instance.is_none());
    }

    #[test]
    fn host_param_outside_cloudsql_is_ignored() {
        let target = normalize("postgresql://localhost/db?host=example.com");
        assert!(target.unix_socket_path.is_none());
    }

    #[test]
    fn bare_cloudsql_prefix_yields_no_instance() {
        let target = normalize("postgresql://localhost/db?host=/cloudsql/");
        assert_eq!(target.unix_socket_path.as_deref(), Some("/cloudsql/"));
        assert!(target.cloud_sql_instance.is_none());
    }

    #[test]
    fn lazy_refresh_requires_cloud_run_markers() {
        let raw = "postgresql://localhost/db?host=/cloudsql/proj:region:inst";

        let off = normalize_database_url_in(raw, &no_cloud_run()).unwrap();
        assert!(!off.lazy_refresh);

        let on = normalize_database_url_in(raw, &on_cloud_run()).unwrap();
        assert!(on.lazy_refresh);
    }

    #[test]
    fn lazy_refresh_not_set_for_tcp_targets() {
        let target =
            normalize_database_url_in("postgres://u:p@host:5432/db", &on_cloud_run()).unwrap();
        assert!(!target.lazy_refresh);
    }

    #[test]
    fn blank_cloud_run_markers_do_not_count() {
        let env = CloudRunEnv {
            service: Some("  ".to_string()),
            revision: Some(String::new()),
        };
        assert!(!env.is_cloud_run());
    }

    #[test]
    fn first_non_blank_skips_blank_and_missing() {
        let resolved = first_non_blank([
            None,
            Some("  ".to_string()),
            Some("postgres://a/b".to_string()),
            Some("postgres://c/d".to_string()),
        ]);
        assert_eq!(resolved.as_deref(), Some("postgres://a/b"));
    }

    #[test]
    fn percent_decode_handles_plus_and_escapes() {
        assert_eq!(percent_decode("a+b%2Fc"), "a b/c");
        assert_eq!(percent_decode("no-escapes"), "no-escapes");
        assert_eq!(percent_decode("bad%zz"), "bad%zz");
    }

    proptest! {
        #[test]
        fn normalized_urls_always_use_driver_scheme(
            user in "[a-z][a-z0-9]{0,8}",
            pw in "[a-z0-9]{1,8}",
            host in "[a-z][a-z0-9.-]{0,12}",
            port in 1u16..=65535,
            db in "[a-z][a-z0-9_]{0,8}",
        ) {
            let raw = format!("postgres://{}:{}@{}:{}/{}", user, pw, host, port, db);
            let target = normalize_database_url_in(&raw, &no_cloud_run()).unwrap();

            prop_assert!(target.url.starts_with("postgresql://"));
            prop_assert!(!target.url.contains('@'));
            prop_assert_eq!(
                target.url,
                format!("postgresql://{}:{}/{}?user={}&password={}", host, port, db, user, pw)
            );
        }

        #[test]
        fn normalization_is_idempotent(
            user in "[a-z][a-z0-9]{0,8}",
            host in "[a-z][a-z0-9.-]{0,12}",
            db in "[a-z][a-z0-9_]{0,8}",
        ) {
            let raw = format!("postgres://{}@{}/{}", user, host, db);
            let once = normalize_database_url_in(&raw, &no_cloud_run()).unwrap();
            let twice = normalize_database_url_in(&once.url, &no_cloud_run()).unwrap();
            prop_assert_eq!(once.url, twice.url);
        }
    }
}
