#![deny(missing_docs)]

//! # Operation Policies
//!
//! Reads cross-cutting operation metadata from `x-` extensions and the standard
//! `security` keyword.
//!
//! Extensions are looked up operation first, then path item, then document. The first
//! level that declares a key wins wholesale; `false` or `null` there disables the policy.

use crate::error::{AppError, AppResult};
use crate::oas::document::{OpenApiDocument, OperationEntry};
use crate::oas::shims::{SecurityRequirementMap, ShimSecurityScheme};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response caching extension key.
pub const X_CACHE: &str = "x-cache";
/// Client retry extension key.
pub const X_RETRY: &str = "x-retry";
/// Authorization policy extension key.
pub const X_AUTHORIZATION: &str = "x-authorization";
/// Anonymous access extension key.
pub const X_ALLOW_ANONYMOUS: &str = "x-allow-anonymous";

/// The scope an extension value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PolicyLevel {
    /// Root of the document.
    Document,
    /// Path Item.
    PathItem,
    /// Operation.
    Operation,
}

/// The extension maps visible to one operation, most specific first.
#[derive(Debug, Clone)]
pub struct ExtensionScope<'a> {
    levels: Vec<(PolicyLevel, &'a BTreeMap<String, Value>)>,
}

impl<'a> ExtensionScope<'a> {
    /// The scope of an operation inside `doc`.
    pub fn for_operation(doc: &'a OpenApiDocument, entry: &OperationEntry<'a>) -> Self {
        Self {
            levels: vec![
                (PolicyLevel::Operation, &entry.operation.extensions),
                (PolicyLevel::PathItem, &entry.path_item.extensions),
                (PolicyLevel::Document, &doc.shim.extensions),
            ],
        }
    }

    /// A scope made of explicit levels, most specific first.
    pub fn from_levels(levels: Vec<(PolicyLevel, &'a BTreeMap<String, Value>)>) -> Self {
        Self { levels }
    }

    /// The most specific raw value for `key`, with its level.
    pub fn lookup(&self, key: &str) -> Option<(PolicyLevel, &'a Value)> {
        self.levels
            .iter()
            .find_map(|(level, map)| map.get(key).map(|value| (*level, value)))
    }
}

/// A typed extension value and the level it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoped<T> {
    /// The parsed value.
    pub value: T,
    /// Where it was declared.
    pub level: PolicyLevel,
}

/// Reads `key` from the most specific level that declares it.
///
/// Returns `Ok(None)` when no level declares it, or when the winning level sets it to
/// `false` or `null`.
pub fn read_extension<T: DeserializeOwned>(
    scope: &ExtensionScope<'_>,
    key: &str,
) -> AppResult<Option<Scoped<T>>> {
    let Some((level, raw)) = scope.lookup(key) else {
        return Ok(None);
    };
    if matches!(raw, Value::Null | Value::Bool(false)) {
        tracing::debug!(key, ?level, "extension disabled");
        return Ok(None);
    }
    let value = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::invalid_extension(key, e.to_string()))?;
    tracing::debug!(key, ?level, "read extension");
    Ok(Some(Scoped { value, level }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCachePolicy {
    Ttl(u64),
    Detailed(DetailedCachePolicy),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DetailedCachePolicy {
    ttl_seconds: u64,
    #[serde(default)]
    vary_by_query: Vec<String>,
    #[serde(default)]
    vary_by_header: Vec<String>,
    #[serde(default)]
    private: bool,
}

/// Response caching (`x-cache`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCachePolicy")]
pub struct CachePolicy {
    /// Lifetime of a cached response.
    pub ttl_seconds: u64,
    /// Query parameters that partition the cache.
    pub vary_by_query: Vec<String>,
    /// Request headers that partition the cache.
    pub vary_by_header: Vec<String>,
    /// Per-user cache only.
    pub private: bool,
}

impl From<RawCachePolicy> for CachePolicy {
    fn from(raw: RawCachePolicy) -> Self {
        match raw {
            RawCachePolicy::Ttl(ttl_seconds) => CachePolicy {
                ttl_seconds,
                vary_by_query: Vec::new(),
                vary_by_header: Vec::new(),
                private: false,
            },
            RawCachePolicy::Detailed(d) => CachePolicy {
                ttl_seconds: d.ttl_seconds,
                vary_by_query: d.vary_by_query,
                vary_by_header: d.vary_by_header,
                private: d.private,
            },
        }
    }
}

/// Delay growth between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Delay doubles after each attempt.
    #[default]
    Exponential,
    /// Constant delay.
    Fixed,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRetryPolicy {
    Attempts(i64),
    Detailed(DetailedRetryPolicy),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DetailedRetryPolicy {
    #[serde(default = "default_max_attempts")]
    max_attempts: i64,
    #[serde(default = "default_delay_ms")]
    delay_ms: u64,
    #[serde(default)]
    backoff: Backoff,
    #[serde(default = "default_retry_on")]
    retry_on: Vec<u16>,
}

fn default_max_attempts() -> i64 {
    3
}

fn default_delay_ms() -> u64 {
    200
}

fn default_retry_on() -> Vec<u16> {
    vec![408, 429, 502, 503, 504]
}

/// Client retry behaviour (`x-retry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRetryPolicy")]
pub struct RetryPolicy {
    /// Total attempts including the first; at least 1.
    pub max_attempts: u32,
    /// Initial delay between attempts.
    pub delay_ms: u64,
    /// Delay growth.
    pub backoff: Backoff,
    /// Status codes that trigger a retry.
    pub retry_on: Vec<u16>,
}

impl TryFrom<RawRetryPolicy> for RetryPolicy {
    type Error = String;

    fn try_from(raw: RawRetryPolicy) -> Result<Self, Self::Error> {
        let detailed = match raw {
            RawRetryPolicy::Attempts(max_attempts) => DetailedRetryPolicy {
                max_attempts,
                delay_ms: default_delay_ms(),
                backoff: Backoff::default(),
                retry_on: default_retry_on(),
            },
            RawRetryPolicy::Detailed(d) => d,
        };
        let max_attempts = u32::try_from(detailed.max_attempts)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| {
                format!(
                    "maxAttempts must be at least 1, got {}",
                    detailed.max_attempts
                )
            })?;
        Ok(RetryPolicy {
            max_attempts,
            delay_ms: detailed.delay_ms,
            backoff: detailed.backoff,
            retry_on: detailed.retry_on,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAuthorization {
    Policy(String),
    Detailed(DetailedAuthorization),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DetailedAuthorization {
    #[serde(default)]
    policy: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

/// Server-side authorization requirement (`x-authorization`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAuthorization")]
pub struct AuthorizationPolicy {
    /// Named policy.
    pub policy: Option<String>,
    /// Roles, any of which grants access.
    pub roles: Vec<String>,
}

impl From<RawAuthorization> for AuthorizationPolicy {
    fn from(raw: RawAuthorization) -> Self {
        match raw {
            RawAuthorization::Policy(policy) => AuthorizationPolicy {
                policy: Some(policy),
                roles: Vec::new(),
            },
            RawAuthorization::Detailed(d) => AuthorizationPolicy {
                policy: d.policy,
                roles: d.roles,
            },
        }
    }
}

/// The kind of a declared security scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SecuritySchemeKind {
    /// API key in a header, query parameter or cookie.
    ApiKey {
        /// Header / query / cookie name.
        name: String,
        /// `header`, `query` or `cookie`.
        location: String,
    },
    /// HTTP authentication.
    Http {
        /// `basic`, `bearer`, ...
        scheme: String,
        /// Token format hint.
        bearer_format: Option<String>,
    },
    /// OAuth 2.0.
    OAuth2,
    /// OpenID Connect discovery.
    OpenIdConnect,
    /// Mutual TLS.
    MutualTls,
}

impl From<&ShimSecurityScheme> for SecuritySchemeKind {
    fn from(scheme: &ShimSecurityScheme) -> Self {
        match scheme {
            ShimSecurityScheme::ApiKey(key) => SecuritySchemeKind::ApiKey {
                name: key.name.clone(),
                location: key.location.clone(),
            },
            ShimSecurityScheme::Http(http) => SecuritySchemeKind::Http {
                scheme: http.scheme.to_ascii_lowercase(),
                bearer_format: http.bearer_format.clone(),
            },
            ShimSecurityScheme::OAuth2(_) => SecuritySchemeKind::OAuth2,
            ShimSecurityScheme::OpenIdConnect(_) => SecuritySchemeKind::OpenIdConnect,
            ShimSecurityScheme::MutualTls(_) => SecuritySchemeKind::MutualTls,
        }
    }
}

/// One scheme inside a security requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeUse {
    /// Scheme name in `components.securitySchemes`.
    pub name: String,
    /// Resolved kind.
    pub kind: SecuritySchemeKind,
    /// Required scopes.
    pub scopes: Vec<String>,
}

/// Effective `security` of an operation.
///
/// `requirements` are alternatives; the schemes inside one requirement all apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityPolicy {
    /// Non-empty requirements.
    pub requirements: Vec<Vec<SchemeUse>>,
    /// Anonymous access allowed (`security: []` or an empty requirement).
    pub anonymous: bool,
    /// Where `security` was declared.
    pub level: PolicyLevel,
}

/// Resolves the effective `security` of an operation.
pub fn read_security(
    doc: &OpenApiDocument,
    entry: &OperationEntry<'_>,
) -> AppResult<Option<SecurityPolicy>> {
    let (level, requirements) = match (&entry.operation.security, &doc.shim.security) {
        (Some(own), _) => (PolicyLevel::Operation, own),
        (None, Some(global)) => (PolicyLevel::Document, global),
        (None, None) => return Ok(None),
    };

    let mut policy = SecurityPolicy {
        requirements: Vec::new(),
        anonymous: requirements.is_empty(),
        level,
    };
    for requirement in requirements {
        if requirement.is_empty() {
            policy.anonymous = true;
            continue;
        }
        policy.requirements.push(resolve_requirement(doc, requirement)?);
    }
    tracing::debug!(?level, anonymous = policy.anonymous, "read security");
    Ok(Some(policy))
}

fn resolve_requirement(
    doc: &OpenApiDocument,
    requirement: &SecurityRequirementMap,
) -> AppResult<Vec<SchemeUse>> {
    requirement
        .iter()
        .map(|(name, scopes)| {
            let scheme = doc
                .shim
                .components
                .security_schemes
                .get(name)
                .ok_or_else(|| {
                    AppError::UnresolvedReference(format!(
                        "#/components/securitySchemes/{}",
                        name
                    ))
                })?;
            Ok(SchemeUse {
                name: name.clone(),
                kind: scheme.into(),
                scopes: scopes.clone(),
            })
        })
        .collect()
}

/// Every policy attached to one operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OperationPolicies {
    /// `x-cache`.
    pub cache: Option<Scoped<CachePolicy>>,
    /// `x-retry`.
    pub retry: Option<Scoped<RetryPolicy>>,
    /// `security`.
    pub security: Option<SecurityPolicy>,
    /// `x-authorization`.
    pub authorization: Option<Scoped<AuthorizationPolicy>>,
    /// `x-allow-anonymous`.
    pub allow_anonymous: bool,
}

impl OperationPolicies {
    /// Reads every policy for an operation.
    pub fn read(doc: &OpenApiDocument, entry: &OperationEntry<'_>) -> AppResult<Self> {
        let scope = ExtensionScope::for_operation(doc, entry);
        Ok(Self {
            cache: read_extension(&scope, X_CACHE)?,
            retry: read_extension(&scope, X_RETRY)?,
            security: read_security(doc, entry)?,
            authorization: read_extension(&scope, X_AUTHORIZATION)?,
            allow_anonymous: read_extension::<bool>(&scope, X_ALLOW_ANONYMOUS)?
                .is_some_and(|s| s.value),
        })
    }

    /// Whether a caller must authenticate.
    pub fn requires_auth(&self) -> bool {
        if self.allow_anonymous {
            return false;
        }
        let secured = self
            .security
            .as_ref()
            .is_some_and(|s| !s.anonymous && !s.requirements.is_empty());
        secured || self.authorization.is_some()
    }
}
