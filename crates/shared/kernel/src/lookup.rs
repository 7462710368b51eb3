//! Name resolution seam and the response schema of the lookup service.
//!
//! The host never talks to the lookup service directly: commands receive a
//! [`NameResolver`] and await its [`LookupFuture`] from a background task.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tracing::debug;

#[harbor_derive::harbor_error]
pub enum LookupError {
    /// The body could not be decoded into candidates.
    #[error("Malformed lookup response{}: {message}", format_context(.context))]
    Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Lookup service unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Lookup catalog I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

/// What kind of entity a query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupCategory {
    World,
    Character,
    Item,
}

impl Display for LookupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::World => "world",
            Self::Character => "character",
            Self::Item => "item",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupCandidate {
    pub id: u32,
    pub name: String,
}

impl LookupCandidate {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

pub type LookupFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<LookupCandidate>, LookupError>> + Send + 'a>>;

/// Resolves a human-entered name to ranked candidates, best first.
///
/// An empty result is a normal outcome, not an error.
pub trait NameResolver: Debug + Send + Sync {
    fn resolve<'a>(&'a self, query: &'a str, category: LookupCategory) -> LookupFuture<'a>;
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    id: Option<u32>,
    name: Option<String>,
}

/// Wire schema of a lookup reply: `{"results":[{"id":..,"name":..}]}`.
#[derive(Debug, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    results: Vec<RawCandidate>,
}

impl LookupResponse {
    /// Validates a reply body and returns its candidates in order.
    ///
    /// A blank body or an empty `results` array yields no candidates.
    ///
    /// # Errors
    /// [`LookupError::Malformed`] for invalid JSON or a candidate lacking an
    /// id or a name.
    pub fn decode(body: &str) -> Result<Vec<LookupCandidate>, LookupError> {
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response: Self = serde_json::from_str(body)
            .map_err(|e| LookupError::Malformed { message: e.to_string().into(), context: None })?;

        response
            .results
            .into_iter()
            .enumerate()
            .map(|(index, raw)| match (raw.id, raw.name) {
                (Some(id), Some(name)) if !name.trim().is_empty() => Ok(LookupCandidate { id, name }),
                _ => Err(LookupError::Malformed {
                    message: format!("candidate #{index} is missing an id or a name").into(),
                    context: None,
                }),
            })
            .collect()
    }
}

/// Resolver over a fixed, in-memory catalog.
///
/// Ranking: exact (case-insensitive) name matches first, then names starting
/// with the query, then names containing it. Catalog order breaks ties.
#[derive(Debug, Default, Clone)]
pub struct CatalogResolver {
    catalog: FxHashMap<LookupCategory, Vec<LookupCandidate>>,
}

impl CatalogResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, category: LookupCategory, candidates: Vec<LookupCandidate>) -> Self {
        self.catalog.entry(category).or_default().extend(candidates);
        self
    }

    /// Reads a catalog file shaped as `{"world":{"results":[..]}, ..}`.
    ///
    /// # Errors
    /// [`LookupError::Io`] when the file cannot be read, [`LookupError::Malformed`]
    /// when any section fails [`LookupResponse::decode`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .context(format!("Reading catalog {}", path.display()))?;

        let sections: FxHashMap<LookupCategory, serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| LookupError::Malformed { message: e.to_string().into(), context: None })?;

        let mut resolver = Self::new();
        for (category, section) in sections {
            let candidates = LookupResponse::decode(&section.to_string())
                .context(format!("Catalog section '{category}'"))?;
            resolver = resolver.with(category, candidates);
        }

        debug!(path = %path.display(), categories = resolver.catalog.len(), "Lookup catalog loaded");
        Ok(resolver)
    }

    fn rank(&self, query: &str, category: LookupCategory) -> Vec<LookupCandidate> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(u8, &LookupCandidate)> = self
            .catalog
            .get(&category)
            .into_iter()
            .flatten()
            .filter_map(|candidate| {
                let name = candidate.name.to_lowercase();
                let score = if name == query {
                    0
                } else if name.starts_with(&query) {
                    1
                } else if name.contains(&query) {
                    2
                } else {
                    return None;
                };
                Some((score, candidate))
            })
            .collect();

        ranked.sort_by_key(|(score, _)| *score);
        ranked.into_iter().map(|(_, candidate)| candidate.clone()).collect()
    }
}

impl NameResolver for CatalogResolver {
    fn resolve<'a>(&'a self, query: &'a str, category: LookupCategory) -> LookupFuture<'a> {
        Box::pin(async move { Ok(self.rank(query, category)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_valid_and_empty_bodies() {
        let body = r#"{"results":[{"id":73,"name":"Ifrit"},{"id":74,"name":"Ifrit II"}]}"#;
        let candidates = LookupResponse::decode(body).unwrap();
        assert_eq!(candidates, [LookupCandidate::new(73, "Ifrit"), LookupCandidate::new(74, "Ifrit II")]);

        assert!(LookupResponse::decode("").unwrap().is_empty());
        assert!(LookupResponse::decode("  \n").unwrap().is_empty());
        assert!(LookupResponse::decode(r#"{"results":[]}"#).unwrap().is_empty());
        assert!(LookupResponse::decode("{}").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_bodies() {
        assert!(matches!(LookupResponse::decode("{not json"), Err(LookupError::Malformed { .. })));
        assert!(matches!(
            LookupResponse::decode(r#"{"results":[{"id":1}]}"#),
            Err(LookupError::Malformed { .. })
        ));
        assert!(matches!(
            LookupResponse::decode(r#"{"results":[{"name":"Ifrit"}]}"#),
            Err(LookupError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_catalog_ranks_exact_then_prefix_then_contains() {
        let resolver = CatalogResolver::new().with(
            LookupCategory::World,
            vec![
                LookupCandidate::new(1, "Great Ifrit"),
                LookupCandidate::new(2, "Ifrit Prime"),
                LookupCandidate::new(3, "ifrit"),
            ],
        );

        let found = resolver.resolve("Ifrit", LookupCategory::World).await.unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, [3, 2, 1]);

        assert!(resolver.resolve("Ifrit", LookupCategory::Item).await.unwrap().is_empty());
        assert!(resolver.resolve("  ", LookupCategory::World).await.unwrap().is_empty());
    }

    #[test]
    fn test_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"world":{{"results":[{{"id":73,"name":"Ifrit"}}]}}}}"#).unwrap();

        let resolver = CatalogResolver::from_file(file.path()).unwrap();
        assert_eq!(resolver.rank("ifrit", LookupCategory::World), [LookupCandidate::new(73, "Ifrit")]);

        let err = CatalogResolver::from_file("/no/such/catalog.json").unwrap_err();
        assert!(matches!(err, LookupError::Io { .. }));
    }
}
