//! Location normalization and navigation history.

use std::fmt;

use url::Url;

/// Normalized route path such as `/photo`. The empty route stands for "no
/// location" and resolves to the router's fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Route(String);

impl Route {
    /// Normalizes a location.
    ///
    /// Accepts hash locations (`#/photo`), bare paths (`/photo`, `photo`) and
    /// full URLs, in which case the fragment is used when present and the path
    /// otherwise. Query strings and trailing slashes are dropped and the result
    /// is lowercased. `""`, `"#"` and `"/"` yield the empty route.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let raw = if trimmed.contains("://") {
            match Url::parse(trimmed) {
                Ok(url) => url
                    .fragment()
                    .map(str::to_string)
                    .unwrap_or_else(|| url.path().to_string()),
                Err(_) => trimmed.to_string(),
            }
        } else {
            trimmed.to_string()
        };

        let without_hash = raw.trim_start_matches('#');
        let without_query = without_hash
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments = without_query
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        if segments.is_empty() {
            return Self::default();
        }
        Self(format!("/{}", segments.join("/")).to_ascii_lowercase())
    }

    /// Path text (`""` for the empty route).
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty route.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Linear back/forward history of activated routes.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Route>,
    cursor: usize,
}

impl History {
    /// Records a new activation, discarding forward entries.
    pub fn push(&mut self, route: Route) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(route);
        self.cursor = self.entries.len() - 1;
    }

    /// Moves one entry back.
    pub fn back(&mut self) -> Option<Route> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Moves one entry forward.
    pub fn forward(&mut self) -> Option<Route> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&Route> {
        self.entries.get(self.cursor)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` before the first activation.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
