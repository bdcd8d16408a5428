/*!
# Catalog Queries

A small placeholder query language over catalog rows:

```text
lower_name LIKE ? AND group = ?
```

Clauses are `field = ?` or `field LIKE ?` joined by `AND`. `LIKE` patterns
use `%` as the wildcard and ignore case, as does `=` on text. Values are
never inlined; every clause binds exactly one search term, and the number
of placeholders must equal the number of terms before anything else is
looked at.
*/

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::record::ParameterRecord;
use crate::core::{CatalogError, CatalogResult};

static AND_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

static CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*(\w+)\s*(=|like)\s*\?\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    LowerName,
    Dtype,
    Default,
    Dim,
    Order,
    Group,
    Doc,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::LowerName => "lower_name",
            Field::Dtype => "dtype",
            Field::Default => "default",
            Field::Dim => "dim",
            Field::Order => "order",
            Field::Group => "group",
            Field::Doc => "doc",
        }
    }

    /// Text of this field as stored in the catalog row
    pub fn value_of(self, record: &ParameterRecord) -> String {
        match self {
            Field::Name => record.name().to_string(),
            Field::LowerName => record.lower_name().to_string(),
            Field::Dtype => record.dtype().tag().to_string(),
            Field::Default => record.default.to_default_string(),
            Field::Dim => record.dim.to_string(),
            Field::Order => record.order.to_string(),
            Field::Group => record.group.clone(),
            Field::Doc => record.doc.clone(),
        }
    }
}

impl FromStr for Field {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "lower_name" => Ok(Field::LowerName),
            "dtype" => Ok(Field::Dtype),
            "default" => Ok(Field::Default),
            "dim" => Ok(Field::Dim),
            "order" => Ok(Field::Order),
            "group" | "namelist" => Ok(Field::Group),
            "doc" => Ok(Field::Doc),
            other => Err(CatalogError::InvalidQuery(format!("unknown field '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Like,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub field: Field,
    pub op: Op,
}

/// Parsed query template, not yet bound to terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    clauses: Vec<Clause>,
}

/// Number of `?` placeholders in a template
pub fn count_placeholders(template: &str) -> usize {
    template.matches('?').count()
}

impl Query {
    pub fn parse(template: &str) -> CatalogResult<Self> {
        if template.trim().is_empty() {
            return Err(CatalogError::InvalidQuery("empty query".to_string()));
        }

        let mut clauses = Vec::new();
        for part in AND_SPLIT.split(template.trim()) {
            let caps = CLAUSE.captures(part).ok_or_else(|| {
                CatalogError::InvalidQuery(format!("expected 'field = ?' or 'field LIKE ?', got '{}'", part.trim()))
            })?;
            let field = Field::from_str(&caps[1])?;
            let op = if caps[2].eq_ignore_ascii_case("like") {
                Op::Like
            } else {
                Op::Eq
            };
            clauses.push(Clause { field, op });
        }
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Checks the placeholder count, then parses and binds
    pub fn prepare<S: AsRef<str>>(template: &str, terms: &[S]) -> CatalogResult<BoundQuery> {
        let placeholders = count_placeholders(template);
        if placeholders != terms.len() {
            return Err(CatalogError::PlaceholderMismatch {
                placeholders,
                terms: terms.len(),
            });
        }
        Self::parse(template)?.bind(terms)
    }

    pub fn bind<S: AsRef<str>>(&self, terms: &[S]) -> CatalogResult<BoundQuery> {
        if self.clauses.len() != terms.len() {
            return Err(CatalogError::PlaceholderMismatch {
                placeholders: self.clauses.len(),
                terms: terms.len(),
            });
        }

        let mut matchers = Vec::with_capacity(terms.len());
        for (clause, term) in self.clauses.iter().zip(terms) {
            let term = term.as_ref();
            let matcher = match clause.op {
                Op::Eq => Matcher::Equals(term.to_lowercase()),
                Op::Like => Matcher::Like(like_to_regex(term)?),
            };
            matchers.push((clause.field, matcher));
        }
        Ok(BoundQuery { matchers })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| {
                let op = match c.op {
                    Op::Eq => "=",
                    Op::Like => "LIKE",
                };
                format!("{} {} ?", c.field.as_str(), op)
            })
            .collect();
        write!(f, "{}", parts.join(" AND "))
    }
}

/// Anchored, case-insensitive regex for a `%` pattern
pub fn like_to_regex(pattern: &str) -> CatalogResult<Regex> {
    let body: Vec<String> = pattern.split('%').map(regex::escape).collect();
    Regex::new(&format!("(?is)^{}$", body.join(".*")))
        .map_err(|e| CatalogError::InvalidQuery(format!("bad LIKE pattern '{}': {}", pattern, e)))
}

#[derive(Debug, Clone)]
enum Matcher {
    Equals(String),
    Like(Regex),
}

/// A query with its terms bound, ready to filter records
#[derive(Debug, Clone)]
pub struct BoundQuery {
    matchers: Vec<(Field, Matcher)>,
}

impl BoundQuery {
    pub fn matches(&self, record: &ParameterRecord) -> bool {
        self.matchers.iter().all(|(field, matcher)| {
            let value = field.value_of(record);
            match matcher {
                Matcher::Equals(term) => value.to_lowercase() == *term,
                Matcher::Like(regex) => regex.is_match(&value),
            }
        })
    }
}

/// Records of a built catalog with a lowercase-name index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ParameterRecord>,
    by_lower_name: HashMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn new(records: Vec<ParameterRecord>) -> Self {
        let mut by_lower_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            by_lower_name
                .entry(record.lower_name().to_string())
                .or_default()
                .push(idx);
        }
        Self {
            records,
            by_lower_name,
        }
    }

    pub fn records(&self) -> &[ParameterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group names in first-seen order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for record in &self.records {
            if !groups.contains(&record.group.as_str()) {
                groups.push(&record.group);
            }
        }
        groups
    }

    /// Records of one group, those with defaults first in default order
    pub fn group_records(&self, group: &str) -> Vec<&ParameterRecord> {
        let mut records: Vec<&ParameterRecord> =
            self.records.iter().filter(|r| r.group == group).collect();
        records.sort_by_key(|r| (!r.has_default(), r.order));
        records
    }

    /// All records of a name, any group, any case
    pub fn lookup(&self, name: &str) -> Vec<&ParameterRecord> {
        self.by_lower_name
            .get(&name.to_lowercase())
            .map(|idxs| idxs.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// First record of a name, optionally restricted to a group
    pub fn find(&self, name: &str, group: Option<&str>) -> CatalogResult<&ParameterRecord> {
        self.lookup(name)
            .into_iter()
            .find(|r| group.map_or(true, |g| r.group == g))
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }

    /// Records matching a placeholder query, in catalog order
    pub fn search<S: AsRef<str>>(&self, template: &str, terms: &[S]) -> CatalogResult<Vec<&ParameterRecord>> {
        let query = Query::prepare(template, terms)?;
        Ok(self.records.iter().filter(|r| query.matches(r)).collect())
    }

    /// Names containing `fragment`
    pub fn search_name(&self, fragment: &str, group: Option<&str>) -> CatalogResult<Vec<&ParameterRecord>> {
        self.search_field("lower_name", fragment, group)
    }

    /// Documentation containing `fragment`
    pub fn search_doc(&self, fragment: &str, group: Option<&str>) -> CatalogResult<Vec<&ParameterRecord>> {
        self.search_field("doc", fragment, group)
    }

    fn search_field(&self, field: &str, fragment: &str, group: Option<&str>) -> CatalogResult<Vec<&ParameterRecord>> {
        let pattern = format!("%{}%", fragment);
        match group {
            Some(group) => self.search(&format!("{} LIKE ? AND group = ?", field), &[pattern.as_str(), group]),
            None => self.search(&format!("{} LIKE ?", field), &[pattern.as_str()]),
        }
    }
}
