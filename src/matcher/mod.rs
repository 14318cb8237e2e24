// src/matcher/mod.rs
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser};
use tantivy::schema::{Field, Schema, Value as _, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, TantivyDocument};
use tracing::{debug, warn};

use crate::config::MatchingConfig;
use crate::input;
use crate::models::Result;

#[derive(Debug, Clone, Copy)]
struct CompanyFields {
    domain: Field,
    url: Field,
    commercial_name: Field,
    legal_name: Field,
    all_names: Field,
    phones: Field,
    social_media: Field,
    addresses: Field,
    profile: Field,
}

fn company_schema() -> (Schema, CompanyFields) {
    let mut builder = Schema::builder();
    let fields = CompanyFields {
        domain: builder.add_text_field("domain", TEXT | STORED),
        url: builder.add_text_field("url", TEXT),
        commercial_name: builder.add_text_field("company_commercial_name", TEXT),
        legal_name: builder.add_text_field("company_legal_name", TEXT),
        all_names: builder.add_text_field("company_all_available_names", TEXT),
        phones: builder.add_text_field("phones", TEXT),
        social_media: builder.add_text_field("social_media", TEXT),
        addresses: builder.add_text_field("addresses", TEXT),
        profile: builder.add_text_field("profile", STORED),
    };
    (builder.build(), fields)
}

impl CompanyFields {
    fn from_schema(schema: &Schema) -> Result<Self> {
        Ok(Self {
            domain: schema.get_field("domain")?,
            url: schema.get_field("url")?,
            commercial_name: schema.get_field("company_commercial_name")?,
            legal_name: schema.get_field("company_legal_name")?,
            all_names: schema.get_field("company_all_available_names")?,
            phones: schema.get_field("phones")?,
            social_media: schema.get_field("social_media")?,
            addresses: schema.get_field("addresses")?,
            profile: schema.get_field("profile")?,
        })
    }
}

/// Strip scheme, `www.` and any path so CSV domains and scraped urls key to
/// the same company.
pub fn normalize_domain(raw: &str) -> String {
    let s = raw.trim();
    let s = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .unwrap_or(s);
    let s = s.strip_prefix("www.").unwrap_or(s);
    s.split('/').next().unwrap_or("").to_ascii_lowercase()
}

/// Merge the company-names CSV with the scraped NDJSON output and load one
/// document per company into a fresh index. The index directory is wiped
/// first, so reruns are idempotent.
pub async fn build_index(config: &MatchingConfig, ndjson_path: &str) -> Result<usize> {
    let scraped = load_scraped_profiles(ndjson_path).await?;
    let (headers, rows) = input::read_rows(&config.company_csv_path).await?;
    let domain_idx = headers
        .iter()
        .position(|header| header == "domain")
        .ok_or_else(|| format!("{} has no 'domain' column", config.company_csv_path))?;

    let dir = Path::new(&config.index_dir);
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;

    let (schema, fields) = company_schema();
    let index = Index::create_in_dir(dir, schema)?;
    let mut writer: tantivy::IndexWriter = index.writer(50_000_000)?;

    let mut indexed = 0usize;
    for row in rows {
        let Some(raw_domain) = row.get(domain_idx) else {
            continue;
        };
        let domain = normalize_domain(raw_domain);
        if domain.is_empty() {
            continue;
        }

        // Company CSV columns first, scraped fields layered on top.
        let mut profile = Map::new();
        for (header, value) in headers.iter().zip(&row) {
            profile.insert(header.clone(), Value::String(value.clone()));
        }
        if let Some(scraped_record) = scraped.get(&domain) {
            if let Some(object) = scraped_record.as_object() {
                for (key, value) in object {
                    profile.insert(key.clone(), value.clone());
                }
            }
        }
        let profile = Value::Object(profile);

        let text = |key: &str| {
            profile
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let joined = |key: &str| {
            profile
                .get(key)
                .and_then(|v| v.as_array())
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        };

        writer.add_document(doc!(
            fields.domain => domain,
            fields.url => text("url"),
            fields.commercial_name => text("company_commercial_name"),
            fields.legal_name => text("company_legal_name"),
            fields.all_names => text("company_all_available_names"),
            fields.phones => joined("phones"),
            fields.social_media => joined("socialMedia"),
            fields.addresses => joined("addresses"),
            fields.profile => serde_json::to_string(&profile)?,
        ))?;
        indexed += 1;
    }

    writer.commit()?;
    Ok(indexed)
}

async fn load_scraped_profiles(path: &str) -> Result<HashMap<String, Value>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("No scraped output at {}, indexing company names only", path);
            String::new()
        }
        Err(err) => return Err(err.into()),
    };

    let mut profiles = HashMap::new();
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        let Ok(record) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        let Some(url) = record.get("url").and_then(|url| url.as_str()) else {
            continue;
        };
        profiles.insert(normalize_domain(url), record);
    }
    Ok(profiles)
}

/// A match request from the downstream collaborator. At least one field must
/// be present; the route rejects empty queries before they get here.
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub facebook: Option<String>,
}

impl MatchQuery {
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.website, &self.phone, &self.facebook]
            .iter()
            .all(|field| field.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

#[derive(Debug)]
pub struct MatchHit {
    pub score: f32,
    pub profile: Value,
}

/// Read side of the company index: a disjunctive query over whichever
/// fields the caller supplied, returning the single best-scoring profile.
pub struct CompanyMatcher {
    index: Index,
    reader: IndexReader,
    fields: CompanyFields,
}

impl CompanyMatcher {
    pub fn open(index_dir: &str) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)?;
        let fields = CompanyFields::from_schema(&index.schema())?;
        let reader = index.reader()?;
        Ok(Self {
            index,
            reader,
            fields,
        })
    }

    pub fn find_best_match(&self, query: &MatchQuery) -> Result<Option<MatchHit>> {
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        if let Some(name) = non_empty(&query.name) {
            subqueries.push(self.parse_clause(
                &[
                    self.fields.commercial_name,
                    self.fields.legal_name,
                    self.fields.all_names,
                ],
                name,
            ));
        }
        if let Some(website) = non_empty(&query.website) {
            // Queries arrive as full urls; match on the bare domain.
            subqueries.push(self.parse_clause(
                &[self.fields.domain, self.fields.url],
                &normalize_domain(website),
            ));
        }
        if let Some(phone) = non_empty(&query.phone) {
            subqueries.push(self.parse_clause(&[self.fields.phones], phone));
        }
        if let Some(facebook) = non_empty(&query.facebook) {
            subqueries.push(self.parse_clause(&[self.fields.social_media], facebook));
        }

        if subqueries.is_empty() {
            return Err("at least one of name, website, phone, facebook is required".into());
        }

        let searcher = self.reader.searcher();
        let query = BooleanQuery::new(subqueries);
        let top = searcher.search(&query, &TopDocs::with_limit(1))?;
        let Some((score, address)) = top.into_iter().next() else {
            return Ok(None);
        };

        let document: TantivyDocument = searcher.doc(address)?;
        let profile_json = document
            .get_first(self.fields.profile)
            .and_then(|value| value.as_str())
            .unwrap_or("{}");
        let profile: Value = serde_json::from_str(profile_json)?;

        debug!("Best match scored {}", score);
        Ok(Some(MatchHit { score, profile }))
    }

    fn parse_clause(&self, fields: &[Field], text: &str) -> (Occur, Box<dyn Query>) {
        let parser = QueryParser::for_index(&self.index, fields.to_vec());
        let (query, errors) = parser.parse_query_lenient(text);
        if !errors.is_empty() {
            debug!("Lenient query parse dropped parts of {:?}: {:?}", text, errors);
        }
        (Occur::Should, query)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
