//! Document model for legacy catalog versions and their migrated forms.
//!
//! A version directory holds two documents. Both may describe services, in
//! one of two dialects, and the secondary one additionally embeds a
//! `.catalog` metadata block. [`ServiceDocument`] is the single variant type
//! both dialects parse into; dialect-specific marshaling happens only in
//! [`ServiceDocument::parse`] and [`ServiceDocument::to_yaml`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::Result;

/// Reserved top-level key holding the catalog block in dialect-1 documents.
pub const CATALOG_KEY: &str = ".catalog";

/// Fields of a single service, keyed by field name.
pub type ServiceFields = BTreeMap<String, Value>;

/// Services keyed by service name.
pub type ServiceMap = BTreeMap<String, ServiceFields>;

/// Schema dialect of a per-version document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// Dialect 1: services are the document's top-level keys.
    #[serde(rename = "1")]
    Legacy,
    /// Dialect 2: services live under an explicit `services` key.
    #[serde(rename = "2")]
    Normalized,
}

/// A parsed service document in either dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceDocument {
    /// Flat document keyed by service name, `.catalog` excluded.
    Legacy { services: Option<ServiceMap> },
    /// Document with explicit `version`, `services` and `volumes` fields.
    Normalized {
        version: String,
        services: Option<ServiceMap>,
        volumes: Option<Mapping>,
    },
}

impl ServiceDocument {
    /// Parses `raw` in the shape of `dialect`.
    ///
    /// Returns `None` when the bytes are not YAML or do not fit the dialect's
    /// shape; callers treat that the same as a missing document.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_migrate_core::{Dialect, ServiceDocument};
    ///
    /// let doc = ServiceDocument::parse(b"web:\n  image: nginx\n", Dialect::Legacy).unwrap();
    /// assert!(doc.services().unwrap().contains_key("web"));
    ///
    /// // a scalar where a service should be does not fit dialect 1
    /// assert!(ServiceDocument::parse(b"web: nginx\n", Dialect::Legacy).is_none());
    /// ```
    pub fn parse(raw: &[u8], dialect: Dialect) -> Option<Self> {
        let document: Value = serde_yaml::from_slice(raw).ok()?;
        match dialect {
            Dialect::Legacy => parse_legacy(&document),
            Dialect::Normalized => parse_normalized(&document),
        }
    }

    /// Returns the dialect this document is shaped as.
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Legacy { .. } => Dialect::Legacy,
            Self::Normalized { .. } => Dialect::Normalized,
        }
    }

    /// Returns the service map, if the document carries one.
    pub fn services(&self) -> Option<&ServiceMap> {
        match self {
            Self::Legacy { services } | Self::Normalized { services, .. } => services.as_ref(),
        }
    }

    /// Returns a copy of this document with its service map replaced.
    ///
    /// The dialect shape and any dialect-2 extras are retained.
    pub fn with_services(&self, replacement: Option<ServiceMap>) -> Self {
        match self {
            Self::Legacy { .. } => Self::Legacy {
                services: replacement,
            },
            Self::Normalized {
                version, volumes, ..
            } => Self::Normalized {
                version: version.clone(),
                services: replacement,
                volumes: volumes.clone(),
            },
        }
    }

    /// Serializes the document in its own dialect's shape.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        let empty = ServiceMap::new();
        let text = match self {
            Self::Legacy { services } => serde_yaml::to_string(services.as_ref().unwrap_or(&empty))?,
            Self::Normalized {
                version,
                services,
                volumes,
            } => serde_yaml::to_string(&NormalizedShape {
                version,
                services: services.as_ref().unwrap_or(&empty),
                volumes: volumes.as_ref(),
            })?,
        };
        Ok(text.into_bytes())
    }
}

#[derive(Serialize)]
struct NormalizedShape<'a> {
    version: &'a str,
    services: &'a ServiceMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    volumes: Option<&'a Mapping>,
}

fn parse_legacy(document: &Value) -> Option<ServiceDocument> {
    let services = match document {
        Value::Null => None,
        Value::Mapping(mapping) => Some(services_from_mapping(mapping, true)?),
        _ => return None,
    };
    Some(ServiceDocument::Legacy { services })
}

fn parse_normalized(document: &Value) -> Option<ServiceDocument> {
    let empty = Mapping::new();
    let mapping = match document {
        Value::Null => &empty,
        Value::Mapping(mapping) => mapping,
        _ => return None,
    };

    let version = match mapping.get("version") {
        None => String::new(),
        Some(value) => scalar::to_string(value)?,
    };
    let services = match mapping.get("services") {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(services)) => Some(services_from_mapping(services, false)?),
        Some(_) => return None,
    };
    let volumes = match mapping.get("volumes") {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(volumes)) => Some(volumes.clone()),
        Some(_) => return None,
    };

    Some(ServiceDocument::Normalized {
        version,
        services,
        volumes,
    })
}

fn services_from_mapping(mapping: &Mapping, skip_catalog: bool) -> Option<ServiceMap> {
    let mut services = ServiceMap::new();
    for (key, value) in mapping {
        let name = key.as_str()?;
        if skip_catalog && name == CATALOG_KEY {
            continue;
        }
        let fields = match value {
            Value::Null => ServiceFields::new(),
            Value::Mapping(fields) => fields
                .iter()
                .map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
                .collect::<Option<ServiceFields>>()?,
            _ => return None,
        };
        services.insert(name.to_string(), fields);
    }
    Some(services)
}

/// Per-template metadata (`config.yml` / `template.yml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    #[serde(deserialize_with = "scalar::string")]
    pub name: String,
    /// Legacy single version; cleared by migration.
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub default_version: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Old-style project URL; moved to `project_url` by migration.
    #[serde(rename = "projectURL")]
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub old_project_url: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub project_url: String,
    #[serde(deserialize_with = "scalar::string_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl TemplateMetadata {
    /// Parses a template metadata document. An empty document yields the
    /// default value.
    pub fn from_yaml(raw: &[u8]) -> std::result::Result<Self, serde_yaml::Error> {
        match serde_yaml::from_slice::<Value>(raw)? {
            Value::Null => Ok(Self::default()),
            value => serde_yaml::from_value(value),
        }
    }

    /// Serializes the document.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }
}

/// The `.catalog` block describing one version of a template.
///
/// Once extracted it becomes the whole content of `template-version.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogMetadata {
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Semantic version; names the version directory after migration.
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub minimum_rancher_version: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub maximum_rancher_version: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub upgrade_from: String,
    #[serde(deserialize_with = "scalar::string_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
}

impl CatalogMetadata {
    /// Extracts the `.catalog` block from a metadata+service document.
    ///
    /// Returns `Ok(None)` when the document has no such block.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_migrate_core::CatalogMetadata;
    ///
    /// let raw = b".catalog:\n  name: wordpress\n  version: 1.2.0\nweb:\n  scale: 2\n";
    /// let catalog = CatalogMetadata::extract(raw).unwrap().unwrap();
    /// assert_eq!(catalog.version, "1.2.0");
    ///
    /// assert!(CatalogMetadata::extract(b"web:\n  scale: 2\n").unwrap().is_none());
    /// ```
    pub fn extract(raw: &[u8]) -> std::result::Result<Option<Self>, serde_yaml::Error> {
        let document: Value = serde_yaml::from_slice(raw)?;
        if let Value::Null = document {
            return Ok(None);
        }
        if !document.is_mapping() {
            return Err(serde::de::Error::custom(
                "expected a mapping at the document root",
            ));
        }
        match document.get(CATALOG_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(block) => serde_yaml::from_value(block.clone()).map(Some),
        }
    }

    /// Serializes the block as a standalone document.
    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }
}

/// A configuration question asked when deploying a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub variable: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub min_length: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_length: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub min: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub max: i64,
    #[serde(deserialize_with = "scalar::string_list", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub valid_chars: String,
    #[serde(deserialize_with = "scalar::string", skip_serializing_if = "String::is_empty")]
    pub invalid_chars: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Lenient readers for string-typed fields.
///
/// Catalog authors write `default: 8080` or `version: 2` unquoted; such
/// scalars are kept as their textual form instead of failing the document.
mod scalar {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_yaml::Value;

    pub(crate) fn to_string(value: &Value) -> Option<String> {
        match value {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        to_string(&value).ok_or_else(|| D::Error::custom("expected a scalar value"))
    }

    pub(crate) fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(entries) = Option::<BTreeMap<String, Value>>::deserialize(deserializer)? else {
            return Ok(BTreeMap::new());
        };
        entries
            .into_iter()
            .map(|(key, value)| match to_string(&value) {
                Some(text) => Ok((key, text)),
                None => Err(D::Error::custom(format!("label '{key}' must be a scalar"))),
            })
            .collect()
    }

    pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(items) = Option::<Vec<Value>>::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| to_string(item).ok_or_else(|| D::Error::custom("expected a scalar option")))
            .collect()
    }
}
