//! Registry payloads and the summaries built from them.
//!
//! Only the fields the tool displays are deserialized; everything else in the
//! registry documents is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NO_DESCRIPTION: &str = "No description";
const UNKNOWN_AUTHOR: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

// ============================================================
// Wire types
// ============================================================

/// Response of `GET /-/v1/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub objects: Vec<SearchObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchObject {
    pub package: SearchPackage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<Person>,
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub username: Option<String>,
}

/// npm accepts people either as `"Name <mail> (url)"` strings or as objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Text(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
    },
}

impl Person {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(text) => {
                // Strip the optional "<email>" and "(url)" parts.
                let name = text.split(['<', '(']).next().unwrap_or_default().trim();
                (!name.is_empty()).then_some(name)
            }
            Self::Detailed { name } => name.as_deref().filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    Url(String),
    Detailed {
        #[serde(default)]
        url: Option<String>,
    },
}

impl Repository {
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Detailed { url } => url.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum License {
    Name(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
    },
}

impl License {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Detailed { kind } => kind.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistTags {
    #[serde(default)]
    pub latest: Option<String>,
}

/// Response of `GET /<name>` (the package document).
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub author: Option<Person>,
    #[serde(default)]
    pub maintainers: Vec<Person>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: DistTags,
}

impl PackageMetadata {
    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Declared author, else the first maintainer.
    pub fn author(&self) -> &str {
        self.author
            .as_ref()
            .and_then(Person::name)
            .or_else(|| self.maintainers.first().and_then(Person::name))
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Declared homepage, else the package page on npmjs.com.
    pub fn homepage(&self) -> String {
        match self.homepage.as_deref().filter(|h| !h.is_empty()) {
            Some(homepage) => homepage.to_string(),
            None => format!("https://www.npmjs.com/package/{}", self.name),
        }
    }

    pub fn repository_url(&self) -> Option<&str> {
        self.repository.as_ref().and_then(Repository::url)
    }

    pub fn license(&self) -> &str {
        self.license
            .as_ref()
            .and_then(License::name)
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn keywords(&self) -> String {
        if self.keywords.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.keywords.join(", ")
        }
    }

    /// README text, if the registry has a non-empty one.
    pub fn readme(&self) -> Option<&str> {
        self.readme.as_deref().filter(|r| !r.trim().is_empty())
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.latest.as_deref()
    }
}

// ============================================================
// Display types
// ============================================================

/// One search hit, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageSummary {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub date: Option<DateTime<Utc>>,
    /// Whether the current project declares this package.
    pub installed: bool,
}

impl From<SearchPackage> for PackageSummary {
    fn from(package: SearchPackage) -> Self {
        let author = package
            .author
            .as_ref()
            .and_then(Person::name)
            .or_else(|| package.publisher.as_ref().and_then(|p| p.username.as_deref()))
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string();

        Self {
            description: package
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            name: package.name,
            version: package.version,
            author,
            date: package.date,
            installed: false,
        }
    }
}
