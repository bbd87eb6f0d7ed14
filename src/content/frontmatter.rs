//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Accepts any YAML scalar as a string, so `title: 1999` and
/// `date: 2018-05-23` both land as text.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(D::Error::custom("expected a scalar value")),
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub layout: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub description: Option<String>,
    /// Where the post first appeared, if it was syndicated from elsewhere
    #[serde(deserialize_with = "scalar")]
    pub originally_published_at: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            layout: None,
            date: None,
            description: None,
            originally_published_at: None,
            slug: None,
            tags: Vec::new(),
            published: true,
            extra: HashMap::new(),
        }
    }
}

const FENCE: &str = "---";
const YAML_END: &str = "...";

impl FrontMatter {
    /// Parse front-matter from content string.
    /// Returns (front_matter, remaining_content).
    ///
    /// `source` names the document in any error raised.
    pub fn parse<'a>(source: &str, content: &'a str) -> Result<(Self, &'a str)> {
        let malformed = |reason: &str| Error::MalformedFrontMatter {
            path: source.to_string(),
            reason: reason.to_string(),
        };

        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.split_inclusive('\n');

        match lines.next() {
            Some(first) if first.trim_end() == FENCE => {}
            _ => return Err(malformed("document must begin with `---`")),
        }

        let yaml_start = content.find('\n').map_or(content.len(), |i| i + 1);
        let mut offset = yaml_start;
        let mut yaml_end = None;
        for line in lines {
            let trimmed = line.trim_end();
            if trimmed == FENCE || trimmed == YAML_END {
                yaml_end = Some((offset, offset + line.len()));
                break;
            }
            offset += line.len();
        }

        let (yaml_stop, body_start) =
            yaml_end.ok_or_else(|| malformed("missing closing `---`"))?;
        let yaml = &content[yaml_start..yaml_stop];
        let body = content[body_start..].trim_start_matches(['\n', '\r']);

        let fm = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            let value: serde_yaml::Value =
                serde_yaml::from_str(yaml).map_err(|e| malformed(&e.to_string()))?;
            if !value.is_mapping() {
                return Err(malformed("front-matter must be a mapping of keys to values"));
            }
            serde_yaml::from_value(value).map_err(|e| malformed(&e.to_string()))?
        };

        fm.check_required(source)?;
        Ok((fm, body))
    }

    fn check_required(&self, source: &str) -> Result<()> {
        let missing = |value: &Option<String>| {
            value.as_deref().map(str::trim).unwrap_or_default().is_empty()
        };
        for (field, value) in [("layout", &self.layout), ("title", &self.title)] {
            if missing(value) {
                return Err(Error::MissingRequiredField {
                    path: source.to_string(),
                    field,
                });
            }
        }
        Ok(())
    }
}
