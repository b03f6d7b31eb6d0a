use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app::{Result, SiteError};

/// Length of the hex prefix used as an item id.
const ID_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Poem,
    Thought,
    Page,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Poem, ContentType::Thought, ContentType::Page];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Poem => "poem",
            ContentType::Thought => "thought",
            ContentType::Page => "page",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "poem" => Ok(ContentType::Poem),
            // The public gallery calls thoughts "notes"
            "thought" | "note" => Ok(ContentType::Thought),
            "page" => Ok(ContentType::Page),
            other => Err(SiteError::InvalidContent(format!(
                "unknown content type '{}', expected poem, thought or page",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub title: String,
    pub content: String,
    /// ISO-8601 timestamp, or a bare `YYYY-MM-DD` date.
    pub date: String,
    pub published: bool,
    /// Embedded `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ContentItem {
    pub fn from_new(id: String, new: NewContent) -> Self {
        Self {
            id,
            kind: new.kind,
            title: new.title,
            content: new.content,
            date: new.date,
            published: new.published,
            image: normalize_image(new.image),
        }
    }

    /// Generate an item id from the title and a caller-supplied nonce.
    ///
    /// Same inputs give the same id; the store varies the nonce until the id is free.
    pub fn generate_id(title: &str, nonce: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(nonce.to_le_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(ID_LEN);
        id
    }

    /// Merge the fields present in `patch` into this item.
    pub fn apply(&mut self, patch: ContentPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
        if let Some(image) = patch.image {
            self.image = normalize_image(image);
        }
    }

    /// Treat an empty image string as no image, as `from_new` and `apply` do.
    pub fn normalized(mut self) -> Self {
        self.image = normalize_image(self.image.take());
        self
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// A content item before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub kind: ContentType,
    pub title: String,
    pub content: String,
    pub date: String,
    pub published: bool,
    pub image: Option<String>,
}

impl NewContent {
    /// Published, dated now, no image: what the admin create form produces.
    pub fn new(kind: ContentType, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            date: now_iso(),
            published: true,
            image: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_date(&self.date)
    }
}

/// Partial update. `None` leaves a field unchanged; `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPatch {
    pub kind: Option<ContentType>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub published: Option<bool>,
    pub image: Option<Option<String>>,
}

impl ContentPatch {
    pub fn published(published: bool) -> Self {
        Self {
            published: Some(published),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(ref date) = self.date {
            validate_date(date)?;
        }
        Ok(())
    }
}

/// Parse an item date: RFC 3339 first, then a bare calendar date at midnight UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<DateTime<Utc>>().ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

/// Stable sort, newest first. Items with unparseable dates go last.
pub fn sort_newest_first(items: &mut [ContentItem]) {
    items.sort_by_cached_key(|item| std::cmp::Reverse(item.timestamp()));
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image.filter(|s| !s.trim().is_empty())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(SiteError::InvalidContent("title must not be empty".into()));
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<()> {
    if parse_date(date).is_none() {
        return Err(SiteError::InvalidContent(format!(
            "date '{}' is not an ISO-8601 timestamp",
            date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, date: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            kind: ContentType::Poem,
            title: format!("Poem {}", id),
            content: String::new(),
            date: date.into(),
            published: true,
            image: None,
        }
    }

    #[test]
    fn test_id_generation_deterministic() {
        assert_eq!(
            ContentItem::generate_id("The Silence", 7),
            ContentItem::generate_id("The Silence", 7)
        );
    }

    #[test]
    fn test_id_generation_varies_with_nonce() {
        let a = ContentItem::generate_id("The Silence", 1);
        let b = ContentItem::generate_id("The Silence", 2);
        assert_ne!(a, b);
        assert_eq!(a.len(), ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("poem".parse::<ContentType>().unwrap(), ContentType::Poem);
        assert_eq!("Thought".parse::<ContentType>().unwrap(), ContentType::Thought);
        assert_eq!("note".parse::<ContentType>().unwrap(), ContentType::Thought);
        assert!("essay".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(item("1", "2024-01-20")).unwrap();
        assert_eq!(json["type"], "poem");
        assert_eq!(json["published"], true);
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_unknown_type_rejected_on_deserialize() {
        let raw = r#"{"id":"1","type":"essay","title":"x","content":"","date":"2024-01-01","published":true}"#;
        assert!(serde_json::from_str::<ContentItem>(raw).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let bare = parse_date("2024-01-20").unwrap();
        let full = parse_date("2024-01-20T00:00:00.000Z").unwrap();
        assert_eq!(bare, full);
        assert!(parse_date("2024-01-20T10:30:00+02:00").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut items = vec![
            item("a", "2024-01-18"),
            item("b", "2024-01-25"),
            item("c", "2024-01-18"),
            item("d", "garbage"),
            item("e", "2024-01-20T12:00:00Z"),
        ];
        sort_newest_first(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn test_apply_patch_leaves_missing_fields() {
        let mut it = item("1", "2024-01-20");
        it.apply(ContentPatch {
            title: Some("Renamed".into()),
            ..Default::default()
        });
        assert_eq!(it.title, "Renamed");
        assert_eq!(it.date, "2024-01-20");
        assert!(it.published);
    }

    #[test]
    fn test_apply_patch_replaces_and_clears_image() {
        let mut it = item("1", "2024-01-20");
        it.apply(ContentPatch {
            image: Some(Some("data:image/png;base64,AAAA".into())),
            ..Default::default()
        });
        assert!(it.has_image());

        it.apply(ContentPatch {
            image: Some(None),
            ..Default::default()
        });
        assert!(!it.has_image());
    }

    #[test]
    fn test_empty_image_normalized_to_none() {
        let mut new = NewContent::new(ContentType::Page, "About", "...");
        new.image = Some(String::new());
        let it = ContentItem::from_new("x".into(), new);
        assert_eq!(it.image, None);
    }

    #[test]
    fn test_validation() {
        assert!(NewContent::new(ContentType::Poem, "  ", "body").validate().is_err());
        assert!(NewContent::new(ContentType::Poem, "Title", "").validate().is_ok());

        let mut bad_date = NewContent::new(ContentType::Poem, "Title", "");
        bad_date.date = "soon".into();
        assert!(bad_date.validate().is_err());

        let patch = ContentPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(ContentPatch::published(false).validate().is_ok());
    }

    #[test]
    fn test_new_content_defaults() {
        let new = NewContent::new(ContentType::Thought, "Idea", "text");
        assert!(new.published);
        assert!(new.image.is_none());
        assert!(parse_date(&new.date).is_some());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ContentPatch::default().is_empty());
        assert!(!ContentPatch::published(true).is_empty());
    }
}
