// Offset/limit pagination shared by the feed, comment lists and follow lists.
//
// Query values arrive as raw strings. Anything that does not parse as a valid number
// falls back to the default instead of being rejected; a page shorter than `limit`
// tells the client there is nothing more to fetch. Limits above `MAX_LIMIT` are cut
// down to it, keeping the per-page batch lookups under SQLite's bind-variable cap.

use serde::Deserialize;

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Validated pagination window: `offset >= 0`, `0 < limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self::default().with_offset(offset).with_limit(limit)
    }

    pub fn from_raw(offset: Option<&str>, limit: Option<&str>) -> Self {
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(DEFAULT_OFFSET);
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        Self { offset, limit }
    }

    fn with_offset(mut self, offset: i64) -> Self {
        if offset >= 0 {
            self.offset = offset;
        }
        self
    }

    fn with_limit(mut self, limit: i64) -> Self {
        if limit > 0 {
            self.limit = limit.min(MAX_LIMIT);
        }
        self
    }
}

impl From<&PageQuery> for Page {
    fn from(query: &PageQuery) -> Self {
        Page::from_raw(query.offset.as_deref(), query.limit.as_deref())
    }
}

/// Post field a feed page is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Likes,
    TotalComments,
}

impl SortField {
    /// Unknown names fall back to `createdAt`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("updatedAt") => SortField::UpdatedAt,
            Some("likes") => SortField::Likes,
            Some("totalComments") => SortField::TotalComments,
            _ => SortField::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "p.created_at",
            SortField::UpdatedAt => "p.updated_at",
            SortField::Likes => "p.likes",
            SortField::TotalComments => "p.total_comments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}
