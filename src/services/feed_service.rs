// FeedService - assembles pages of posts enriched for one viewer

use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::core::{Page, PostId, SortField, SortOrder, UserId};
use crate::entities::{EntComment, EntPost, PostQuery, PostScope, PostWithAuthor, Reaction};
use crate::error::{AppError, AppResult};
use crate::infrastructure::Database;
use crate::models::{CommentView, FeedItem, PostView, TimelineQuery};
use crate::services::ads_service::{interleave_ads, AdService};

/// Parsed `GET /timeline` parameters.
#[derive(Debug, Clone, Copy)]
pub struct TimelineRequest {
    pub query: PostQuery,
    pub with_ads: bool,
}

impl TimelineRequest {
    /// Lenient: anything unrecognised falls back to its default.
    pub fn parse(viewer: UserId, raw: &TimelineQuery) -> Self {
        let scope = match raw.scope.as_deref().map(str::trim) {
            Some("following") => PostScope::Following(viewer),
            _ => PostScope::All,
        };
        let with_ads = matches!(
            raw.with_ads.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("true") | Some("1")
        );

        Self {
            query: PostQuery {
                scope,
                page: Page::from_raw(raw.offset.as_deref(), raw.limit.as_deref()),
                sort: SortField::parse_lenient(raw.sort.as_deref()),
                order: SortOrder::parse_lenient(raw.order.as_deref()),
            },
            with_ads,
        }
    }
}

pub struct FeedService {
    db: Database,
    ads: Arc<AdService>,
}

impl FeedService {
    pub fn new(db: Database, ads: Arc<AdService>) -> Self {
        Self { db, ads }
    }

    /// One page of posts in database order, each with author, last comment and the viewer's
    /// like/bookmark flags. Nothing is returned if any lookup fails.
    #[instrument(skip(self))]
    pub async fn get_feed(&self, viewer: UserId, query: PostQuery) -> AppResult<Vec<PostView>> {
        let rows = EntPost::gen_page(self.db.pool(), &query).await?;
        self.enrich(viewer, rows).await
    }

    pub async fn get_post(&self, viewer: UserId, post_id: PostId) -> AppResult<PostView> {
        self.get_feed(viewer, PostQuery::single(post_id))
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))
    }

    pub async fn timeline(&self, viewer: UserId, request: TimelineRequest) -> AppResult<Vec<FeedItem>> {
        let posts = self.get_feed(viewer, request.query).await?;
        if !request.with_ads {
            return Ok(posts.into_iter().map(FeedItem::Post).collect());
        }

        let ads = self.ads.monthly_ads().await?;
        Ok(interleave_ads(posts, &ads, request.query.page.offset))
    }

    /// Three batched lookups per page, independent of page size.
    async fn enrich(&self, viewer: UserId, rows: Vec<PostWithAuthor>) -> AppResult<Vec<PostView>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<PostId> = rows.iter().map(|r| r.post.id).collect();
        let comment_ids: Vec<_> = rows.iter().filter_map(|r| r.post.last_comment_id).collect();

        let pool = self.db.pool();
        let (comments, liked, bookmarked) = futures::try_join!(
            EntComment::gen_multi_with_author(pool, &comment_ids),
            Reaction::Like.gen_viewer_set(pool, viewer, &post_ids),
            Reaction::Bookmark.gen_viewer_set(pool, viewer, &post_ids),
        )?;

        let mut comments: HashMap<_, CommentView> = comments
            .into_iter()
            .map(|c| (c.comment.id, CommentView::from(c)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.post.id;
                let last_comment = row
                    .post
                    .last_comment_id
                    .and_then(|cid| comments.remove(&cid));
                PostView::assemble(row, last_comment, liked.contains(&id), bookmarked.contains(&id))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> TimelineQuery {
        let mut q = TimelineQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "offset" => q.offset = v,
                "limit" => q.limit = v,
                "sort" => q.sort = v,
                "order" => q.order = v,
                "scope" => q.scope = v,
                "withAds" => q.with_ads = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn timeline_defaults() {
        let req = TimelineRequest::parse(UserId(1), &TimelineQuery::default());
        assert_eq!(req.query.scope, PostScope::All);
        assert_eq!(req.query.page, Page::default());
        assert_eq!(req.query.sort, SortField::CreatedAt);
        assert_eq!(req.query.order, SortOrder::Desc);
        assert!(!req.with_ads);
    }

    #[test]
    fn timeline_parses_every_knob() {
        let req = TimelineRequest::parse(
            UserId(7),
            &raw(&[
                ("offset", "20"),
                ("limit", "5"),
                ("sort", "totalComments"),
                ("order", "asc"),
                ("scope", "following"),
                ("withAds", "TRUE"),
            ]),
        );
        assert_eq!(req.query.scope, PostScope::Following(UserId(7)));
        assert_eq!(req.query.page, Page::new(20, 5));
        assert_eq!(req.query.sort, SortField::TotalComments);
        assert_eq!(req.query.order, SortOrder::Asc);
        assert!(req.with_ads);
    }

    #[test]
    fn junk_falls_back() {
        let req = TimelineRequest::parse(
            UserId(7),
            &raw(&[("limit", "-4"), ("scope", "everyone"), ("withAds", "maybe")]),
        );
        assert_eq!(req.query.page.limit, 10);
        assert_eq!(req.query.scope, PostScope::All);
        assert!(!req.with_ads);
    }
}
