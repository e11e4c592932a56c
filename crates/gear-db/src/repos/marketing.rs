//! Public site content: blog posts with comments, and testimonials.

use chrono::Utc;

use gear_core::entities::{BlogComment, BlogPost, Testimonial};
use gear_core::enums::{AuditAction, EntityType};
use gear_core::ids::{PREFIX_BLOG_COMMENT, PREFIX_BLOG_POST, PREFIX_TESTIMONIAL};
use gear_core::slug::blog_base_slug;

use crate::error::{DatabaseError, map_unique};
use crate::helpers::{
    collect_rows, datetime_param, get_bool, get_opt_string, parse_datetime,
    parse_optional_datetime, ts,
};
use crate::service::GearService;

/// Testimonials shown on the public site.
pub const TESTIMONIAL_LIMIT: u32 = 12;

const POST_COLS: &str =
    "id, title, slug, excerpt, body, author, published, published_at, created_at, updated_at";

const COMMENT_COLS: &str = "id, post_id, name, email, body, approved, created_at";

const TESTIMONIAL_COLS: &str =
    "id, name, quote, rating, display_order, published, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub author: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub name: String,
    pub quote: String,
    pub rating: u8,
    pub display_order: i64,
    pub published: bool,
}

fn row_to_post(row: &libsql::Row) -> Result<BlogPost, DatabaseError> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        excerpt: get_opt_string(row, 3)?,
        body: row.get(4)?,
        author: get_opt_string(row, 5)?,
        published: get_bool(row, 6)?,
        published_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

fn row_to_comment(row: &libsql::Row) -> Result<BlogComment, DatabaseError> {
    Ok(BlogComment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        name: row.get(2)?,
        email: get_opt_string(row, 3)?,
        body: row.get(4)?,
        approved: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_testimonial(row: &libsql::Row) -> Result<Testimonial, DatabaseError> {
    let rating = row.get::<i64>(3)?;
    Ok(Testimonial {
        id: row.get(0)?,
        name: row.get(1)?,
        quote: row.get(2)?,
        rating: u8::try_from(rating)
            .map_err(|_| DatabaseError::Query(format!("rating out of range: {rating}")))?,
        display_order: row.get(4)?,
        published: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl GearService {
    async fn blog_slug_taken(&self, slug: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT 1 FROM blog_posts WHERE slug = ?1", [slug])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// First free slug for a title: the title's slug, then `-2`, `-3`, ...
    pub async fn unique_blog_slug(&self, title: &str) -> Result<String, DatabaseError> {
        let base = blog_base_slug(title);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.blog_slug_taken(&candidate).await? {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        Ok(candidate)
    }

    pub async fn create_blog_post(&self, new: NewBlogPost) -> Result<BlogPost, DatabaseError> {
        if new.title.trim().is_empty() {
            return Err(DatabaseError::Validation("post title is required".into()));
        }
        let now = Utc::now();
        let slug = self.unique_blog_slug(&new.title).await?;
        let published_at = new.published.then_some(now);
        let id = self.db().generate_id(PREFIX_BLOG_POST).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO blog_posts ({POST_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.title.as_str(),
                    slug.as_str(),
                    new.excerpt.as_deref(),
                    new.body.as_str(),
                    new.author.as_deref(),
                    i64::from(new.published),
                    datetime_param(published_at),
                    ts(now),
                    ts(now)
                ],
            )
            .await
            .map_err(|e| map_unique(e, "slug", &slug))?;
        self.audit(EntityType::BlogPost, &id, AuditAction::Created, None, now)
            .await?;

        Ok(BlogPost {
            id,
            title: new.title,
            slug,
            excerpt: new.excerpt,
            body: new.body,
            author: new.author,
            published: new.published,
            published_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Publish or unpublish. First publication stamps `published_at`.
    pub async fn set_post_published(&self, id: &str, published: bool) -> Result<BlogPost, DatabaseError> {
        let now = Utc::now();
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE blog_posts SET published = ?1,
                     published_at = CASE WHEN ?1 = 1 THEN COALESCE(published_at, ?2) ELSE published_at END,
                     updated_at = ?2
                 WHERE id = ?3",
                libsql::params![i64::from(published), ts(now), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(
            EntityType::BlogPost,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "published": published })),
            now,
        )
        .await?;
        self.get_blog_post(id).await
    }

    pub async fn get_blog_post(&self, id: &str) -> Result<BlogPost, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {POST_COLS} FROM blog_posts WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_post(&row)
    }

    /// Published posts, newest publication first.
    pub async fn list_published_posts(&self, limit: u32) -> Result<Vec<BlogPost>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {POST_COLS} FROM blog_posts WHERE published = 1
                     ORDER BY published_at DESC, rowid DESC LIMIT {limit}"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_post).await
    }

    pub async fn get_published_post(&self, slug: &str) -> Result<BlogPost, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {POST_COLS} FROM blog_posts WHERE slug = ?1 AND published = 1"),
                [slug],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_post(&row)
    }

    /// Newest published posts other than `exclude_id`, for "more posts" lists.
    pub async fn latest_posts_excluding(
        &self,
        exclude_id: &str,
        limit: u32,
    ) -> Result<Vec<BlogPost>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {POST_COLS} FROM blog_posts WHERE published = 1 AND id != ?1
                     ORDER BY published_at DESC, rowid DESC LIMIT {limit}"
                ),
                [exclude_id],
            )
            .await?;
        collect_rows(rows, row_to_post).await
    }

    /// A reader comment, held for approval.
    pub async fn add_blog_comment(
        &self,
        post_id: &str,
        name: &str,
        email: Option<&str>,
        body: &str,
    ) -> Result<BlogComment, DatabaseError> {
        if name.trim().is_empty() || body.trim().is_empty() {
            return Err(DatabaseError::Validation("name and comment are required".into()));
        }
        self.get_blog_post(post_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_BLOG_COMMENT).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO blog_comments ({COMMENT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)"
                ),
                libsql::params![id.as_str(), post_id, name.trim(), email, body, ts(now)],
            )
            .await?;
        self.audit(EntityType::BlogComment, &id, AuditAction::Created, None, now)
            .await?;
        Ok(BlogComment {
            id,
            post_id: post_id.to_string(),
            name: name.trim().to_string(),
            email: email.map(String::from),
            body: body.to_string(),
            approved: false,
            created_at: now,
        })
    }

    pub async fn approve_blog_comment(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("UPDATE blog_comments SET approved = 1 WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.audit(EntityType::BlogComment, id, AuditAction::Updated, None, Utc::now())
            .await
    }

    /// Approved comments on a post, oldest first.
    pub async fn list_approved_comments(&self, post_id: &str) -> Result<Vec<BlogComment>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {COMMENT_COLS} FROM blog_comments WHERE post_id = ?1 AND approved = 1
                     ORDER BY created_at, rowid"
                ),
                [post_id],
            )
            .await?;
        collect_rows(rows, row_to_comment).await
    }

    pub async fn create_testimonial(&self, new: NewTestimonial) -> Result<Testimonial, DatabaseError> {
        if !(1..=5).contains(&new.rating) {
            return Err(DatabaseError::Validation("rating must be between 1 and 5".into()));
        }
        if new.name.trim().is_empty() || new.quote.trim().is_empty() {
            return Err(DatabaseError::Validation("name and quote are required".into()));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_TESTIMONIAL).await?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO testimonials ({TESTIMONIAL_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                libsql::params![
                    id.as_str(),
                    new.name.as_str(),
                    new.quote.as_str(),
                    i64::from(new.rating),
                    new.display_order,
                    i64::from(new.published),
                    ts(now),
                    ts(now)
                ],
            )
            .await?;
        self.audit(EntityType::Testimonial, &id, AuditAction::Created, None, now)
            .await?;
        Ok(Testimonial {
            id,
            name: new.name,
            quote: new.quote,
            rating: new.rating,
            display_order: new.display_order,
            published: new.published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Published testimonials by display order, most recently updated first
    /// within an order.
    pub async fn list_published_testimonials(&self) -> Result<Vec<Testimonial>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {TESTIMONIAL_COLS} FROM testimonials WHERE published = 1
                     ORDER BY display_order, updated_at DESC, rowid DESC
                     LIMIT {TESTIMONIAL_LIMIT}"
                ),
                (),
            )
            .await?;
        collect_rows(rows, row_to_testimonial).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    fn post(title: &str, published: bool) -> NewBlogPost {
        NewBlogPost {
            title: title.into(),
            body: "Check your mirrors.".into(),
            published,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn blog_slugs_get_suffixes() {
        let svc = test_service().await;
        let a = svc.create_blog_post(post("Parallel Parking 101", true)).await.unwrap();
        let b = svc.create_blog_post(post("Parallel parking 101!", true)).await.unwrap();
        let c = svc.create_blog_post(post("???", false)).await.unwrap();
        assert_eq!(a.slug, "parallel-parking-101");
        assert_eq!(b.slug, "parallel-parking-101-2");
        assert_eq!(c.slug, "blog");
    }

    #[tokio::test]
    async fn only_published_posts_are_public() {
        let svc = test_service().await;
        let draft = svc.create_blog_post(post("Draft", false)).await.unwrap();
        let live = svc.create_blog_post(post("Live", true)).await.unwrap();
        assert!(draft.published_at.is_none());

        let listed = svc.list_published_posts(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, live.id);
        assert!(matches!(
            svc.get_published_post(&draft.slug).await,
            Err(DatabaseError::NoResult)
        ));

        let published = svc.set_post_published(&draft.id, true).await.unwrap();
        assert!(published.published_at.is_some());
        let others = svc.latest_posts_excluding(&live.id, 3).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, draft.id);
    }

    #[tokio::test]
    async fn comments_need_approval() {
        let svc = test_service().await;
        let live = svc.create_blog_post(post("Live", true)).await.unwrap();
        let comment = svc
            .add_blog_comment(&live.id, "Sam", None, "Great tips")
            .await
            .unwrap();
        assert!(svc.list_approved_comments(&live.id).await.unwrap().is_empty());
        svc.approve_blog_comment(&comment.id).await.unwrap();
        assert_eq!(svc.list_approved_comments(&live.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn testimonials_ordered_and_capped() {
        let svc = test_service().await;
        for i in 0..14 {
            svc.create_testimonial(NewTestimonial {
                name: format!("Student {i}"),
                quote: "Passed first try".into(),
                rating: 5,
                display_order: if i == 13 { -1 } else { 1 },
                published: true,
            })
            .await
            .unwrap();
        }
        let shown = svc.list_published_testimonials().await.unwrap();
        assert_eq!(shown.len(), 12);
        assert_eq!(shown[0].name, "Student 13");
        assert_eq!(shown[1].name, "Student 12");

        let err = svc
            .create_testimonial(NewTestimonial {
                name: "X".into(),
                quote: "Y".into(),
                rating: 6,
                display_order: 0,
                published: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }
}
