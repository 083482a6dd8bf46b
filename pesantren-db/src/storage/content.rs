use diesel::prelude::*;
use tracing::trace;

use super::models::{Agenda, Announcement, Media, News, Page};
use super::schema::{agendas, announcements, media, news, pages};
use super::{StorageError, Store};

impl Store {
    pub async fn insert_media(&self, item: Media) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(media::table)
                .values(&item)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_media(&self, media_id: &str) -> Result<Option<Media>, StorageError> {
        let id = media_id.to_string();
        self.interact(move |conn| {
            Ok(media::table
                .find(&id)
                .select(Media::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// News items using this media as cover keep existing without a cover.
    pub async fn delete_media(&self, media_id: &str) -> Result<bool, StorageError> {
        let id = media_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(media::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// Insert or fully replace a page. The search index follows via triggers.
    pub async fn upsert_page(&self, page: Page) -> Result<(), StorageError> {
        trace!(page_id = %page.page_id, slug = %page.slug, "upsert_page");
        self.interact(move |conn| {
            diesel::insert_into(pages::table)
                .values(&page)
                .on_conflict(pages::page_id)
                .do_update()
                .set(&page)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_page(&self, page_id: &str) -> Result<Option<Page>, StorageError> {
        let id = page_id.to_string();
        self.interact(move |conn| {
            Ok(pages::table
                .find(&id)
                .select(Page::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn get_page_by_slug(&self, slug: &str) -> Result<Option<Page>, StorageError> {
        let slug = slug.to_string();
        self.interact(move |conn| {
            Ok(pages::table
                .filter(pages::slug.eq(&slug))
                .select(Page::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn delete_page(&self, page_id: &str) -> Result<bool, StorageError> {
        let id = page_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(pages::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    pub async fn upsert_news(&self, item: News) -> Result<(), StorageError> {
        trace!(news_id = %item.news_id, "upsert_news");
        self.interact(move |conn| {
            diesel::insert_into(news::table)
                .values(&item)
                .on_conflict(news::news_id)
                .do_update()
                .set(&item)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_news(&self, news_id: &str) -> Result<Option<News>, StorageError> {
        let id = news_id.to_string();
        self.interact(move |conn| {
            Ok(news::table
                .find(&id)
                .select(News::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Published items, newest first.
    pub async fn recent_news(&self, limit: i64) -> Result<Vec<News>, StorageError> {
        let limit = limit.clamp(1, 500);
        self.interact(move |conn| {
            Ok(news::table
                .filter(news::published_at.is_not_null())
                .order(news::published_at.desc())
                .limit(limit)
                .select(News::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn delete_news(&self, news_id: &str) -> Result<bool, StorageError> {
        let id = news_id.to_string();
        self.interact(move |conn| {
            let deleted = diesel::delete(news::table.find(&id)).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    pub async fn insert_agenda(&self, agenda: Agenda) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(agendas::table)
                .values(&agenda)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Agendas overlapping the half-open window `[from_ms, to_ms)`.
    pub async fn agendas_between(
        &self,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<Agenda>, StorageError> {
        if to_ms <= from_ms {
            return Ok(Vec::new());
        }
        self.interact(move |conn| {
            Ok(agendas::table
                .filter(agendas::start_at.lt(to_ms))
                .filter(
                    agendas::end_at
                        .ge(from_ms)
                        .or(agendas::end_at.is_null().and(agendas::start_at.ge(from_ms))),
                )
                .order(agendas::start_at.asc())
                .select(Agenda::as_select())
                .load(conn)?)
        })
        .await
    }

    pub async fn insert_announcement(&self, item: Announcement) -> Result<(), StorageError> {
        self.interact(move |conn| {
            diesel::insert_into(announcements::table)
                .values(&item)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    pub async fn get_announcement(
        &self,
        announcement_id: &str,
    ) -> Result<Option<Announcement>, StorageError> {
        let id = announcement_id.to_string();
        self.interact(move |conn| {
            Ok(announcements::table
                .find(&id)
                .select(Announcement::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    /// Announcements whose active window contains `at_ms`. Open-ended bounds count
    /// as unbounded.
    pub async fn active_announcements(&self, at_ms: i64) -> Result<Vec<Announcement>, StorageError> {
        self.interact(move |conn| {
            Ok(announcements::table
                .filter(
                    announcements::start_at
                        .is_null()
                        .or(announcements::start_at.le(at_ms)),
                )
                .filter(
                    announcements::end_at
                        .is_null()
                        .or(announcements::end_at.gt(at_ms)),
                )
                .order(announcements::announcement_id.asc())
                .select(Announcement::as_select())
                .load(conn)?)
        })
        .await
    }
}
