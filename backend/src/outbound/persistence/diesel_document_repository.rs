//! PostgreSQL-backed `DocumentRepository` implementation using Diesel ORM.
//!
//! Publication filters compare calendar components of `published_at` in UTC,
//! matching `PublicationFilter::matches`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Text, Timestamp, Timestamptz};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DocumentListing, DocumentRepository, RepositoryError};
use crate::domain::{
    CommunityId, Document, DocumentId, DocumentType, DocumentView, Page, StoredFileName, UserId,
};

use super::diesel_helpers::{
    count_to_u64, invalid_row, map_diesel_error, map_pool_error, page_window,
};
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::DbPool;
use super::schema::{documents, users};

diesel::define_sql_function! {
    /// Convert a timestamp with time zone to local time in `zone`.
    fn timezone(zone: Text, source: Timestamptz) -> Timestamp;
}

diesel::define_sql_function! {
    /// Extract a calendar component such as `day` or `year`.
    fn date_part(field: Text, source: Timestamp) -> diesel::sql_types::Double;
}

/// Joined, filtered document query shared by the count and page loads.
macro_rules! filtered_documents {
    ($listing:expr) => {{
        let listing: &DocumentListing = $listing;
        let mut query = documents::table
            .inner_join(users::table)
            .filter(documents::community_id.eq(*listing.community.as_uuid()))
            .filter(documents::doc_type.eq(listing.doc_type.as_str()))
            .into_boxed();
        let published = || timezone("UTC", documents::published_at);
        if let Some(day) = listing.published.day {
            query = query.filter(date_part("day", published()).eq(f64::from(day)));
        }
        if let Some(month) = listing.published.month {
            query = query.filter(date_part("month", published()).eq(f64::from(month)));
        }
        if let Some(year) = listing.published.year {
            query = query.filter(date_part("year", published()).eq(f64::from(year)));
        }
        query
    }};
}

/// Diesel-backed implementation of the document repository port.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: DocumentRow) -> Result<Document, RepositoryError> {
    let DocumentRow {
        id,
        comment,
        doc_type,
        published_at,
        file_names,
        author_id,
        community_id,
    } = row;
    let doc_type = doc_type
        .parse::<DocumentType>()
        .map_err(|err| invalid_row("document", id, err))?;
    let files = file_names
        .iter()
        .map(|name| {
            StoredFileName::parse(name)
                .ok_or_else(|| invalid_row("document", id, format!("bad file name {name}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if files.is_empty() {
        return Err(invalid_row("document", id, "no files"));
    }
    Ok(Document {
        id: DocumentId::from_uuid(id),
        comment,
        doc_type,
        published_at,
        files,
        author_id: UserId::from_uuid(author_id),
        community_id: CommunityId::from_uuid(community_id),
    })
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn insert(&self, document: &Document) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewDocumentRow {
            id: *document.id.as_uuid(),
            comment: document.comment.as_deref(),
            doc_type: document.doc_type.as_str(),
            published_at: document.published_at,
            file_names: document.files.iter().map(ToString::to_string).collect(),
            author_id: *document.author_id.as_uuid(),
            community_id: *document.community_id.as_uuid(),
        };
        diesel::insert_into(documents::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = documents::table
            .filter(documents::id.eq(id.as_uuid()))
            .select(DocumentRow::as_select())
            .first::<DocumentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_document).transpose()
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(documents::table.filter(documents::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self, listing: DocumentListing) -> Result<Page<DocumentView>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_window(listing.page);

        let total: i64 = filtered_documents!(&listing)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(DocumentRow, String, String)> = filtered_documents!(&listing)
            .select((DocumentRow::as_select(), users::full_name, users::email))
            .order((documents::published_at.desc(), documents::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let content = rows
            .into_iter()
            .map(|(row, author_name, author_email)| {
                row_to_document(row).map(|document| DocumentView {
                    document,
                    author_name,
                    author_email,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, count_to_u64(total), listing.page))
    }
}
