//! Resource projections in the shape legacy clients expect.
//!
//! Field names follow the legacy wire format (`PascalCase`, `ForeignId`,
//! `Url`). Missing fields decode to their defaults so that partial upstream
//! payloads still deserialize.

use serde::{Deserialize, Serialize};

/// A literary work with its editions, authors and series memberships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Work {
    #[serde(rename = "ForeignId")]
    pub foreign_id: i64,
    pub title: String,
    pub full_title: String,
    pub short_title: String,
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_date: String,
    pub genres: Vec<String>,
    pub related_works: Vec<i64>,
    pub books: Vec<Book>,
    pub series: Vec<Series>,
    pub authors: Vec<Author>,
    #[serde(rename = "KCA")]
    pub kca: String,
}

impl Work {
    /// Rating count of the first edition, or zero when there are no editions.
    pub fn rating_count(&self) -> i64 {
        self.books.first().map_or(0, |b| b.rating_count)
    }

    pub fn first_author(&self) -> Option<&Author> {
        self.authors.first()
    }
}

/// One published edition of a work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Book {
    #[serde(rename = "ForeignId")]
    pub foreign_id: i64,
    pub asin: String,
    pub description: String,
    pub isbn13: String,
    pub title: String,
    pub full_title: String,
    pub short_title: String,
    pub language: String,
    pub format: String,
    pub edition_information: String,
    pub publisher: String,
    #[serde(rename = "ImageUrl")]
    pub image_url: String,
    pub is_ebook: bool,
    pub num_pages: i64,
    pub rating_count: i64,
    pub rating_sum: i64,
    pub average_rating: f64,
    #[serde(rename = "Url")]
    pub url: String,
    pub release_date: String,
    pub contributors: Vec<Contributor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Contributor {
    #[serde(rename = "ForeignId")]
    pub foreign_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Author {
    #[serde(rename = "KCA")]
    pub kca: String,
    #[serde(rename = "ForeignId")]
    pub foreign_id: i64,
    pub name: String,
    pub title_slug: String,
    pub description: String,
    #[serde(rename = "ImageUrl")]
    pub image_url: String,
    #[serde(rename = "Url")]
    pub url: String,
    pub rating_count: i64,
    pub average_rating: f64,
    pub works: Vec<Work>,
    pub series: Vec<Series>,
}

impl Author {
    /// Replaces the author's works with a single work.
    ///
    /// The narrowed author is a per-response view; it is never cached.
    pub fn narrow_to(&mut self, work: Work) {
        self.works = vec![work];
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Series {
    #[serde(rename = "KCA")]
    pub kca: String,
    #[serde(rename = "ForeignId")]
    pub foreign_id: i64,
    pub title: String,
    pub description: String,
    pub link_items: Vec<SeriesLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SeriesLink {
    pub position_in_series: String,
    pub series_position: i64,
    #[serde(rename = "ForeignWorkId")]
    pub foreign_work_id: i64,
    pub primary: bool,
}

/// The composite payload of a bulk book lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BulkBook {
    pub works: Vec<Work>,
    pub series: Vec<Series>,
    pub authors: Vec<Author>,
}
