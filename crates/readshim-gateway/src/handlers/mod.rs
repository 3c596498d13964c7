mod author;
mod book;
mod work;

pub use author::{author_changed_handler, delete_author_handler, get_author_handler};
pub use book::{bulk_book_handler, bulk_book_redirect_handler, delete_book_handler, get_book_handler};
pub use work::{delete_work_handler, get_work_handler};

use axum::http::StatusCode;

pub async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found")
}
