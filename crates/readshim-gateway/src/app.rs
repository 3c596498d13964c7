use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    author_changed_handler, bulk_book_handler, bulk_book_redirect_handler, delete_author_handler,
    delete_book_handler, delete_work_handler, get_author_handler, get_book_handler,
    get_work_handler, not_found_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Routes of the legacy API. Anything else is a 404.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route(
                "/work/{foreign_id}",
                get(get_work_handler).delete(delete_work_handler),
            )
            .route(
                "/book/bulk",
                get(bulk_book_handler).post(bulk_book_redirect_handler),
            )
            .route(
                "/book/{foreign_edition_id}",
                get(get_book_handler).delete(delete_book_handler),
            )
            .route("/author/changed", get(author_changed_handler))
            .route(
                "/author/{foreign_author_id}",
                get(get_author_handler).delete(delete_author_handler),
            )
            .fallback(not_found_handler)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
