use readshim_core::{Author, BulkBook, Controller, Error, ForeignId, Result, Series, Work};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Resolves many edition IDs into one [`BulkBook`].
///
/// Every ID is fetched concurrently. Lookups that fail are dropped from the
/// result rather than failing the request, so a missing ID and an
/// unreachable one look the same to the caller.
#[derive(Clone)]
pub struct BulkAggregator {
    controller: Arc<dyn Controller>,
}

impl BulkAggregator {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        Self { controller }
    }

    /// Fetches the work behind each edition ID and merges them.
    ///
    /// Fails with [`Error::MissingIds`] before fetching anything when `ids`
    /// is empty. Otherwise waits for every fetch to finish.
    pub async fn aggregate(&self, ids: &[ForeignId]) -> Result<BulkBook> {
        if ids.is_empty() {
            return Err(Error::MissingIds);
        }

        let mut tasks = JoinSet::new();
        for &id in ids {
            let controller = Arc::clone(&self.controller);
            tasks.spawn(async move { (id, fetch_work(controller.as_ref(), id).await) });
        }

        // Tasks are merged one at a time, in completion order.
        let mut accumulator = BulkAccumulator::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(work))) => accumulator.merge(work),
                Ok((_, Err(e))) if e.is_not_found() => {}
                Ok((id, Err(e))) => {
                    warn!(book_id = %id, error = %e, "getting book");
                }
                Err(e) => warn!(error = %e, "bulk fetch task failed"),
            }
        }

        let result = accumulator.finish();
        debug!(
            requested = ids.len(),
            works = result.works.len(),
            authors = result.authors.len(),
            "aggregated bulk lookup"
        );
        Ok(result)
    }
}

async fn fetch_work(controller: &dyn Controller, id: ForeignId) -> Result<Work> {
    let bytes = controller.get_book(id).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Internal(format!("decoding work for book {id}: {e}")))
}

/// The shared result of a bulk lookup while fetches are still completing.
#[derive(Debug, Default)]
pub struct BulkAccumulator {
    works: Vec<Work>,
    authors: Vec<Author>,
}

impl BulkAccumulator {
    /// Appends a fetched work and, unless its first author is already known,
    /// all of its authors.
    ///
    /// Only the first author is checked: a new primary author brings every
    /// co-author along even if some of them were seen before.
    pub fn merge(&mut self, work: Work) {
        let known = work.first_author().is_some_and(|first| {
            self.authors
                .iter()
                .any(|a| a.foreign_id == first.foreign_id)
        });
        if !known {
            self.authors.extend(work.authors.iter().cloned());
        }
        self.works.push(work);
    }

    /// Collects series from the merged authors and orders works by the
    /// rating count of their first edition, highest first.
    ///
    /// Series are de-duplicated by foreign ID, first occurrence wins. Works
    /// with equal counts keep their merge order.
    pub fn finish(self) -> BulkBook {
        let BulkAccumulator { mut works, authors } = self;

        let mut seen = HashSet::new();
        let series: Vec<Series> = authors
            .iter()
            .flat_map(|a| a.series.iter())
            .filter(|s| seen.insert(s.foreign_id))
            .cloned()
            .collect();

        works.sort_by_key(|w| Reverse(w.rating_count()));

        BulkBook {
            works,
            series,
            authors,
        }
    }
}
