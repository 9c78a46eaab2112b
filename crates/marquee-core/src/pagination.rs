//! Keyset pagination over descending favorite ids.
//!
//! A page is requested with a size and an optional cursor (the id of the last
//! entry the caller has already seen). Stores fetch `limit + 1` rows with
//! `id < cursor` ordered by `id DESC`; the extra row only tells us whether
//! another page exists and is never returned.
//!
//! Because ids are assigned monotonically and a cursor names a row rather than
//! an offset, rows inserted while a client is paging (which always receive
//! larger ids) never shift the window of an already-issued cursor.

use crate::defaults::{PAGE_LIMIT, PAGE_LIMIT_MAX};
use crate::models::{FavoriteEntry, FavoritePage};

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    cursor: Option<i64>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: PAGE_LIMIT,
            cursor: None,
        }
    }
}

impl PageRequest {
    /// Build a request from raw values.
    ///
    /// A missing or non-positive `limit` falls back to [`PAGE_LIMIT`]; values
    /// above [`PAGE_LIMIT_MAX`] are clamped.
    pub fn new(limit: Option<i64>, cursor: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(PAGE_LIMIT_MAX),
            _ => PAGE_LIMIT,
        };
        Self { limit, cursor }
    }

    /// First page of the given size.
    pub fn first(limit: i64) -> Self {
        Self::new(Some(limit), None)
    }

    /// Same size, continuing after `cursor`.
    pub fn after(self, cursor: i64) -> Self {
        Self {
            cursor: Some(cursor),
            ..self
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Rows to fetch from the store: one past the page size.
    pub fn fetch_size(&self) -> i64 {
        self.limit + 1
    }

    /// Whether a row with this id belongs after the cursor.
    pub fn admits(&self, id: i64) -> bool {
        self.cursor.map_or(true, |cursor| id < cursor)
    }
}

/// Turn a lookahead fetch (up to `limit + 1` rows, descending id) into a page.
pub fn page_from_lookahead(mut rows: Vec<FavoriteEntry>, limit: i64) -> FavoritePage {
    let limit = usize::try_from(limit).unwrap_or(0);
    let has_more = rows.len() > limit;
    if has_more {
        rows.truncate(limit);
    }
    let next_cursor = rows.last().map(|entry| entry.id);
    FavoritePage {
        data: rows,
        next_cursor,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use chrono::Utc;

    fn entry(id: i64) -> FavoriteEntry {
        let now = Utc::now();
        FavoriteEntry {
            id,
            title: format!("Entry {}", id),
            media_type: MediaType::Movie,
            director: None,
            budget: None,
            location: None,
            duration: None,
            year_time: None,
            poster_url: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// What a store returns for `req` over the given ids.
    fn lookahead(ids: &[i64], req: PageRequest) -> Vec<FavoriteEntry> {
        let mut ids: Vec<i64> = ids.iter().copied().filter(|id| req.admits(*id)).collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.into_iter()
            .take(req.fetch_size() as usize)
            .map(entry)
            .collect()
    }

    fn ids(page: &FavoritePage) -> Vec<i64> {
        page.data.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_limit_defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None).limit(), 20);
        assert_eq!(PageRequest::new(Some(0), None).limit(), 20);
        assert_eq!(PageRequest::new(Some(-5), None).limit(), 20);
        assert_eq!(PageRequest::new(Some(1), None).limit(), 1);
        assert_eq!(PageRequest::new(Some(100), None).limit(), 100);
        assert_eq!(PageRequest::new(Some(1000), None).limit(), 100);
        assert_eq!(PageRequest::new(Some(15), None).fetch_size(), 16);
    }

    #[test]
    fn test_walk_five_entries_two_per_page() {
        let all = [1, 2, 3, 4, 5];
        let req = PageRequest::first(2);

        let p1 = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&p1), vec![5, 4]);
        assert_eq!(p1.next_cursor, Some(4));
        assert!(p1.has_more);

        let req = req.after(4);
        let p2 = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&p2), vec![3, 2]);
        assert_eq!(p2.next_cursor, Some(2));
        assert!(p2.has_more);

        let req = req.after(2);
        let p3 = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&p3), vec![1]);
        assert_eq!(p3.next_cursor, Some(1));
        assert!(!p3.has_more);
    }

    #[test]
    fn test_exact_multiple_reports_no_more() {
        let all = [1, 2, 3, 4];
        let req = PageRequest::first(2).after(3);
        let page = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&page), vec![2, 1]);
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_result_has_null_cursor() {
        let page = page_from_lookahead(Vec::new(), 20);
        assert_eq!(page, FavoritePage::empty());
    }

    #[test]
    fn test_cursor_at_minimum_id_is_empty_not_error() {
        let all = [3, 4, 5];
        let req = PageRequest::first(2).after(3);
        let page = page_from_lookahead(lookahead(&all, req), req.limit());
        assert!(page.data.is_empty());
        assert_eq!(page.next_cursor, None);
        assert!(!page.has_more);
    }

    #[test]
    fn test_deleted_cursor_still_filters_by_predicate() {
        // id 4 was deleted after being handed out as a cursor
        let all = [1, 2, 3, 5];
        let req = PageRequest::first(2).after(4);
        let page = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&page), vec![3, 2]);
        assert!(page.has_more);
    }

    #[test]
    fn test_inserts_during_pagination_do_not_shift_pages() {
        let mut all: Vec<i64> = (1..=7).collect();
        let req = PageRequest::first(3);
        let p1 = page_from_lookahead(lookahead(&all, req), req.limit());
        assert_eq!(ids(&p1), vec![7, 6, 5]);

        // Concurrent inserts land above every issued cursor
        all.extend([8, 9]);

        let mut seen = ids(&p1);
        let mut cursor = p1.next_cursor;
        let mut has_more = p1.has_more;
        while has_more {
            let req = req.after(cursor.unwrap());
            let page = page_from_lookahead(lookahead(&all, req), req.limit());
            seen.extend(ids(&page));
            cursor = page.next_cursor;
            has_more = page.has_more;
        }
        assert_eq!(seen, vec![7, 6, 5, 4, 3, 2, 1]);
    }
}
