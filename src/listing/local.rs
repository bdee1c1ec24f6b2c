use std::cmp::Ordering;

use crate::listing::column::Record;
use crate::listing::query::{ListQuery, ListResult, SortOrder};

/// Filter, sort and slice a full result set the way a paginating backend
/// would. Used for resources whose API returns everything at once.
///
/// A row matches when any `searchable` field contains the filter,
/// ignoring case.
pub fn page_locally<T: Record>(
    items: Vec<T>,
    query: &ListQuery,
    searchable: &[&str],
) -> ListResult<T> {
    let needle = query.filter().to_lowercase();

    let mut rows: Vec<T> = items
        .into_iter()
        .filter(|row| {
            needle.is_empty()
                || searchable
                    .iter()
                    .filter_map(|key| row.field(key))
                    .any(|value| value.to_lowercase().contains(&needle))
        })
        .collect();

    if let Some(key) = &query.sort_key {
        rows.sort_by(|a, b| {
            let ordering = compare_fields(a.field(key), b.field(key));
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let total_count = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(query.offset())
        .take(query.page_size as usize)
        .collect();
    ListResult::new(items, total_count)
}

fn compare_fields(a: Option<String>, b: Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
