//! Category grouping
//!
//! Stable partition of records into named buckets. Buckets come out in the
//! order their category was first seen, and records keep their input order
//! inside a bucket.

use indexmap::IndexMap;

/// Bucket name for records without a usable category key
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Ordered category → records mapping
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBuckets<T> {
    buckets: IndexMap<String, Vec<T>>,
}

impl<T> Default for CategoryBuckets<T> {
    fn default() -> Self {
        Self {
            buckets: IndexMap::new(),
        }
    }
}

impl<T> CategoryBuckets<T> {
    /// Append a record under `category` (empty or absent → [`UNCATEGORIZED`])
    pub fn push(&mut self, category: Option<&str>, item: T) {
        let key = match category.map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => UNCATEGORIZED,
        };
        match self.buckets.get_mut(key) {
            Some(bucket) => bucket.push(item),
            None => {
                self.buckets.insert(key.to_string(), vec![item]);
            }
        }
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of records across all categories
    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Category names in emission order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn get(&self, category: &str) -> Option<&[T]> {
        self.buckets.get(category).map(Vec::as_slice)
    }

    /// Records in emission order, then input order within each category
    pub fn flatten(self) -> Vec<T> {
        self.buckets.into_values().flatten().collect()
    }
}

impl<T> IntoIterator for CategoryBuckets<T> {
    type Item = (String, Vec<T>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

/// Group records by the key returned from `key_fn`
pub fn group_by_category<T, I, F>(items: I, key_fn: F) -> CategoryBuckets<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<&str>,
{
    let mut buckets = CategoryBuckets::default();
    for item in items {
        // Key is copied out before `item` moves into the bucket
        let key = key_fn(&item).map(str::to_owned);
        buckets.push(key.as_deref(), item);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tagged {
        id: u32,
        category: Option<String>,
    }

    fn tagged(id: u32, category: Option<&str>) -> Tagged {
        Tagged {
            id,
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_first_seen_order_not_sorted() {
        let items = vec![
            tagged(1, Some("museums")),
            tagged(2, Some("cafes")),
            tagged(3, Some("museums")),
            tagged(4, Some("attractions")),
        ];

        let buckets = group_by_category(items, |t| t.category.as_deref());

        let categories: Vec<&str> = buckets.categories().collect();
        assert_eq!(categories, vec!["museums", "cafes", "attractions"]);
        let ids: Vec<u32> = buckets.get("museums").unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_missing_and_empty_keys_uncategorized() {
        let items = vec![tagged(1, None), tagged(2, Some("")), tagged(3, Some("  "))];

        let buckets = group_by_category(items, |t| t.category.as_deref());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.get(UNCATEGORIZED).unwrap().len(), 3);
    }

    #[test]
    fn test_flatten_is_permutation_of_input() {
        let items = vec![
            tagged(1, Some("b")),
            tagged(2, Some("a")),
            tagged(3, None),
            tagged(4, Some("b")),
            tagged(5, Some("a")),
        ];

        let buckets = group_by_category(items.clone(), |t| t.category.as_deref());
        assert_eq!(buckets.record_count(), items.len());
        assert_eq!(buckets.categories().next(), Some("b"));

        let mut flat: Vec<u32> = buckets.flatten().into_iter().map(|t| t.id).collect();
        assert_eq!(flat, vec![1, 4, 2, 5, 3]);
        flat.sort_unstable();
        assert_eq!(flat, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_input() {
        let buckets = group_by_category(Vec::<Tagged>::new(), |t| t.category.as_deref());
        assert!(buckets.is_empty());
        assert_eq!(buckets.record_count(), 0);
    }
}
