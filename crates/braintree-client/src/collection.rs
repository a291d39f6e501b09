//! Paged search results.
//!
//! A search first returns only the matching ids and a page size; the ids are
//! then fetched a page at a time.

use serde_json::Value;

use crate::error::GatewayError;
use crate::xml::extract_array;

/// Page size used when the gateway omits one.
const DEFAULT_PAGE_SIZE: usize = 50;

/// Ids matched by a search, in gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCollection {
    ids: Vec<String>,
    page_size: usize,
}

impl ResourceCollection {
    /// Build directly from ids. A page size of zero is treated as one.
    pub fn new(ids: Vec<String>, page_size: usize) -> Self {
        Self {
            ids,
            page_size: page_size.max(1),
        }
    }

    /// Build from a decoded `search-results` response.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Unexpected`] when the response holds no search results.
    pub fn from_response(tree: Option<Value>) -> Result<Self, GatewayError> {
        let results = tree
            .as_ref()
            .and_then(|t| t.get("searchResults"))
            .ok_or_else(|| GatewayError::Unexpected {
                message: "Expected searchResults".into(),
            })?;
        let ids = extract_array(results, "ids", "item")
            .into_iter()
            .filter_map(|id| match id {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        let page_size = results
            .get("pageSize")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(Self::new(ids, page_size))
    }

    /// Total number of matching resources.
    pub fn maximum_count(&self) -> usize {
        self.ids.len()
    }

    /// Whether the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All matching ids.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Ids per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Ids grouped into pages of at most [`page_size`](Self::page_size).
    pub fn pages(&self) -> impl Iterator<Item = &[String]> {
        self.ids.chunks(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(body: &str) -> ResourceCollection {
        ResourceCollection::from_response(Some(crate::xml::parse(body).unwrap())).unwrap()
    }

    #[test]
    fn decodes_ids_and_page_size() {
        let c = collection(
            r#"<search-results>
  <page-size type="integer">2</page-size>
  <ids type="array"><item>a</item><item>b</item><item>c</item></ids>
</search-results>"#,
        );
        assert_eq!(c.maximum_count(), 3);
        assert_eq!(c.page_size(), 2);
        let pages: Vec<&[String]> = c.pages().collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].to_vec(), vec!["c".to_string()]);
    }

    #[test]
    fn empty_ids_are_empty() {
        let c = collection(r#"<search-results><page-size type="integer">50</page-size><ids type="array"/></search-results>"#);
        assert!(c.is_empty());
        assert_eq!(c.pages().count(), 0);
    }

    #[test]
    fn missing_results_is_unexpected() {
        let err = ResourceCollection::from_response(None).unwrap_err();
        assert!(matches!(err, GatewayError::Unexpected { .. }));
    }

    #[test]
    fn unusable_page_size_falls_back_to_default() {
        let c = collection(r#"<search-results><page-size type="integer">-1</page-size><ids type="array"><item>a</item></ids></search-results>"#);
        assert_eq!(c.page_size(), DEFAULT_PAGE_SIZE);
        let c = collection(r#"<search-results><ids type="array"><item>a</item></ids></search-results>"#);
        assert_eq!(c.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let c = ResourceCollection::new(vec!["a".into()], 0);
        assert_eq!(c.page_size(), 1);
        assert_eq!(c.pages().count(), 1);
    }
}
