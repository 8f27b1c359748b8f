/// Sanitized page/limit pair taken from query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Missing or zero values fall back to page 1 and the configured default
    /// page size.
    pub fn from_query(page: Option<usize>, limit: Option<usize>, default_limit: usize) -> Self {
        let page = match page {
            Some(page) if page >= 1 => page,
            _ => 1,
        };
        let limit = match limit {
            Some(limit) if limit >= 1 => limit,
            _ => default_limit,
        };
        Self { page, limit }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub total: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub is_last_page: bool,
}

/// Slices one page out of an already-sorted collection and reports the
/// pagination envelope: `total_pages = ceil(total / limit)` and
/// `is_last_page = page * limit >= total`.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, PageInfo) {
    let total = items.len();
    let info = PageInfo {
        total,
        current_page: request.page,
        total_pages: (total + request.limit - 1) / request.limit,
        is_last_page: request.page * request.limit >= total,
    };

    let page = items
        .into_iter()
        .skip((request.page - 1) * request.limit)
        .take(request.limit)
        .collect();

    (page, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_and_zero_values() {
        assert_eq!(
            PageRequest::from_query(None, None, 5),
            PageRequest { page: 1, limit: 5 }
        );
        assert_eq!(
            PageRequest::from_query(Some(0), Some(0), 5),
            PageRequest { page: 1, limit: 5 }
        );
        assert_eq!(
            PageRequest::from_query(Some(3), Some(20), 5),
            PageRequest { page: 3, limit: 20 }
        );
    }

    #[test]
    fn second_page_of_seven_posts_is_the_last() {
        let items: Vec<u32> = (0..7).collect();
        let (page, info) = paginate(items, PageRequest { page: 2, limit: 5 });

        assert_eq!(page, vec![5, 6]);
        assert_eq!(info.total, 7);
        assert_eq!(info.total_pages, 2);
        assert!(info.is_last_page);
    }

    #[test]
    fn first_page_of_seven_posts_is_not_the_last() {
        let items: Vec<u32> = (0..7).collect();
        let (page, info) = paginate(items, PageRequest { page: 1, limit: 5 });

        assert_eq!(page.len(), 5);
        assert!(!info.is_last_page);
    }

    #[test]
    fn page_past_the_end_is_empty_but_still_last() {
        let items: Vec<u32> = (0..3).collect();
        let (page, info) = paginate(items, PageRequest { page: 4, limit: 5 });

        assert!(page.is_empty());
        assert_eq!(info.total_pages, 1);
        assert!(info.is_last_page);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let (page, info) = paginate(Vec::<u32>::new(), PageRequest { page: 1, limit: 5 });

        assert!(page.is_empty());
        assert_eq!(info.total, 0);
        assert_eq!(info.total_pages, 0);
        assert!(info.is_last_page);
    }

    #[test]
    fn exact_multiple_boundary() {
        let items: Vec<u32> = (0..10).collect();
        let (_, info) = paginate(items, PageRequest { page: 2, limit: 5 });

        assert_eq!(info.total_pages, 2);
        assert!(info.is_last_page);
    }
}
