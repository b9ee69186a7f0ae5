use async_graphql::{InputObject, SimpleObject};
use infra::pagination::LimitOffset;

const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(InputObject, Clone, Copy, Debug, Default)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PaginationInput {
    pub fn to_limit_offset(self) -> LimitOffset {
        LimitOffset::clamped(
            self.limit.map(i64::from),
            self.offset.map(i64::from),
            DEFAULT_PAGE_SIZE,
        )
    }
}

/// Paging metadata flattened into each domain's page type.
#[derive(SimpleObject, Clone, Copy, Debug, PartialEq)]
pub struct PageInfo {
    pub total_count: i32,
    pub page_size: i32,
    pub offset: i32,
    pub has_next_page: bool,
}

impl PageInfo {
    pub fn new(item_count: usize, total_count: i64, page: LimitOffset) -> Self {
        let page_size = item_count as i32;
        let offset = page.offset as i32;
        Self {
            total_count: total_count as i32,
            page_size,
            offset,
            has_next_page: (offset + page_size) < total_count as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_ten_items() {
        let page = PaginationInput::default().to_limit_offset();
        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);

        let page = PaginationInput {
            limit: Some(0),
            offset: Some(-5),
        }
        .to_limit_offset();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn page_info_reports_a_following_page() {
        let page = PaginationInput {
            limit: Some(2),
            offset: Some(2),
        }
        .to_limit_offset();

        let info = PageInfo::new(2, 5, page);
        assert_eq!(info.offset, 2);
        assert_eq!(info.page_size, 2);
        assert!(info.has_next_page);
        assert!(!PageInfo::new(1, 5, LimitOffset::clamped(Some(2), Some(4), 10)).has_next_page);
    }
}
