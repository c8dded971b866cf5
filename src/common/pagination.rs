use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters. `page` is 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: PageParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            data,
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }

    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);

        let params = PageParams { page: Some(0), limit: Some(1000) };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_LIMIT);

        let params = PageParams { page: Some(3), limit: Some(10) };
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let params = PageParams { page: Some(i64::MAX), limit: Some(20) };
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PageParams { page: Some(1), limit: Some(10) };
        assert_eq!(Paginated::new(vec![1; 10], params, 21).total_pages, 3);
        assert_eq!(Paginated::new(vec![1; 10], params, 20).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], params, 0).total_pages, 0);
    }
}
