//! Success envelopes shared by all routes.
//!
//! Shapes:
//! - single resource: `{ "success": true, "data": ..., "message": ... }`
//! - list:            `{ "success": true, "data": [...], "pagination": {...} }`

use serde::Serialize;

/// Success envelope for a single resource.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Success envelope for a paginated list.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        ListResponse {
            success: true,
            data,
            pagination,
        }
    }
}

/// Pagination block for list responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Builds the block from the validated page/limit and the total count.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Pagination {
            page,
            limit,
            total,
            // ceil(total / limit); limit is validated >= 1 upstream
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_pagination_wire_names() {
        let json = serde_json::to_value(Pagination::new(2, 10, 25)).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["totalPages"], 3);
    }
}
