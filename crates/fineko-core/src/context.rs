//! Request-scoped tenant context.

use uuid::Uuid;

/// Who is calling, and on behalf of which company.
///
/// Produced by session resolution; every tenant-scoped operation takes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub employee_id: Uuid,
    pub session_id: Uuid,
}
