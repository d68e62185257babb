pub mod auth;
pub mod extract;
pub mod gate;
pub mod response;

pub use auth::{clear_session_cookie, extract_token, read_cookie, session_cookie};
pub use extract::{ApiJson, ApiQuery};
pub use gate::{admin_gate, AdminUser};
pub use response::{ApiResponse, ApiResult};
