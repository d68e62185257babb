pub mod auth;
pub mod directory;
pub mod rankings;
pub mod robots;
pub mod status;
pub mod vip;
