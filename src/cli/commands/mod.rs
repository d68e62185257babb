pub mod donations;
pub mod members;
pub mod rankings;
pub mod schedules;
pub mod signatures;
