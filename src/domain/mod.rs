pub mod lifecycle;
pub mod overdue;
