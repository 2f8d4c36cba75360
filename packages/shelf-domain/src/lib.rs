pub mod book;
pub mod langs;
pub mod page;
