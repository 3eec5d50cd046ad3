pub mod document;
pub mod event;
