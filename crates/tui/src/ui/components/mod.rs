pub mod common;
pub mod compare;
pub(crate) mod component;
pub mod history;
pub mod models;
pub mod nav_bar;
