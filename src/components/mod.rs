//! Server-rendered leptos views. Every page goes through `layout::render_page`.
pub mod accounts;
pub mod catalog;
pub mod layout;
pub mod pages;
pub mod reviews;
pub mod widgets;
