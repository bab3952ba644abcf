pub mod app;
pub mod config;
pub mod error;
pub mod models {
    pub mod document;
    pub mod search;
}
pub mod storage {
    pub mod client;
    pub mod documents;
    pub mod path;
    pub mod tree;
}
pub mod search {
    pub mod client;
}
pub mod rendering {
    pub mod markdown;
}
pub mod api {
    pub mod errors;
    pub mod render;
    pub mod search;
    pub mod tree;
    pub mod upload;
}
pub mod web {
    pub mod breadcrumbs;
    pub mod pages;
    pub mod views;
}
