mod api_tests;
mod common;
mod crawl_tests;
