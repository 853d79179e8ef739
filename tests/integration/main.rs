//! Integration tests for the harvest flows

mod crawl_tests;
