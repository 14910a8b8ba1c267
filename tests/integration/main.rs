//! Integration tests for Redirect Mapper
//!
//! Crawl tests run the fetcher and coordinator against wiremock servers.
//! Matching and pipeline tests use a scripted in-process inference client,
//! except where the Gemini client itself is under test.

mod crawl_tests;
mod helpers;
mod match_tests;
mod pipeline_tests;
