/// Unit tests for the public domain and analytics API

mod schedule_tests;
mod streak_tests;
mod analytics_tests;
