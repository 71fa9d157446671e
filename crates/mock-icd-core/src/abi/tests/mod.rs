pub mod enumerate_tests;
pub mod handle_tests;
