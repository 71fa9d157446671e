pub mod negotiate_tests;
