pub mod cyk;
