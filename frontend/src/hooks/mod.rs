pub mod use_staleness_check;
