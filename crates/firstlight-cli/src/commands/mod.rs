pub mod run;
pub mod run_once;
pub mod tns;
