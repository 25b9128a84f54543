pub mod calc;
pub mod run;
pub mod settings;
