pub mod completions;
pub mod deploy;
pub mod genelatte;
pub mod grind;
pub mod pour;
pub mod press;
