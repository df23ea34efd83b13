pub mod office;
pub mod text;
