pub mod line;
pub mod vocabulary;

pub use line::LineGenerator;
