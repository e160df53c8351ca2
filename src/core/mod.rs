pub mod chooser;
pub mod context;
pub mod generate;
pub mod grammar;
pub mod lint;
pub mod node;
pub mod pipeline;
