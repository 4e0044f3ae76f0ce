pub mod comments;
pub mod conditionals;
pub mod declarations;
