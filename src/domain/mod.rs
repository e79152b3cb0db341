pub mod entity;
pub mod result;
pub mod skills;
