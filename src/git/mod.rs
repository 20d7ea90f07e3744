pub mod remote;
pub mod repo;
