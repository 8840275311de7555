pub mod job;
pub mod resubmit;
pub mod status;
pub mod submit;
