//! Record traits shared by models, stores and services

/// Records addressed by a string key such as `JOB-1A2B3C4D`
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Records that are flagged instead of removed
pub trait SoftDeletable {
    fn is_deleted(&self) -> bool;
}
