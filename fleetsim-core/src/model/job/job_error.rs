use super::{JobId, JobStatus};

#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("illegal job transition on {job_id}: {from} -> {to}")]
    IllegalTransition {
        job_id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}
