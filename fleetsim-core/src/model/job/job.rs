use super::{JobError, JobId, JobStatus};
use crate::model::region::ZoneId;
use crate::model::vehicle::VehicleId;
use serde::Serialize;
use uom::si::f64::{Length, Time};
use uom::si::length::kilometer;
use uom::si::time::second;

/// one ride request replayed from the demand stream.
///
/// A job records its servicing vehicle by id only; the vehicle is resolved
/// through the simulator's fleet table when needed. The id stays recorded
/// through the terminal states so a finished job can be attributed.
#[derive(Debug)]
pub struct Job {
    job_id: JobId,
    pickup: ZoneId,
    dropoff: ZoneId,
    service_duration: Time,
    distance: Length,
    fare: f64,
    vehicle: Option<VehicleId>,
    status: JobStatus,
    elapsed_since_arrival: Time,
}

impl Job {
    pub fn new(
        job_id: JobId,
        pickup: ZoneId,
        dropoff: ZoneId,
        service_duration: Time,
        distance: Length,
        fare: f64,
    ) -> Job {
        Job {
            job_id,
            pickup,
            dropoff,
            service_duration,
            distance,
            fare,
            vehicle: None,
            status: JobStatus::Arrived,
            elapsed_since_arrival: Time::new::<second>(0.0),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn pickup(&self) -> ZoneId {
        self.pickup
    }

    pub fn dropoff(&self) -> ZoneId {
        self.dropoff
    }

    pub fn service_duration(&self) -> Time {
        self.service_duration
    }

    pub fn distance(&self) -> Length {
        self.distance
    }

    pub fn fare(&self) -> f64 {
        self.fare
    }

    pub fn vehicle(&self) -> Option<VehicleId> {
        self.vehicle
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Arrived -> Assigned. re-assignment while still Assigned overwrites
    /// the recorded vehicle, which is how a later command supersedes an
    /// earlier one within the same tick.
    pub fn assign_vehicle(&mut self, vehicle: VehicleId) -> Result<(), JobError> {
        match self.status {
            JobStatus::Arrived | JobStatus::Assigned => {
                self.vehicle = Some(vehicle);
                self.status = JobStatus::Assigned;
                Ok(())
            }
            from => Err(self.illegal(from, JobStatus::Assigned)),
        }
    }

    /// Assigned -> InProgress, called by the vehicle on arrival at pickup.
    pub fn inprogress(&mut self) -> Result<(), JobError> {
        match self.status {
            JobStatus::Assigned => {
                self.status = JobStatus::InProgress;
                Ok(())
            }
            from => Err(self.illegal(from, JobStatus::InProgress)),
        }
    }

    /// InProgress -> Complete.
    pub fn complete(&mut self) -> Result<(), JobError> {
        match self.status {
            JobStatus::InProgress => {
                self.status = JobStatus::Complete;
                Ok(())
            }
            from => Err(self.illegal(from, JobStatus::Complete)),
        }
    }

    /// any non-terminal state -> Failed, called by the vehicle when it
    /// depletes mid-trip.
    pub fn fail(&mut self) -> Result<(), JobError> {
        if self.status.is_terminal() {
            return Err(self.illegal(self.status, JobStatus::Failed));
        }
        self.status = JobStatus::Failed;
        Ok(())
    }

    /// advances the rejection clock. a job still Arrived after its first
    /// full tick transitions to Rejected, so rejection lands exactly one
    /// tick after first appearance.
    pub fn tick(&mut self, dt: Time) {
        self.elapsed_since_arrival += dt;
        if self.status == JobStatus::Arrived && self.elapsed_since_arrival > dt {
            self.status = JobStatus::Rejected;
            self.vehicle = None;
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job_id,
            pickup: self.pickup,
            dropoff: self.dropoff,
            service_duration_s: self.service_duration.get::<second>(),
            distance_km: self.distance.get::<kilometer>(),
            fare: self.fare,
            vehicle: self.vehicle,
            status: self.status,
            elapsed_s: self.elapsed_since_arrival.get::<second>(),
        }
    }

    fn illegal(&self, from: JobStatus, to: JobStatus) -> JobError {
        JobError::IllegalTransition {
            job_id: self.job_id,
            from,
            to,
        }
    }
}

/// serializable view of a [`Job`] for `info` payloads and run logs.
#[derive(Clone, Debug, Serialize)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub pickup: ZoneId,
    pub dropoff: ZoneId,
    pub service_duration_s: f64,
    pub distance_km: f64,
    pub fare: f64,
    pub vehicle: Option<VehicleId>,
    pub status: JobStatus,
    pub elapsed_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new(
            JobId(7),
            ZoneId(1),
            ZoneId(2),
            Time::new::<second>(600.0),
            Length::new::<kilometer>(3.2),
            12.5,
        )
    }

    #[test]
    fn test_lifecycle_to_complete() {
        let mut j = job();
        j.assign_vehicle(VehicleId(0)).unwrap();
        assert_eq!(j.status(), JobStatus::Assigned);
        assert_eq!(j.vehicle(), Some(VehicleId(0)));
        j.inprogress().unwrap();
        j.complete().unwrap();
        assert_eq!(j.status(), JobStatus::Complete);
        // the vehicle stays recorded through the terminal state
        assert_eq!(j.vehicle(), Some(VehicleId(0)));
    }

    #[test]
    fn test_reassignment_overwrites_vehicle() {
        let mut j = job();
        j.assign_vehicle(VehicleId(0)).unwrap();
        j.assign_vehicle(VehicleId(3)).unwrap();
        assert_eq!(j.vehicle(), Some(VehicleId(3)));
        assert_eq!(j.status(), JobStatus::Assigned);
    }

    #[test]
    fn test_rejection_exactly_one_tick_after_arrival() {
        let dt = Time::new::<second>(300.0);
        let mut j = job();
        j.tick(dt);
        assert_eq!(j.status(), JobStatus::Arrived);
        j.tick(dt);
        assert_eq!(j.status(), JobStatus::Rejected);
        // terminal states absorb further ticks
        j.tick(dt);
        assert_eq!(j.status(), JobStatus::Rejected);
    }

    #[test]
    fn test_assigned_job_is_not_rejected() {
        let dt = Time::new::<second>(300.0);
        let mut j = job();
        j.assign_vehicle(VehicleId(1)).unwrap();
        j.tick(dt);
        j.tick(dt);
        assert_eq!(j.status(), JobStatus::Assigned);
    }

    #[test]
    fn test_fail_from_any_non_terminal() {
        let mut j = job();
        j.fail().unwrap();
        assert_eq!(j.status(), JobStatus::Failed);

        let mut j = job();
        j.assign_vehicle(VehicleId(0)).unwrap();
        j.inprogress().unwrap();
        j.fail().unwrap();
        assert_eq!(j.status(), JobStatus::Failed);
        assert!(j.fail().is_err());
    }

    #[test]
    fn test_transitions_never_regress() {
        let mut j = job();
        assert!(j.inprogress().is_err());
        assert!(j.complete().is_err());
        j.assign_vehicle(VehicleId(0)).unwrap();
        j.inprogress().unwrap();
        assert!(j.assign_vehicle(VehicleId(1)).is_err());
        j.complete().unwrap();
        assert!(j.inprogress().is_err());
    }
}
