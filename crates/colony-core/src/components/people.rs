//! Citizen data and jobs.

use super::common::{BlockPos, BuildingId, CitizenId, Name};
use serde::{Deserialize, Serialize};

/// Job a citizen holds at a worker building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Farmer,
    Deliveryman {
        /// Where the current delivery is headed, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination: Option<BlockPos>,
    },
    Sawmill,
}

impl Job {
    /// Translation key for the job's display name
    pub fn name_key(&self) -> &'static str {
        match self {
            Job::Farmer => "job.farmer",
            Job::Deliveryman { .. } => "job.deliveryman",
            Job::Sawmill => "job.sawmill",
        }
    }

    pub fn deliveryman() -> Self {
        Job::Deliveryman { destination: None }
    }

    pub fn destination(&self) -> Option<BlockPos> {
        match self {
            Job::Deliveryman { destination } => *destination,
            _ => None,
        }
    }

    /// Set the delivery target. Ignored for jobs that do not deliver.
    pub fn set_destination(&mut self, target: Option<BlockPos>) {
        if let Job::Deliveryman { destination } = self {
            *destination = target;
        }
    }
}

/// A colony citizen.
///
/// `home` is the citizen's side of the residency link. It is readable from
/// anywhere but only the residency system writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Citizen {
    id: CitizenId,
    pub name: Name,
    pub job: Option<Job>,
    home: Option<BuildingId>,
}

impl Citizen {
    pub fn new(id: CitizenId, name: Name) -> Self {
        Self {
            id,
            name,
            job: None,
            home: None,
        }
    }

    pub fn id(&self) -> CitizenId {
        self.id
    }

    /// The home this citizen lives in, if any
    pub fn home(&self) -> Option<BuildingId> {
        self.home
    }

    pub fn is_homeless(&self) -> bool {
        self.home.is_none()
    }

    pub(crate) fn set_home(&mut self, home: Option<BuildingId>) {
        self.home = home;
    }
}
