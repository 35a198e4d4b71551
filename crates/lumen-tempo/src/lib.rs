//! Frame ingress, the energy follower, beat/tempo tracking, the phrase
//! detector, and tempo-tracker election.

pub mod beat;
pub mod energy;
pub mod ingress;
pub mod onset;
pub mod phrase;
pub mod tracker_election;

pub use beat::{BeatCoeffs, BeatDetector};
pub use energy::{EnergyCoeffs, EnergyFollower, ExternalBias};
pub use ingress::ingest;
pub use onset::OnsetEstimator;
pub use phrase::{PhraseCoeffs, PhraseDetector};
pub use tracker_election::{TrackerElection, TrackerEvidence};
