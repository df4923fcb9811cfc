// Domain layer: player state, shot inputs, and the detector boundary.

pub mod entities;
pub mod errors;
pub mod image;
pub mod ports;
pub mod targeting;

pub use entities::{Detection, NewPlayer, Player};
pub use errors::GameError;
pub use image::ShotImage;
pub use ports::{Detector, DetectorError};
pub use targeting::{MarkerObservation, closest_target};
