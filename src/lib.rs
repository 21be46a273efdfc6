//! Apparent geocentric positions of the Sun, Moon and planets laid out on a
//! zodiac band, with motion classes, drift trends and depth hints.

pub mod angle;
pub mod body;
pub mod config;
pub mod depth;
pub mod elements;
pub mod ephemeris;
pub mod error;
pub mod frame;
pub mod kepler;
pub mod motion;
pub mod position;
pub mod state;
pub mod trend;
pub mod view;
pub mod zodiac;

pub use body::{Body, BodyMap};
pub use ephemeris::{Ephemeris, EphemerisMode, EphemerisOracle};
pub use error::EphemerisError;
pub use frame::ReferenceFrame;
pub use state::{AppState, Navigation, Toggle, ViewOptions};
pub use view::{render, Frame, RenderPort};
