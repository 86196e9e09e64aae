//! Presentation layer
//!
//! Produces GPU-ready sprite instances and overlay data from simulation
//! state. Backend agnostic: the host uploads `Frame::instances` with
//! `bytemuck::cast_slice` and draws the HUD itself.

pub mod parallax;
pub mod scene;
pub mod vertex;

pub use parallax::Parallax;
pub use scene::{FlashOverlay, Frame, HudSnapshot, Presenter, TextInstance};
pub use vertex::{SpriteId, SpriteInstance};
