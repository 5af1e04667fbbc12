pub mod clip;
pub mod wav;

pub use clip::{AudioExtent, AudioRef};
pub use wav::WavInfo;
