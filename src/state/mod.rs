pub mod gesture;
pub mod ip;
pub mod session;

pub use gesture::GestureState;
pub use ip::IpLabels;
pub use session::{AnimationToken, CameraSession, SessionPhase};
