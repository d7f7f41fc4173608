pub mod lifecycle;
pub mod register;

pub use lifecycle::{HostLifecycle, ReadySignal};
pub use register::Register;
