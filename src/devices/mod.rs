pub mod camera;
pub mod pointer;
pub mod replay;
pub mod sensor;
