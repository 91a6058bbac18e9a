pub mod locate;
pub mod probe;
pub mod verify;
