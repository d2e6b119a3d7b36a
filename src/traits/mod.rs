pub mod audio;
pub mod input;
pub mod observer;
pub mod time;
