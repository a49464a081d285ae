pub mod add;
pub mod delete;
pub mod list;
pub mod pack;
pub mod unpack;
pub mod verify;
