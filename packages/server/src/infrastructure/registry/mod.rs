//! Room Registry implementations
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装を提供します。

pub mod inmemory;

pub use inmemory::InMemoryRoomRegistry;
