//! UseCase 層
//!
//! クライアントから届く各イベントのビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の trait を通して Registry や外部の
//! Collaborator を操作します。

pub mod authenticate_connection;
pub mod deadline;
pub mod disconnect_connection;
pub mod join_room;
pub mod leave_room;
pub mod send_message;
pub mod signal_typing;

pub use authenticate_connection::AuthenticateConnectionUseCase;
pub use disconnect_connection::DisconnectConnectionUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use signal_typing::SignalTypingUseCase;
