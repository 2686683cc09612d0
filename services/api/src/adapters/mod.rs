pub mod booking_api;
pub mod chat_api;

pub use booking_api::HttpBookingGateway;
pub use chat_api::HttpChatGateway;
