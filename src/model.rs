pub mod channel;
pub mod guild;
pub mod ids;
pub mod message;
