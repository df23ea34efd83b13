pub mod chat_dto;
pub mod question_dto;
pub mod upload_dto;
