mod telegram;

pub use telegram::TelegramApi;
