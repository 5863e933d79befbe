pub mod chat;
pub mod dependencies;
pub mod files;
pub mod health;
pub mod settings;
pub mod stop;
pub mod test_connection;
