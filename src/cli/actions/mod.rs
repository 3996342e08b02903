pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        allowed_origins: Option<Vec<String>>,
    },
}
