pub struct Env {
    pub database_url: String,
    pub redis_url: String,
    pub folder_path: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
}

impl Env {
    fn new() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost:5432/filevault".to_string());
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let folder_path =
            std::env::var("FOLDER_PATH").unwrap_or_else(|_| "/tmp/filevault".to_string());

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        Env { database_url, redis_url, folder_path, frontend_url, ip, port }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
