use std::sync::LazyLock;

pub mod api;
pub mod configs;
pub mod constants;
pub mod middlewares;
pub mod modules;
pub mod queue;
#[cfg(test)]
pub mod test;
pub mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});
