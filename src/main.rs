use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::Arc;

use filevault::{
    ENV,
    configs::{RedisCache, connect_database, create_redis_pool, run_migrations},
    middlewares::authentication,
    modules,
    modules::{
        file::{repository_pg::FilePgRepository, service::FileService, store::ContentStore},
        session::{service::SessionManager, store_redis::RedisSessionStore},
        user::{repository_pg::UserPgRepository, service::UserService},
    },
    queue::{QueueConfig, RedisJobQueue},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool).await.map_err(|_| std::io::Error::other("Migration error"))?;

    let redis_pool =
        create_redis_pool().map_err(|_| std::io::Error::other("Redis connection error"))?;
    let cache = RedisCache::new(redis_pool.clone());

    let user_repo = Arc::new(UserPgRepository::new(db_pool.clone()));
    let file_repo = Arc::new(FilePgRepository::new(db_pool.clone()));
    let content_store = ContentStore::new(&ENV.folder_path);
    let jobs = Arc::new(RedisJobQueue::new(redis_pool.clone(), QueueConfig::default()));

    let user_service = UserService::with_dependencies(user_repo.clone());
    let session_manager = SessionManager::with_dependencies(
        user_repo.clone(),
        Arc::new(RedisSessionStore::new(cache.clone())),
    );
    let file_service = FileService::with_dependencies(file_repo, content_store, jobs);

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(session_manager.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(cache.clone()))
            .configure(modules::status::route::configure)
            .configure(modules::user::route::public_api_configure)
            .configure(modules::session::route::public_api_configure)
            .configure(modules::file::route::public_api_configure)
            .service(
                web::scope("")
                    .wrap(from_fn(authentication))
                    .configure(modules::user::route::configure)
                    .configure(modules::session::route::configure)
                    .configure(modules::file::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
