pub mod user {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod session {
    pub mod model;
    pub mod store;
    pub mod store_redis;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod file {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod store;
    pub mod handle;
    pub mod service;
    pub mod route;
}

pub mod status {
    pub mod handle;
    pub mod route;
}

pub mod thumbnail {
    pub mod model;
    pub mod queue;
    pub mod service;
}
