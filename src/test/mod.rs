//! In-memory doubles for the repository/store/queue seams, plus HTTP-level
//! tests that wire the full route table against them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::api::error;
use crate::modules::file::model::InsertFile;
use crate::modules::file::repository::{FileRepository, PAGE_SIZE};
use crate::modules::file::schema::FileEntity;
use crate::modules::session::store::SessionStore;
use crate::modules::thumbnail::model::ThumbnailJob;
use crate::modules::thumbnail::queue::ThumbnailQueue;
use crate::modules::user::model::InsertUser;
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<UserEntity>>,
}

impl MemoryUserRepository {
    pub fn remove(&self, id: &Uuid) {
        self.users.lock().unwrap().retain(|u| &u.id != id);
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::now_v7();
        self.users.lock().unwrap().push(UserEntity {
            id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            created_at: chrono::Utc::now(),
        });
        Ok(id)
    }

    async fn count(&self) -> Result<i64, error::SystemError> {
        Ok(self.users.lock().unwrap().len() as i64)
    }
}

/// Keeps insertion order, which is what the SQL `ORDER BY created_at, id`
/// produces for sequential writes.
#[derive(Default)]
pub struct MemoryFileRepository {
    files: Mutex<Vec<FileEntity>>,
}

#[async_trait::async_trait]
impl FileRepository for MemoryFileRepository {
    async fn insert(&self, file: &InsertFile) -> Result<FileEntity, error::SystemError> {
        let entity = FileEntity {
            id: Uuid::now_v7(),
            owner_id: file.owner_id,
            name: file.name.clone(),
            kind: file.kind,
            parent_id: file.parent_id,
            is_public: file.is_public,
            content_ref: file.content_ref.clone(),
            created_at: chrono::Utc::now(),
        };
        self.files.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self.files.lock().unwrap().iter().find(|f| &f.id == id).cloned())
    }

    async fn find_owned(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| &f.id == id && &f.owner_id == owner_id)
            .cloned())
    }

    async fn find_public_or_owned(
        &self,
        id: &Uuid,
        requester: Option<&Uuid>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .find(|f| &f.id == id && (f.is_public || requester == Some(&f.owner_id)))
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<&Uuid>,
        page: i64,
    ) -> Result<Vec<FileEntity>, error::SystemError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| &f.owner_id == owner_id && f.parent_id.as_ref() == parent_id)
            .skip((page * PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect())
    }

    async fn set_visibility(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        is_public: bool,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let mut files = self.files.lock().unwrap();
        let Some(file) = files.iter_mut().find(|f| &f.id == id && &f.owner_id == owner_id) else {
            return Ok(None);
        };
        file.is_public = is_public;
        Ok(Some(file.clone()))
    }

    async fn count(&self) -> Result<i64, error::SystemError> {
        Ok(self.files.lock().unwrap().len() as i64)
    }
}

/// TTL is enforced on read, which is all the tests need.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (Uuid, Instant)>>,
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(
        &self,
        token: &str,
        user_id: &Uuid,
        ttl_secs: usize,
    ) -> Result<(), error::SystemError> {
        let deadline = Instant::now() + Duration::from_secs(ttl_secs as u64);
        self.sessions.lock().unwrap().insert(token.to_string(), (*user_id, deadline));
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Uuid>, error::SystemError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(token).copied() {
            Some((user_id, deadline)) if deadline > Instant::now() => Ok(Some(user_id)),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), error::SystemError> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryThumbnailQueue {
    jobs: Mutex<Vec<ThumbnailJob>>,
}

impl MemoryThumbnailQueue {
    pub fn submitted(&self) -> Vec<ThumbnailJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ThumbnailQueue for MemoryThumbnailQueue {
    async fn submit(&self, job: &ThumbnailJob) -> Result<(), error::SystemError> {
        self.jobs.lock().unwrap().push(job.clone());
        Ok(())
    }
}

/// A solid-color 640x480 PNG, large enough that every thumbnail width
/// actually resizes.
pub fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(640, 480, image::Rgba([180, 40, 40, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encoding");
    bytes.into_inner()
}

mod store_tests {
    use super::*;

    #[tokio::test]
    async fn memory_sessions_expire_on_read() {
        let store = MemorySessionStore::default();
        let user = Uuid::now_v7();

        store.set("fresh", &user, 3600).await.unwrap();
        store.set("stale", &user, 0).await.unwrap();

        assert_eq!(store.get("fresh").await.unwrap(), Some(user));
        assert_eq!(store.get("stale").await.unwrap(), None);
        assert_eq!(store.get("never-set").await.unwrap(), None);
    }
}

mod http {
    use std::sync::Arc;

    use actix_web::body::{to_bytes, MessageBody};
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, web, App, HttpResponse};
    use base64::{engine::general_purpose::STANDARD, Engine};

    use super::*;
    use crate::middlewares::authentication;
    use crate::modules;
    use crate::modules::file::service::FileService;
    use crate::modules::file::store::ContentStore;
    use crate::modules::session::service::SessionManager;
    use crate::modules::user::service::UserService;
    use crate::utils::hash_password;

    struct TestBackend {
        users: Arc<MemoryUserRepository>,
        files: Arc<MemoryFileRepository>,
        sessions: Arc<MemorySessionStore>,
        jobs: Arc<MemoryThumbnailQueue>,
        dir: tempfile::TempDir,
    }

    impl TestBackend {
        fn new() -> Self {
            Self {
                users: Arc::new(MemoryUserRepository::default()),
                files: Arc::new(MemoryFileRepository::default()),
                sessions: Arc::new(MemorySessionStore::default()),
                jobs: Arc::new(MemoryThumbnailQueue::default()),
                dir: tempfile::tempdir().expect("tempdir"),
            }
        }
    }

    fn build_app(
        backend: &TestBackend,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let user_service = UserService::with_dependencies(backend.users.clone());
        let session_manager =
            SessionManager::with_dependencies(backend.users.clone(), backend.sessions.clone());
        let file_service = FileService::with_dependencies(
            backend.files.clone(),
            ContentStore::new(backend.dir.path()),
            backend.jobs.clone(),
        );

        App::new()
            .app_data(web::Data::new(user_service))
            .app_data(web::Data::new(session_manager))
            .app_data(web::Data::new(file_service))
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
    }

    /// Requests refused by the authentication middleware come back as a
    /// service-level error; the HTTP layer would render it through
    /// `ResponseError`, so the tests do the same.
    async fn read_error(err: actix_web::Error) -> (StatusCode, serde_json::Value) {
        let res = HttpResponse::from_error(err);
        let status = res.status();
        let bytes = to_bytes(res.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Seeds a user and a live session directly through the doubles.
    async fn seed_session(backend: &TestBackend, email: &str) -> (Uuid, String) {
        let user_id = backend
            .users
            .create(&InsertUser {
                email: email.to_string(),
                password_hash: hash_password("toto1234!").unwrap(),
            })
            .await
            .unwrap();
        let token = Uuid::new_v4().to_string();
        backend.sessions.set(&token, &user_id, 86_400).await.unwrap();
        (user_id, token)
    }

    #[actix_web::test]
    async fn register_connect_upload_publish_and_read() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::json!({"email": "bob@dylan.com", "password": "toto1234!"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(created["email"], "bob@dylan.com");

        let header = format!("Basic {}", STANDARD.encode("bob@dylan.com:toto1234!"));
        let req = test::TestRequest::get()
            .uri("/connect")
            .insert_header(("Authorization", header))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        let token = body["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-Token", token.clone()))
            .set_json(serde_json::json!({
                "name": "hello.txt",
                "type": "file",
                "data": STANDARD.encode("Hello World"),
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let file: serde_json::Value = test::read_body_json(res).await;
        let file_id = file["id"].as_str().unwrap().to_string();
        assert_eq!(file["kind"], "file");
        assert_eq!(file["is_public"], false);
        assert!(file.get("content_ref").is_none());

        let req = test::TestRequest::get()
            .uri(&format!("/files/{file_id}"))
            .insert_header(("X-Token", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        // private content stays hidden from anonymous readers
        let req = test::TestRequest::get().uri(&format!("/files/{file_id}/data")).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/files/{file_id}/publish"))
            .insert_header(("X-Token", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let published: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(published["is_public"], true);

        let req = test::TestRequest::get().uri(&format!("/files/{file_id}/data")).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = test::read_body(res).await;
        assert_eq!(&bytes[..], b"Hello World");
    }

    #[actix_web::test]
    async fn protected_routes_refuse_missing_and_unknown_tokens() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;

        let req = test::TestRequest::get().uri("/users/me").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        let (status, body) = read_error(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("X-Token", "not-a-session"))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        let (status, _) = read_error(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn connect_rejects_wrong_credentials() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        seed_session(&backend, "bob@dylan.com").await;

        let header = format!("Basic {}", STANDARD.encode("bob@dylan.com:wrong-password"));
        let req = test::TestRequest::get()
            .uri("/connect")
            .insert_header(("Authorization", header))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Unauthorized");
    }

    #[actix_web::test]
    async fn disconnect_revokes_the_session() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (user_id, token) = seed_session(&backend, "bob@dylan.com").await;

        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("X-Token", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let me: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(me["id"], user_id.to_string());

        let req = test::TestRequest::get()
            .uri("/disconnect")
            .insert_header(("X-Token", token.clone()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("X-Token", token))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        let (status, _) = read_error(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn error_bodies_name_the_missing_field() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (_, token) = seed_session(&backend, "bob@dylan.com").await;

        let cases = [
            (serde_json::json!({"type": "file", "data": "aGk="}), "Missing name"),
            (serde_json::json!({"name": "a.txt", "data": "aGk="}), "Missing type"),
            (serde_json::json!({"name": "a.txt", "type": "archive"}), "Missing type"),
            (serde_json::json!({"name": "a.txt", "type": "file"}), "Missing data"),
        ];
        for (payload, message) in cases {
            let req = test::TestRequest::post()
                .uri("/files")
                .insert_header(("X-Token", token.clone()))
                .set_json(payload)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body["error"], message);
        }

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-Token", token.clone()))
            .set_json(serde_json::json!({
                "name": "a.txt",
                "type": "file",
                "data": "aGk=",
                "parent_id": Uuid::now_v7(),
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Parent not found");
    }

    #[actix_web::test]
    async fn duplicate_registration_reads_already_exist() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;

        let payload = serde_json::json!({"email": "bob@dylan.com", "password": "toto1234!"});
        let req = test::TestRequest::post().uri("/users").set_json(payload.clone()).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post().uri("/users").set_json(payload).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "Already exist");
    }

    #[actix_web::test]
    async fn parent_sentinels_are_accepted_on_the_wire() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (_, token) = seed_session(&backend, "bob@dylan.com").await;

        for parent in [serde_json::json!(0), serde_json::json!("0"), serde_json::Value::Null] {
            let req = test::TestRequest::post()
                .uri("/files")
                .insert_header(("X-Token", token.clone()))
                .set_json(serde_json::json!({
                    "name": "root.txt",
                    "type": "file",
                    "data": "aGk=",
                    "parent_id": parent,
                }))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::CREATED);
            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body["parent_id"], serde_json::Value::Null);
        }
    }

    #[actix_web::test]
    async fn image_uploads_enqueue_thumbnail_work() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (user_id, token) = seed_session(&backend, "bob@dylan.com").await;

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-Token", token))
            .set_json(serde_json::json!({
                "name": "photo.png",
                "type": "image",
                "data": STANDARD.encode(sample_png()),
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;

        let jobs = backend.jobs.submitted();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].file_id.unwrap().to_string(), body["id"].as_str().unwrap());
        assert_eq!(jobs[0].owner_id, Some(user_id));
    }

    #[actix_web::test]
    async fn data_reads_degrade_invalid_tokens_to_anonymous() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (_, token) = seed_session(&backend, "bob@dylan.com").await;

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-Token", token))
            .set_json(serde_json::json!({
                "name": "open.txt",
                "type": "file",
                "data": "aGk=",
                "is_public": true,
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;
        let file_id = body["id"].as_str().unwrap().to_string();

        // a stale token must not break a public read
        let req = test::TestRequest::get()
            .uri(&format!("/files/{file_id}/data"))
            .insert_header(("X-Token", "long-gone"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = test::read_body(res).await;
        assert_eq!(&bytes[..], b"hi");
    }

    #[actix_web::test]
    async fn folder_data_reads_are_bad_requests() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (_, token) = seed_session(&backend, "bob@dylan.com").await;

        let req = test::TestRequest::post()
            .uri("/files")
            .insert_header(("X-Token", token.clone()))
            .set_json(serde_json::json!({"name": "images", "type": "folder", "is_public": true}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;
        let folder_id = body["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri(&format!("/files/{folder_id}/data")).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["error"], "A folder doesn't have content");
    }

    #[actix_web::test]
    async fn listing_pages_through_the_query_string() {
        let backend = TestBackend::new();
        let app = test::init_service(build_app(&backend)).await;
        let (_, token) = seed_session(&backend, "bob@dylan.com").await;

        for i in 0..25 {
            let req = test::TestRequest::post()
                .uri("/files")
                .insert_header(("X-Token", token.clone()))
                .set_json(serde_json::json!({
                    "name": format!("f{i:02}.txt"),
                    "type": "file",
                    "data": "aGk=",
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        for (uri, expected) in [("/files", 20), ("/files?page=1", 5), ("/files?page=2", 0)] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(("X-Token", token.clone()))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body.as_array().unwrap().len(), expected);
        }

        let req = test::TestRequest::get()
            .uri("/files?page=-1")
            .insert_header(("X-Token", token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
