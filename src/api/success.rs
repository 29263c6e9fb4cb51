use actix_web::HttpResponse;

pub struct Success<T: serde::Serialize> {
    pub status: actix_web::http::StatusCode,
    pub body: Option<T>,
}

impl<T: serde::Serialize> Success<T> {
    pub fn ok(data: T) -> Self {
        Self { status: actix_web::http::StatusCode::OK, body: Some(data) }
    }

    pub fn created(data: T) -> Self {
        Self { status: actix_web::http::StatusCode::CREATED, body: Some(data) }
    }

    pub fn no_content() -> Self {
        Self { status: actix_web::http::StatusCode::NO_CONTENT, body: None }
    }
}

impl<T: serde::Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        let mut response = HttpResponse::build(self.status);

        match self.body {
            Some(body) => response.json(body),
            None => response.finish(),
        }
    }
}
