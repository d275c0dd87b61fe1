use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Revision counters, dirty flag, last flush time and collection counts.
    #[schema(value_type = Object)]
    pub store: serde_json::Value,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ArticleDoc {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub authors: String,
    pub institution: String,
    pub publication_date: String,
    pub pdf_file: bool,
    pub pdf_name: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ArticleFormDoc {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub authors: Option<String>,
    pub institution: Option<String>,
    pub publication_date: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub pdf: Option<Vec<u8>>,
}

#[derive(ToSchema)]
pub struct MaterialDoc { pub name: String, pub url: String, pub size: u64 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UnderstandingDoc {
    pub summary: String,
    pub materials: Vec<MaterialDoc>,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct UnderstandingFormDoc {
    pub summary: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub materials: Vec<Vec<u8>>,
}

/// Any subset of keys; values are strings or numbers.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SiteConfigDoc {
    pub site_title: Option<String>,
    pub site_subtitle: Option<String>,
    pub institution_name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub articles_per_page: Option<u32>,
}

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserDoc { pub id: u64, pub name: String, pub email: String, pub created_at: String }

#[derive(ToSchema)]
pub struct SessionDoc { pub user: UserDoc, pub token: String }

#[derive(ToSchema)]
pub struct SubscribeRequest {
    pub endpoint: String,
    #[schema(value_type = Object)]
    pub keys: serde_json::Value,
}

#[derive(ToSchema)]
pub struct UnsubscribeRequest { pub endpoint: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::articles::list,
        crate::routes::articles::get,
        crate::routes::articles::create,
        crate::routes::articles::update,
        crate::routes::articles::delete,
        crate::routes::site_config::get,
        crate::routes::site_config::merge,
        crate::routes::understanding::list,
        crate::routes::understanding::get,
        crate::routes::understanding::replace,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::users::list,
        crate::routes::users::delete,
        crate::routes::push::subscribe,
        crate::routes::push::unsubscribe,
    ),
    components(
        schemas(
            HealthResponse,
            ArticleDoc,
            ArticleFormDoc,
            MaterialDoc,
            UnderstandingDoc,
            UnderstandingFormDoc,
            SiteConfigDoc,
            RegisterRequest,
            LoginRequest,
            UserDoc,
            SessionDoc,
            SubscribeRequest,
            UnsubscribeRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "articles"),
        (name = "config"),
        (name = "understanding"),
        (name = "auth"),
        (name = "users"),
        (name = "push")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/articles", "/articles/{id}", "/config", "/understanding/{article_id}", "/auth/login", "/push/subscribe"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
