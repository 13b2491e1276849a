use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::auth::get_me,
        api::auth::change_password,
        api::user::list_users,
        api::user::create_user,
        api::user::get_user,
        api::user::update_user,
        api::user::delete_user,
        api::classifications::list_classifications,
        api::classifications::create_classification,
        api::classifications::get_classification,
        api::classifications::update_classification,
        api::classifications::delete_classification,
        api::classification_details::list_classification_details,
        api::classification_details::create_classification_detail,
        api::classification_details::get_classification_detail,
        api::classification_details::update_classification_detail,
        api::classification_details::delete_classification_detail,
        api::divisions::list_divisions,
        api::divisions::create_division,
        api::divisions::get_division,
        api::divisions::update_division,
        api::divisions::delete_division,
        api::books::list_books,
        api::books::create_book,
        api::books::get_book,
        api::books::update_book,
        api::books::delete_book,
    ),
    tags(
        (name = "librarium", description = "Librarium catalog API")
    )
)]
pub struct ApiDoc;
