//! OpenAPI documentation configuration.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::{handlers, models};

/// OpenAPI documentation for the recipe API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ladle",
        description = "A self-hostable recipe management backend",
    ),
    paths(
        handlers::users::create_user,
        handlers::users::create_token,
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::tags::list_tags,
        handlers::tags::create_tag,
        handlers::tags::update_tag,
        handlers::tags::delete_tag,
        handlers::ingredients::list_ingredients,
        handlers::ingredients::create_ingredient,
        handlers::ingredients::update_ingredient,
        handlers::ingredients::delete_ingredient,
        handlers::recipes::list_recipes,
        handlers::recipes::create_recipe,
        handlers::recipes::get_recipe,
        handlers::recipes::update_recipe,
        handlers::recipes::delete_recipe,
        handlers::recipes::upload_recipe_image,
    ),
    components(schemas(
        models::users::UserCreate,
        models::users::UserUpdate,
        models::users::UserResponse,
        models::users::TokenRequest,
        models::users::TokenResponse,
        models::tags::TagCreate,
        models::tags::TagUpdate,
        models::tags::TagResponse,
        models::ingredients::IngredientCreate,
        models::ingredients::IngredientUpdate,
        models::ingredients::IngredientResponse,
        models::recipes::RecipeCreate,
        models::recipes::RecipeUpdate,
        models::recipes::RecipeResponse,
        models::recipes::RecipeDetailResponse,
        models::recipes::RecipeImageResponse,
    )),
    modifiers(&SecuritySchemes),
    tags(
        (name = "user", description = "Registration, token issuance and self management"),
        (name = "tags", description = "Owner-scoped recipe tags"),
        (name = "ingredients", description = "Owner-scoped recipe ingredients"),
        (name = "recipes", description = "Owner-scoped recipes"),
    )
)]
pub struct ApiDoc;

/// Registers the two accepted credential formats with the generated spec.
struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
            components.add_security_scheme("CookieAuth", SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("ladle_session"))));
        }
    }
}
