//! API-level tests driving the full router through an in-process test server.

use crate::api::models::recipes::{RecipeDetailResponse, RecipeImageResponse, RecipeResponse};
use crate::api::models::tags::TagResponse;
use crate::api::models::users::{TokenResponse, UserResponse};
use crate::test_utils::{bearer, create_test_app, create_test_user, TEST_PASSWORD};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;

/// Register a user through the API and return their token.
async fn register_and_token(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/user/create")
        .json(&json!({"email": email, "password": TEST_PASSWORD, "name": "Api User"}))
        .await;
    assert_eq!(response.status_code(), 201);

    let response = server
        .post("/user/token")
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    assert_eq!(response.status_code(), 200);

    response.json::<TokenResponse>().token
}

mod user_api {
    use super::*;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_normalizes_email_and_hides_password(pool: PgPool) {
        let server = create_test_app(pool);

        let response = server
            .post("/user/create")
            .json(&json!({"email": "test@MAX.NET", "password": TEST_PASSWORD, "name": "Max"}))
            .await;

        assert_eq!(response.status_code(), 201);
        let user = response.json::<UserResponse>();
        assert_eq!(user.email, "test@max.net");
        assert_eq!(user.name, "Max");
        assert!(!user.is_staff);
        assert!(!user.is_superuser);

        // Neither the password nor its hash appear on the wire
        let raw = response.text();
        assert!(!raw.contains(TEST_PASSWORD));
        assert!(!raw.contains("password"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_empty_email_rejected(pool: PgPool) {
        let server = create_test_app(pool.clone());

        let response = server
            .post("/user/create")
            .json(&json!({"email": "", "password": TEST_PASSWORD, "name": ""}))
            .await;
        assert_eq!(response.status_code(), 400);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_short_password_rejected(pool: PgPool) {
        let server = create_test_app(pool);

        let response = server
            .post("/user/create")
            .json(&json!({"email": "short@example.com", "password": "pw", "name": ""}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_rejected(pool: PgPool) {
        let server = create_test_app(pool);

        let response = server
            .post("/user/create")
            .json(&json!({"email": "dup@example.com", "password": TEST_PASSWORD, "name": ""}))
            .await;
        assert_eq!(response.status_code(), 201);

        // Same address, different case
        let response = server
            .post("/user/create")
            .json(&json!({"email": "DUP@example.com", "password": TEST_PASSWORD, "name": ""}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_token_with_bad_credentials(pool: PgPool) {
        let server = create_test_app(pool.clone());
        create_test_user(&pool, "known@example.com").await;

        // Wrong password
        let response = server
            .post("/user/token")
            .json(&json!({"email": "known@example.com", "password": "wrong-password"}))
            .await;
        assert_eq!(response.status_code(), 400);

        // Unknown user
        let response = server
            .post("/user/token")
            .json(&json!({"email": "unknown@example.com", "password": TEST_PASSWORD}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_token_sets_session_cookie(pool: PgPool) {
        let server = create_test_app(pool.clone());
        create_test_user(&pool, "cookie@example.com").await;

        let response = server
            .post("/user/token")
            .json(&json!({"email": "cookie@example.com", "password": TEST_PASSWORD}))
            .await;

        assert_eq!(response.status_code(), 200);
        assert!(!response.json::<TokenResponse>().token.is_empty());

        let cookie = response
            .headers()
            .get("set-cookie")
            .expect("token response should set the session cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("ladle_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_me_requires_auth(pool: PgPool) {
        let server = create_test_app(pool);

        let response = server.get("/user/me").await;
        assert_eq!(response.status_code(), 401);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_me_roundtrip_and_update(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let token = register_and_token(&server, "me@example.com").await;

        let response = server.get("/user/me").add_header("authorization", format!("Bearer {token}")).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<UserResponse>().email, "me@example.com");

        // Update name and password
        let response = server
            .patch("/user/me")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&json!({"name": "Renamed", "password": "newpass123"}))
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<UserResponse>().name, "Renamed");

        // The new password authenticates, the old one does not
        let response = server
            .post("/user/token")
            .json(&json!({"email": "me@example.com", "password": "newpass123"}))
            .await;
        assert_eq!(response.status_code(), 200);

        let response = server
            .post("/user/token")
            .json(&json!({"email": "me@example.com", "password": TEST_PASSWORD}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_initial_admin_user_is_superuser(pool: PgPool) {
        let user_id = crate::create_initial_admin_user("root@example.com", Some("changeme123"), &pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = crate::db::handlers::Users::new(&mut conn);
        use crate::db::handlers::Repository as _;
        let admin = repo.get_by_id(user_id).await.unwrap().unwrap();

        assert!(admin.is_staff);
        assert!(admin.is_superuser);

        // Provisioning again reuses the same row
        let again = crate::create_initial_admin_user("root@example.com", Some("rotated456"), &pool)
            .await
            .unwrap();
        assert_eq!(again, user_id);
    }
}

mod tag_api {
    use super::*;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_requires_auth(pool: PgPool) {
        let server = create_test_app(pool);

        assert_eq!(server.get("/recipe/tags").await.status_code(), 401);
        assert_eq!(server.get("/recipe/ingredients").await.status_code(), 401);
        assert_eq!(server.get("/recipe/recipes").await.status_code(), 401);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_list_ordered(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "tags@example.com").await;

        for name in ["Vegan", "Dessert"] {
            let response = server
                .post("/recipe/tags")
                .add_header("authorization", bearer(&user))
                .json(&json!({"name": name}))
                .await;
            assert_eq!(response.status_code(), 201);
            assert_eq!(response.json::<TagResponse>().name, name);
        }

        let response = server.get("/recipe/tags").add_header("authorization", bearer(&user)).await;
        assert_eq!(response.status_code(), 200);

        let names: Vec<String> = response.json::<Vec<TagResponse>>().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Vegan", "Dessert"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tags_limited_to_owner(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "mine@example.com").await;
        let other = create_test_user(&pool, "other@example.com").await;

        server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&other))
            .json(&json!({"name": "Fruit"}))
            .await;
        server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .json(&json!({"name": "Comfort Food"}))
            .await;

        let tags = server
            .get("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .await
            .json::<Vec<TagResponse>>();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Comfort Food");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_with_empty_name_persists_nothing(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "tags@example.com").await;

        let response = server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .json(&json!({"name": ""}))
            .await;
        assert_eq!(response.status_code(), 400);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete_foreign_tag_is_hidden(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "mine@example.com").await;
        let other = create_test_user(&pool, "other@example.com").await;

        let tag = server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&other))
            .json(&json!({"name": "Theirs"}))
            .await
            .json::<TagResponse>();

        // Another user's tag reads as missing, not forbidden
        let response = server
            .patch(&format!("/recipe/tags/{}", tag.id))
            .add_header("authorization", bearer(&user))
            .json(&json!({"name": "Hijacked"}))
            .await;
        assert_eq!(response.status_code(), 404);

        let response = server
            .delete(&format!("/recipe/tags/{}", tag.id))
            .add_header("authorization", bearer(&user))
            .await;
        assert_eq!(response.status_code(), 404);

        // Untouched for its owner
        let tags = server
            .get("/recipe/tags")
            .add_header("authorization", bearer(&other))
            .await
            .json::<Vec<TagResponse>>();
        assert_eq!(tags[0].name, "Theirs");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_assigned_only_filters_and_collapses(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "tags@example.com").await;

        let breakfast = server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .json(&json!({"name": "Breakfast"}))
            .await
            .json::<TagResponse>();
        server
            .post("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .json(&json!({"name": "Lunch"}))
            .await;

        // Two recipes referencing the same tag
        for title in ["Pancakes", "Porridge"] {
            let response = server
                .post("/recipe/recipes")
                .add_header("authorization", bearer(&user))
                .json(&json!({
                    "title": title,
                    "time_minutes": 5,
                    "price": "3.00",
                    "tags": [breakfast.id],
                }))
                .await;
            assert_eq!(response.status_code(), 201);
        }

        let assigned = server
            .get("/recipe/tags?assigned_only=1")
            .add_header("authorization", bearer(&user))
            .await
            .json::<Vec<TagResponse>>();

        // The referenced tag appears exactly once, the unassigned one not at all
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, breakfast.id);

        // Without the filter both tags are returned
        let all = server
            .get("/recipe/tags")
            .add_header("authorization", bearer(&user))
            .await
            .json::<Vec<TagResponse>>();
        assert_eq!(all.len(), 2);
    }
}

mod recipe_api {
    use super::*;

    async fn create_tag(server: &TestServer, auth: &str, name: &str) -> TagResponse {
        server
            .post("/recipe/tags")
            .add_header("authorization", auth.to_string())
            .json(&json!({"name": name}))
            .await
            .json::<TagResponse>()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_detail(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;
        let auth = bearer(&user);

        let tag = create_tag(&server, &auth, "Breakfast").await;

        let response = server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({
                "title": "Coriander eggs on toast",
                "time_minutes": 10,
                "price": "5.00",
                "link": "https://example.com/eggs",
                "tags": [tag.id],
            }))
            .await;
        assert_eq!(response.status_code(), 201);
        let recipe = response.json::<RecipeResponse>();
        assert_eq!(recipe.title, "Coriander eggs on toast");
        assert_eq!(recipe.tags, vec![tag.id]);

        // Detail response embeds the linked objects
        let detail = server
            .get(&format!("/recipe/recipes/{}", recipe.id))
            .add_header("authorization", auth)
            .await
            .json::<RecipeDetailResponse>();
        assert_eq!(detail.tags.len(), 1);
        assert_eq!(detail.tags[0].name, "Breakfast");
        assert_eq!(detail.ingredients.len(), 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_title_rejected(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;

        let response = server
            .post("/recipe/recipes")
            .add_header("authorization", bearer(&user))
            .json(&json!({"title": "", "time_minutes": 10, "price": "5.00"}))
            .await;
        assert_eq!(response.status_code(), 400);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_recipes_limited_to_owner(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "mine@example.com").await;
        let other = create_test_user(&pool, "other@example.com").await;

        server
            .post("/recipe/recipes")
            .add_header("authorization", bearer(&other))
            .json(&json!({"title": "Their dish", "time_minutes": 10, "price": "5.00"}))
            .await;

        let recipes = server
            .get("/recipe/recipes")
            .add_header("authorization", bearer(&user))
            .await
            .json::<Vec<RecipeResponse>>();
        assert!(recipes.is_empty());

        // Direct access to a foreign recipe reads as missing
        let their_recipe = server
            .get("/recipe/recipes")
            .add_header("authorization", bearer(&other))
            .await
            .json::<Vec<RecipeResponse>>();
        let response = server
            .get(&format!("/recipe/recipes/{}", their_recipe[0].id))
            .add_header("authorization", bearer(&user))
            .await;
        assert_eq!(response.status_code(), 404);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_filter_by_tag_id(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;
        let auth = bearer(&user);

        let vegan = create_tag(&server, &auth, "Vegan").await;

        server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "Vegan curry", "time_minutes": 30, "price": "7.50", "tags": [vegan.id]}))
            .await;
        server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "Steak", "time_minutes": 20, "price": "12.00"}))
            .await;

        let filtered = server
            .get(&format!("/recipe/recipes?tags={}", vegan.id))
            .add_header("authorization", auth)
            .await
            .json::<Vec<RecipeResponse>>();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Vegan curry");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_patch_replaces_tags_and_delete(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;
        let auth = bearer(&user);

        let old_tag = create_tag(&server, &auth, "Old").await;
        let new_tag = create_tag(&server, &auth, "New").await;

        let recipe = server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "Evolving", "time_minutes": 10, "price": "4.00", "tags": [old_tag.id]}))
            .await
            .json::<RecipeResponse>();

        let detail = server
            .patch(&format!("/recipe/recipes/{}", recipe.id))
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "Evolved", "tags": [new_tag.id]}))
            .await
            .json::<RecipeDetailResponse>();

        assert_eq!(detail.title, "Evolved");
        assert_eq!(detail.tags.len(), 1);
        assert_eq!(detail.tags[0].id, new_tag.id);

        let response = server
            .delete(&format!("/recipe/recipes/{}", recipe.id))
            .add_header("authorization", auth.clone())
            .await;
        assert_eq!(response.status_code(), 204);

        let response = server
            .get(&format!("/recipe/recipes/{}", recipe.id))
            .add_header("authorization", auth)
            .await;
        assert_eq!(response.status_code(), 404);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_linking_foreign_tag_rejected(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "mine@example.com").await;
        let other = create_test_user(&pool, "other@example.com").await;

        let foreign_tag = create_tag(&server, &bearer(&other), "Theirs").await;

        let response = server
            .post("/recipe/recipes")
            .add_header("authorization", bearer(&user))
            .json(&json!({"title": "Borrowed", "time_minutes": 10, "price": "4.00", "tags": [foreign_tag.id]}))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_image_upload(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;
        let auth = bearer(&user);

        let recipe = server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "Photogenic", "time_minutes": 10, "price": "4.00"}))
            .await
            .json::<RecipeResponse>();

        let form = MultipartForm::new().add_part("image", Part::bytes(b"fake-jpeg-bytes".to_vec()).file_name("myimage.jpeg"));
        let response = server
            .post(&format!("/recipe/recipes/{}/image", recipe.id))
            .add_header("authorization", auth.clone())
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), 200);

        let upload = response.json::<RecipeImageResponse>();
        assert!(upload.image.starts_with("uploads/recipe/"));
        assert!(upload.image.ends_with(".jpeg"));

        // The stored path is visible on the detail response
        let detail = server
            .get(&format!("/recipe/recipes/{}", recipe.id))
            .add_header("authorization", auth)
            .await
            .json::<RecipeDetailResponse>();
        assert_eq!(detail.image.as_deref(), Some(upload.image.as_str()));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_image_upload_without_field_rejected(pool: PgPool) {
        let server = create_test_app(pool.clone());
        let user = create_test_user(&pool, "cook@example.com").await;
        let auth = bearer(&user);

        let recipe = server
            .post("/recipe/recipes")
            .add_header("authorization", auth.clone())
            .json(&json!({"title": "No photo", "time_minutes": 10, "price": "4.00"}))
            .await
            .json::<RecipeResponse>();

        let form = MultipartForm::new().add_part("not_image", Part::bytes(b"bytes".to_vec()).file_name("x.png"));
        let response = server
            .post(&format!("/recipe/recipes/{}/image", recipe.id))
            .add_header("authorization", auth)
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), 400);
    }
}
