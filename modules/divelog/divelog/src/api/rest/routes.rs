use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::{Extension, Router};

use super::dto;
use super::handlers::{account, auth, certifications, dives, gear, plans, preferences};
use super::middleware::{CookiePolicy, SessionLayerState, require_session};
use super::openapi::{OpenApiRegistry, OperationBuilder};
use crate::domain::service::AppServices;

pub const BASE_PATH: &str = "/divelog/v1";
pub const OPENAPI_PATH: &str = "/divelog/v1/openapi.json";

fn path(suffix: &str) -> String {
    format!("{BASE_PATH}{suffix}")
}

/// Mount every divelog route. Protected routes sit behind `require_session`.
pub fn register_routes(
    openapi: &OpenApiRegistry,
    services: AppServices,
    session: SessionLayerState,
    cookies: CookiePolicy,
) -> Router {
    let public = register_public(Router::new(), openapi);

    let mut protected = Router::new();
    protected = register_account(protected, openapi);
    protected = register_preferences(protected, openapi);
    protected = register_dives(protected, openapi);
    protected = register_plans(protected, openapi);
    protected = register_certifications(protected, openapi);
    protected = register_gear(protected, openapi);
    let protected = protected.route_layer(from_fn_with_state(session, require_session));

    public
        .merge(protected)
        .layer(Extension(services))
        .layer(Extension(cookies))
}

fn register_public(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::post(path("/auth/register"))
        .operation_id("divelog.register")
        .summary("Create an account")
        .description("Creates the account and signs it in with a session cookie")
        .tag("Auth")
        .json_request::<dto::RegisterRequest>(openapi)
        .handler(auth::register)
        .data_response::<dto::UserDto>(openapi, StatusCode::CREATED, "Account created")
        .error_400()
        .error_409()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/auth/login"))
        .operation_id("divelog.login")
        .summary("Sign in")
        .tag("Auth")
        .json_request::<dto::LoginRequest>(openapi)
        .handler(auth::login)
        .data_response::<dto::UserDto>(openapi, StatusCode::OK, "Signed in")
        .error_400()
        .error(StatusCode::UNAUTHORIZED, "Wrong email or password")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/auth/logout"))
        .operation_id("divelog.logout")
        .summary("Sign out")
        .description("Removes the session cookie")
        .tag("Auth")
        .handler(auth::logout)
        .no_content("Signed out")
        .register(router, openapi);

    router = OperationBuilder::get(path("/certification-definitions"))
        .operation_id("divelog.list_certification_definitions")
        .summary("List certification definitions")
        .description("Core certifications first, then by rank and name")
        .tag("Certifications")
        .handler(certifications::list_definitions)
        .data_list_response::<dto::CertificationDefinitionDto>(openapi, "Definitions")
        .error_500()
        .register(router, openapi);

    router
}

fn register_account(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/account"))
        .operation_id("divelog.get_account")
        .summary("Current account")
        .tag("Account")
        .requires_session()
        .handler(account::get_account)
        .data_response::<dto::UserDto>(openapi, StatusCode::OK, "Account")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::patch(path("/account"))
        .operation_id("divelog.update_account")
        .summary("Update profile")
        .tag("Account")
        .requires_session()
        .json_request::<dto::UpdateProfileRequest>(openapi)
        .handler(account::update_account)
        .data_response::<dto::UserDto>(openapi, StatusCode::OK, "Profile updated")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/account"))
        .operation_id("divelog.delete_account")
        .summary("Delete account")
        .description("Deletes the account and everything it owns after a password check")
        .tag("Account")
        .requires_session()
        .json_request::<dto::DeleteAccountRequest>(openapi)
        .handler(account::delete_account)
        .no_content("Account deleted")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/account/password"))
        .operation_id("divelog.change_password")
        .summary("Change password")
        .description("Invalidates every other session and issues a fresh cookie")
        .tag("Account")
        .requires_session()
        .json_request::<dto::ChangePasswordRequest>(openapi)
        .handler(account::change_password)
        .data_response::<dto::UserDto>(openapi, StatusCode::OK, "Password changed")
        .error_400()
        .error_500()
        .register(router, openapi);

    router
}

fn register_preferences(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/preferences"))
        .operation_id("divelog.get_preferences")
        .summary("Unit preferences")
        .description("Stored preferences merged over the defaults")
        .tag("Preferences")
        .requires_session()
        .handler(preferences::get_preferences)
        .data_response::<dto::UnitPreferencesDto>(openapi, StatusCode::OK, "Preferences")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::patch(path("/preferences"))
        .operation_id("divelog.patch_preferences")
        .summary("Update unit preferences")
        .tag("Preferences")
        .requires_session()
        .json_request::<dto::PatchPreferencesRequest>(openapi)
        .handler(preferences::patch_preferences)
        .data_response::<dto::UnitPreferencesDto>(openapi, StatusCode::OK, "Preferences updated")
        .error_400()
        .error_500()
        .register(router, openapi);

    router
}

fn register_dives(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/dives"))
        .operation_id("divelog.list_dives")
        .summary("List dive logs")
        .description("Newest first, with values in the caller's display units")
        .tag("Dives")
        .requires_session()
        .handler(dives::list_dives)
        .data_list_response::<dto::DiveDto>(openapi, "Dive logs")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/dives"))
        .operation_id("divelog.create_dive")
        .summary("Log a dive")
        .description("Measurements without a unit are read in the caller's display units")
        .tag("Dives")
        .requires_session()
        .json_request::<dto::DiveRequest>(openapi)
        .handler(dives::create_dive)
        .data_response::<dto::DiveDto>(openapi, StatusCode::CREATED, "Dive logged")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::get(path("/dives/{id}"))
        .operation_id("divelog.get_dive")
        .summary("Get a dive log")
        .tag("Dives")
        .requires_session()
        .path_param("id", "Dive log id")
        .handler(dives::get_dive)
        .data_response::<dto::DiveDto>(openapi, StatusCode::OK, "Dive log")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::put(path("/dives/{id}"))
        .operation_id("divelog.replace_dive")
        .summary("Replace a dive log")
        .tag("Dives")
        .requires_session()
        .path_param("id", "Dive log id")
        .json_request::<dto::DiveRequest>(openapi)
        .handler(dives::replace_dive)
        .data_response::<dto::DiveDto>(openapi, StatusCode::OK, "Dive log replaced")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/dives/{id}"))
        .operation_id("divelog.delete_dive")
        .summary("Delete a dive log")
        .tag("Dives")
        .requires_session()
        .path_param("id", "Dive log id")
        .handler(dives::delete_dive)
        .no_content("Dive log deleted")
        .error_404()
        .error_500()
        .register(router, openapi);

    router
}

fn register_plans(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/plans"))
        .operation_id("divelog.list_plans")
        .summary("List dive plans")
        .tag("Plans")
        .requires_session()
        .handler(plans::list_plans)
        .data_list_response::<dto::PlanDto>(openapi, "Dive plans")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/plans"))
        .operation_id("divelog.create_plan")
        .summary("Create a dive plan")
        .tag("Plans")
        .requires_session()
        .json_request::<dto::PlanRequest>(openapi)
        .handler(plans::create_plan)
        .data_response::<dto::PlanDto>(openapi, StatusCode::CREATED, "Dive plan created")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::get(path("/plans/{id}"))
        .operation_id("divelog.get_plan")
        .summary("Get a dive plan")
        .tag("Plans")
        .requires_session()
        .path_param("id", "Dive plan id")
        .handler(plans::get_plan)
        .data_response::<dto::PlanDto>(openapi, StatusCode::OK, "Dive plan")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::put(path("/plans/{id}"))
        .operation_id("divelog.replace_plan")
        .summary("Replace a dive plan")
        .tag("Plans")
        .requires_session()
        .path_param("id", "Dive plan id")
        .json_request::<dto::PlanRequest>(openapi)
        .handler(plans::replace_plan)
        .data_response::<dto::PlanDto>(openapi, StatusCode::OK, "Dive plan replaced")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/plans/{id}"))
        .operation_id("divelog.delete_plan")
        .summary("Delete a dive plan")
        .tag("Plans")
        .requires_session()
        .path_param("id", "Dive plan id")
        .handler(plans::delete_plan)
        .no_content("Dive plan deleted")
        .error_404()
        .error_500()
        .register(router, openapi);

    router
}

fn register_certifications(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/certifications"))
        .operation_id("divelog.list_certifications")
        .summary("List held certifications")
        .tag("Certifications")
        .requires_session()
        .handler(certifications::list_certifications)
        .data_list_response::<dto::CertificationDto>(openapi, "Certifications")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/certifications"))
        .operation_id("divelog.add_certification")
        .summary("Record a certification")
        .tag("Certifications")
        .requires_session()
        .json_request::<dto::NewCertificationRequest>(openapi)
        .handler(certifications::add_certification)
        .data_response::<dto::CertificationDto>(openapi, StatusCode::CREATED, "Certification recorded")
        .error_400()
        .error_409()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/certifications/{id}"))
        .operation_id("divelog.remove_certification")
        .summary("Remove a certification")
        .tag("Certifications")
        .requires_session()
        .path_param("id", "Certification id")
        .handler(certifications::remove_certification)
        .no_content("Certification removed")
        .error_404()
        .error_500()
        .register(router, openapi);

    router
}

fn register_gear(mut router: Router, openapi: &OpenApiRegistry) -> Router {
    router = OperationBuilder::get(path("/gear"))
        .operation_id("divelog.list_gear")
        .summary("List gear items")
        .tag("Gear")
        .requires_session()
        .handler(gear::list_items)
        .data_list_response::<dto::GearItemDto>(openapi, "Gear items")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/gear"))
        .operation_id("divelog.create_gear")
        .summary("Add a gear item")
        .tag("Gear")
        .requires_session()
        .json_request::<dto::GearItemRequest>(openapi)
        .handler(gear::create_item)
        .data_response::<dto::GearItemDto>(openapi, StatusCode::CREATED, "Gear item added")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::get(path("/gear/{id}"))
        .operation_id("divelog.get_gear")
        .summary("Get a gear item")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear item id")
        .handler(gear::get_item)
        .data_response::<dto::GearItemDto>(openapi, StatusCode::OK, "Gear item")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::put(path("/gear/{id}"))
        .operation_id("divelog.replace_gear")
        .summary("Replace a gear item")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear item id")
        .json_request::<dto::GearItemRequest>(openapi)
        .handler(gear::replace_item)
        .data_response::<dto::GearItemDto>(openapi, StatusCode::OK, "Gear item replaced")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/gear/{id}"))
        .operation_id("divelog.delete_gear")
        .summary("Delete a gear item")
        .description("Also removes the item from every kit")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear item id")
        .handler(gear::delete_item)
        .no_content("Gear item deleted")
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::get(path("/gear-kits"))
        .operation_id("divelog.list_gear_kits")
        .summary("List gear kits")
        .tag("Gear")
        .requires_session()
        .handler(gear::list_kits)
        .data_list_response::<dto::GearKitDto>(openapi, "Gear kits")
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::post(path("/gear-kits"))
        .operation_id("divelog.create_gear_kit")
        .summary("Create a gear kit")
        .description("Every item must belong to the caller")
        .tag("Gear")
        .requires_session()
        .json_request::<dto::GearKitRequest>(openapi)
        .handler(gear::create_kit)
        .data_response::<dto::GearKitDto>(openapi, StatusCode::CREATED, "Gear kit created")
        .error_400()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::get(path("/gear-kits/{id}"))
        .operation_id("divelog.get_gear_kit")
        .summary("Get a gear kit")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear kit id")
        .handler(gear::get_kit)
        .data_response::<dto::GearKitDto>(openapi, StatusCode::OK, "Gear kit")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::put(path("/gear-kits/{id}"))
        .operation_id("divelog.replace_gear_kit")
        .summary("Replace a gear kit")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear kit id")
        .json_request::<dto::GearKitRequest>(openapi)
        .handler(gear::replace_kit)
        .data_response::<dto::GearKitDto>(openapi, StatusCode::OK, "Gear kit replaced")
        .error_400()
        .error_404()
        .error_500()
        .register(router, openapi);

    router = OperationBuilder::delete(path("/gear-kits/{id}"))
        .operation_id("divelog.delete_gear_kit")
        .summary("Delete a gear kit")
        .tag("Gear")
        .requires_session()
        .path_param("id", "Gear kit id")
        .handler(gear::delete_kit)
        .no_content("Gear kit deleted")
        .error_404()
        .error_500()
        .register(router, openapi);

    router
}
