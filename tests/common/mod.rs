//! Shared fixtures: a small user service described through `Reflect`

#![allow(dead_code)]

use routespec::ir::HandlerRef;
use routespec::reflect::{FnInfo, Reflect, TypeInfo};
use routespec::route::Route;
use std::collections::HashMap;

pub const USERS: &str = "github.com/acme/users";
pub const MIDDLEWARE: &str = "github.com/acme/mw";

pub struct Address;
impl Reflect for Address {
    fn type_info() -> TypeInfo {
        TypeInfo::record("Address", USERS)
            .field("Street", String::type_info(), r#"json:"street""#)
            .field("City", String::type_info(), r#"json:"city""#)
    }
}

pub struct User;
impl Reflect for User {
    fn type_info() -> TypeInfo {
        TypeInfo::record("User", USERS)
            .field("ID", String::type_info(), r#"json:"id""#)
            .field("Name", String::type_info(), r#"json:"name""#)
            .field("Emails", Vec::<String>::type_info(), r#"json:"emails""#)
            .field("Address", Address::type_info(), r#"json:"address""#)
            .field("Roles", HashMap::<String, bool>::type_info(), r#"json:"roles""#)
    }
}

pub struct CreateUserRequest;
impl Reflect for CreateUserRequest {
    fn type_info() -> TypeInfo {
        TypeInfo::record("CreateUserRequest", USERS)
            .field("Name", String::type_info(), r#"json:"name" validate:"required""#)
            .field("Email", String::type_info(), r#"json:"email" validate:"required""#)
            .field("Address", Address::type_info(), r#"json:"address""#)
    }
}

pub struct UpdateUserRequest;
impl Reflect for UpdateUserRequest {
    fn type_info() -> TypeInfo {
        TypeInfo::record("UpdateUserRequest", USERS)
            .field("ID", String::type_info(), r#"json:"id" as:"id,path" validate:"required""#)
            .field("Name", String::type_info(), r#"json:"name""#)
            .field("Address", Address::type_info(), r#"json:"address""#)
    }
}

pub struct GetUserRequest;
impl Reflect for GetUserRequest {
    fn type_info() -> TypeInfo {
        TypeInfo::record("GetUserRequest", USERS)
            .field("ID", String::type_info(), r#"json:"id" as:"id,path" validate:"required""#)
    }
}

pub struct ListUsersRequest;
impl Reflect for ListUsersRequest {
    fn type_info() -> TypeInfo {
        TypeInfo::record("ListUsersRequest", USERS)
            .field("Limit", i64::type_info(), r#"json:"limit" as:"limit,query""#)
            .field("Offset", i64::type_info(), r#"json:"offset" as:"offset,query""#)
    }
}

pub struct ListUsersResponse;
impl Reflect for ListUsersResponse {
    fn type_info() -> TypeInfo {
        TypeInfo::record("ListUsersResponse", USERS)
            .field("Users", Vec::<User>::type_info(), r#"json:"users""#)
    }
}

pub struct EmptyResponse;
impl Reflect for EmptyResponse {
    fn type_info() -> TypeInfo {
        TypeInfo::record("EmptyResponse", USERS)
    }
}

/// Session cookie written back on login
pub struct LoginResponse;
impl Reflect for LoginResponse {
    fn type_info() -> TypeInfo {
        TypeInfo::record("LoginResponse", USERS)
            .field("Session", String::type_info(), r#"as:"session,cookie""#)
            .field("Trace", String::type_info(), r#"as:"x-trace,header""#)
            .field("Name", String::type_info(), r#"json:"name""#)
    }
}

/// Method handler on `*users.Service`
pub fn service(name: &str) -> HandlerRef {
    HandlerRef::method(USERS, "Service", true, name)
}

/// The user service:
///
/// ```text
/// POST   /            CreateUser
/// GET    /            ListUsers
/// GET    /users/:id   GetUser
/// PUT    /users/:id   UpdateUser
/// DELETE /users/:id   DeleteUser
/// POST   /login       Login
/// ```
pub fn user_routes() -> Route {
    let mut root = Route::root();
    root.use_middleware(FnInfo::middleware("github.com/acme/mw.Logger"));
    root.post(
        FnInfo::handler::<CreateUserRequest, User>(service("CreateUser")),
        "Create a user",
    );
    root.get(
        FnInfo::handler::<ListUsersRequest, ListUsersResponse>(service("ListUsers")),
        "",
    );

    let by_id = root.static_path("users").param("id");
    by_id.use_middleware(FnInfo::middleware(HandlerRef::function(MIDDLEWARE, "LoadUser")));
    by_id
        .get(
            FnInfo::handler::<GetUserRequest, User>(service("GetUser")),
            "Fetch one user",
        )
        .authz(["users:read"]);
    by_id
        .put(
            FnInfo::handler::<UpdateUserRequest, User>(service("UpdateUser")),
            "",
        )
        .authz(["users:write"]);
    by_id
        .delete(
            FnInfo::handler::<GetUserRequest, EmptyResponse>(service("DeleteUser")),
            "",
        )
        .authz(["users:write", "admin"])
        .middleware([FnInfo::middleware("github.com/acme/mw.Audit")]);

    root.static_path("login").post(
        FnInfo::handler::<CreateUserRequest, LoginResponse>("github.com/acme/auth.Login"),
        "",
    );
    root
}
