//! REST surface: DTOs, handlers, session middleware, routes and the OpenAPI document.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

#[cfg(test)]
mod dto_test;
